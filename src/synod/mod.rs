//! Leaderless round-based binary consensus (Synod / OFCons).
//!
//! Every participant runs the same two-phase ballot protocol: `Read`/`Gather` to learn the
//! highest value imposed so far, then `Impose`/`Ack` to get a quorum to accept it. A quorum
//! of acknowledgements decides the value, which is flooded once with `Decide`.
pub mod ballot;
mod message;
mod participant;
mod state;
mod value;

pub use ballot::{quorum, Ballot};
pub use message::*;
pub use participant::*;
pub use state::{Outbound, Stage, Synod};
pub use value::Value;

/// Participant ids are `1..=n`.
pub type ParticipantId = usize;
