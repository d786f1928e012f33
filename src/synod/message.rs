//! Messages understood by a [Participant][super::Participant].

use crate::gatherer::Deliver;

use super::ballot::Ballot;
use super::{ParticipantId, Value};

use actix::Recipient;
use tracing::warn;

/// Protocol traffic exchanged between participants.
///
/// All variants travel through the same mailbox so that a peer can be addressed with a
/// single `Recipient<SynodMsg>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Message)]
#[rtype(result = "()")]
pub enum SynodMsg {
    /// Phase 1a: asks for a promise not to accept ballots lower than `ballot`.
    Read { ballot: Ballot, from: ParticipantId },
    /// Rejects the round `ballot`.
    Abort { ballot: Ballot },
    /// Phase 1b: the promise, carrying the sender's last imposed state.
    Gather { ballot: Ballot, est_ballot: Ballot, estimate: Option<Value>, from: ParticipantId },
    /// Phase 2a: asks the receiver to accept `value` at `ballot`.
    Impose { ballot: Ballot, value: Value, from: ParticipantId },
    /// Phase 2b: `from` accepted the imposed value at `ballot`.
    Ack { ballot: Ballot, from: ParticipantId },
    /// The final value.
    Decide { value: Value },
}

/// Routing table handed to every participant before the run starts.
#[derive(Clone)]
pub struct Roster {
    /// Peers indexed by `id - 1`, including the receiving participant itself.
    peers: Vec<Recipient<SynodMsg>>,
    /// The termination detector.
    gatherer: Recipient<Deliver>,
}

impl std::fmt::Debug for Roster {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "Roster {{ peers: {} }}", self.peers.len())
    }
}

impl Roster {
    pub fn new(peers: Vec<Recipient<SynodMsg>>, gatherer: Recipient<Deliver>) -> Self {
        Roster { peers, gatherer }
    }

    /// Sends `msg` to the participant `to`. Unknown ids and stopped peers are ignored.
    pub fn send(&self, to: ParticipantId, msg: SynodMsg) {
        match to.checked_sub(1).and_then(|i| self.peers.get(i)) {
            Some(peer) => {
                let _ = peer.do_send(msg);
            }
            None => warn!("no route to participant {}", to),
        }
    }

    /// Sends `msg` to every participant, the sender included.
    pub fn broadcast(&self, msg: SynodMsg) {
        for peer in self.peers.iter() {
            let _ = peer.do_send(msg);
        }
    }

    pub fn deliver(&self, msg: Deliver) {
        let _ = self.gatherer.do_send(msg);
    }
}

/// Hands the routing table to a participant.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Init {
    pub roster: Roster,
}

/// Makes a participant fault-prone: after every handled message it crashes with
/// probability `crash_probability`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Message)]
#[rtype(result = "()")]
pub struct EnableFaults {
    pub crash_probability: f64,
}

/// Stops a participant from retrying aborted rounds. It keeps answering its peers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Message)]
#[rtype(result = "()")]
pub struct Hold;

/// Starts the first round. Without a preset value the participant picks one at random.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Message)]
#[rtype(result = "()")]
pub struct Launch {
    pub value: Option<Value>,
}

impl Launch {
    pub fn random() -> Self {
        Launch { value: None }
    }

    pub fn with_value(value: Value) -> Self {
        Launch { value: Some(value) }
    }
}
