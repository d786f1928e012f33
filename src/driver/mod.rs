//! Experiment harness: wires participants and a gatherer into a run, and sweeps runs over
//! participant counts, crash probabilities and hold delays.
mod cluster;
mod run;
mod settings;
mod sweep;

pub use cluster::Cluster;
pub use run::*;
pub use settings::Settings;
pub use sweep::{plan, sweep};
