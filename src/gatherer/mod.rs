//! Termination detection: collects decisions, checks agreement and ends the run.
mod gatherer;

pub use gatherer::*;
