use config::{Config, Environment, File};
use serde::Deserialize;

use std::path::Path;

use crate::Result;

// For explanation, see issue: https://github.com/serde-rs/serde/issues/368
fn default_participants() -> Vec<usize> {
    vec![3, 25, 50, 75, 100]
}
fn default_crash_probabilities() -> Vec<f64> {
    vec![0.0, 0.01, 0.1, 1.0]
}
fn default_hold_delays_ms() -> Vec<u64> {
    vec![500, 1000, 1500, 2000]
}
fn default_iterations() -> usize {
    5
}
fn default_run_timeout_secs() -> u64 {
    600
}

/// Parameters of an experiment sweep.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Participant counts `n` to sweep over.
    #[serde(default = "default_participants")]
    pub participants: Vec<usize>,
    /// Crash probabilities `a` to sweep over.
    #[serde(default = "default_crash_probabilities")]
    pub crash_probabilities: Vec<f64>,
    /// Hold delays `t` in milliseconds to sweep over.
    #[serde(default = "default_hold_delays_ms")]
    pub hold_delays_ms: Vec<u64>,
    /// Runs per parameter combination.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    /// Fault-prone participants per run. Defaults to the most a quorum tolerates, `n - quorum(n)`.
    #[serde(default)]
    pub faulty: Option<usize>,
    /// Master seed of the sweep. A random one is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            participants: default_participants(),
            crash_probabilities: default_crash_probabilities(),
            hold_delays_ms: default_hold_delays_ms(),
            iterations: default_iterations(),
            run_timeout_secs: default_run_timeout_secs(),
            faulty: None,
            seed: None,
        }
    }
}

impl Settings {
    /// Loads the settings from an optional file, then from `SYNOD_*` environment variables
    /// (e.g. `SYNOD_ITERATIONS=10`). Anything left unset keeps its default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix("SYNOD").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// The number of runs a sweep with these settings performs.
    pub fn run_count(&self) -> usize {
        self.participants.len()
            * self.crash_probabilities.len()
            * self.hold_delays_ms.len()
            * self.iterations
    }
}
