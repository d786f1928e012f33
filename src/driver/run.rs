use crate::colored::Colorize;
use crate::gatherer::Agreement;
use crate::synod::ParticipantId;
use crate::{Error, Result};

use super::cluster::Cluster;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, info};

/// How long a run may take after the hold signal before it is declared stalled.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(600);

/// Parameters of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    /// Number of participants `n`.
    pub participants: usize,
    /// Number of fault-prone participants `f`.
    pub faulty: usize,
    /// Probability that a fault-prone participant crashes after handling a message.
    pub crash_probability: f64,
    /// Time after which every participant but one stops retrying.
    pub hold_delay: Duration,
    pub timeout: Duration,
}

impl RunParams {
    pub fn new(
        participants: usize,
        faulty: usize,
        crash_probability: f64,
        hold_delay: Duration,
    ) -> Self {
        RunParams {
            participants,
            faulty,
            crash_probability,
            hold_delay,
            timeout: DEFAULT_RUN_TIMEOUT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.participants == 0 {
            return Err(Error::InvalidParticipantCount(self.participants));
        }
        if self.faulty >= self.participants {
            return Err(Error::InvalidFaultCount {
                participants: self.participants,
                faulty: self.faulty,
            });
        }
        if !(0.0..=1.0).contains(&self.crash_probability) {
            return Err(Error::InvalidCrashProbability(self.crash_probability));
        }
        Ok(())
    }

    /// The number of deliveries which ends the run: every participant that cannot crash.
    pub fn deliver_from(&self) -> usize {
        self.participants - self.faulty
    }

    /// Names the run `n-f-a%-t-iteration`.
    pub fn label(&self, iteration: usize) -> String {
        format!(
            "{}-{}-{:.0}-{}-{}",
            self.participants,
            self.faulty,
            self.crash_probability * 100.0,
            self.hold_delay.as_millis(),
            iteration
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Agreed(Agreement),
    /// The gatherer did not complete within the timeout.
    Stalled,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub params: RunParams,
    pub seed: u64,
    pub outcome: RunOutcome,
    pub elapsed: Duration,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let outcome = match self.outcome {
            RunOutcome::Agreed(agreement) => format!(
                "{} {} ({} deliveries)",
                "agreed".green(),
                agreement.value,
                agreement.deliveries
            ),
            RunOutcome::Stalled => format!("{}", "stalled".yellow()),
        };
        write!(
            f,
            "n={} f={} a={} t={}ms seed={} | {} in {:?}",
            self.params.participants,
            self.params.faulty,
            self.params.crash_probability,
            self.params.hold_delay.as_millis(),
            self.seed,
            outcome,
            self.elapsed
        )
    }
}

/// Runs one experiment on the current actix system.
///
/// Every participant is launched, the last `f` of a random permutation are made fault-prone
/// and, once `hold_delay` has passed, every participant except the first of the permutation is
/// put on hold. The run ends when the gatherer completes or `timeout` passes after the hold.
///
/// An agreement violation is returned as an error.
pub async fn run(params: &RunParams, seed: u64) -> Result<RunReport> {
    params.validate()?;
    let started = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let n = params.participants;

    let (cluster, mut done) = Cluster::spawn(n, params.deliver_from(), &mut rng);
    cluster.init();
    cluster.launch_all();

    let mut order: Vec<ParticipantId> = (1..=n).collect();
    order.shuffle(&mut rng);
    for id in order[n - params.faulty..].iter() {
        cluster.enable_faults(*id, params.crash_probability);
    }

    let verdict = match timeout(params.hold_delay, &mut done).await {
        Ok(verdict) => Some(verdict),
        Err(_) => {
            debug!("hold delay elapsed, participant {} keeps contending", order[0]);
            for id in order[1..].iter() {
                cluster.hold(*id);
            }
            timeout(params.timeout, &mut done).await.ok()
        }
    };
    let outcome = match verdict {
        Some(verdict) => RunOutcome::Agreed(verdict.map_err(|_| Error::GathererDropped)??),
        None => RunOutcome::Stalled,
    };

    let report = RunReport { params: params.clone(), seed, outcome, elapsed: started.elapsed() };
    info!("[{}] {}", "driver".magenta(), report);
    Ok(report)
}

/// Runs one experiment on a fresh actix system. Every actor of the run is torn down with the
/// system before this returns.
pub fn execute(params: &RunParams, seed: u64) -> Result<RunReport> {
    let system = actix::System::new();
    system.block_on(run(params, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let ms = Duration::from_millis(10);
        assert!(RunParams::new(3, 1, 0.5, ms).validate().is_ok());
        assert!(RunParams::new(1, 0, 0.0, ms).validate().is_ok());
        assert!(matches!(
            RunParams::new(0, 0, 0.0, ms).validate(),
            Err(Error::InvalidParticipantCount(0))
        ));
        assert!(matches!(
            RunParams::new(3, 3, 0.0, ms).validate(),
            Err(Error::InvalidFaultCount { participants: 3, faulty: 3 })
        ));
        assert!(matches!(
            RunParams::new(3, 1, 1.5, ms).validate(),
            Err(Error::InvalidCrashProbability(_))
        ));
        assert!(RunParams::new(3, 1, f64::NAN, ms).validate().is_err());
    }

    #[test]
    fn test_label() {
        let params = RunParams::new(25, 12, 0.01, Duration::from_millis(1500));
        assert_eq!(params.label(3), "25-12-1-1500-3");
        assert_eq!(params.deliver_from(), 13);
    }

    #[test]
    fn test_execute_small_run() {
        let params = RunParams::new(3, 0, 0.0, Duration::from_millis(20));
        let report = execute(&params, 42).unwrap();
        match report.outcome {
            RunOutcome::Agreed(agreement) => assert_eq!(agreement.deliveries, 3),
            RunOutcome::Stalled => panic!("run stalled"),
        }
    }

    #[test]
    fn test_execute_rejects_bad_params() {
        let params = RunParams::new(3, 5, 0.0, Duration::from_millis(20));
        assert!(matches!(execute(&params, 1), Err(Error::InvalidFaultCount { .. })));
    }
}
