use crate::colored::Colorize;
use crate::synod::quorum;
use crate::Result;

use super::run::{execute, RunParams, RunReport};
use super::settings::Settings;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Duration;
use tracing::info;

/// The parameters of every run of a sweep, in execution order, with the iteration number.
pub fn plan(settings: &Settings) -> Vec<(RunParams, usize)> {
    let mut runs = vec![];
    for n in settings.participants.iter().cloned() {
        let faulty = settings.faulty.unwrap_or_else(|| n - quorum(n));
        for a in settings.crash_probabilities.iter().cloned() {
            for t in settings.hold_delays_ms.iter().cloned() {
                for iteration in 0..settings.iterations {
                    let mut params = RunParams::new(n, faulty, a, Duration::from_millis(t));
                    params.timeout = Duration::from_secs(settings.run_timeout_secs);
                    runs.push((params, iteration));
                }
            }
        }
    }
    runs
}

/// Executes every run of the sweep one after the other, each on its own actix system, and
/// calls `on_run` with the label and report of each finished run.
///
/// Stops at the first error, in particular at an agreement violation.
pub fn sweep<F>(settings: &Settings, mut on_run: F) -> Result<Vec<RunReport>>
where
    F: FnMut(&str, &RunReport),
{
    let seed = settings.seed.unwrap_or_else(rand::random);
    info!("[{}] sweeping {} runs (seed {})", "driver".magenta(), settings.run_count(), seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut reports = vec![];
    for (params, iteration) in plan(settings) {
        let label = params.label(iteration);
        let report = execute(&params, rng.gen())?;
        on_run(&label, &report);
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::driver::RunOutcome;

    #[test]
    fn test_plan() {
        let settings = Settings::default();
        let runs = plan(&settings);
        assert_eq!(runs.len(), settings.run_count());

        // The fault count is the most a quorum tolerates.
        let (first, _) = &runs[0];
        assert_eq!((first.participants, first.faulty), (3, 1));
        let labels: Vec<String> = runs.iter().map(|(p, i)| p.label(*i)).collect();
        assert_eq!(labels[0], "3-1-0-500-0");
        assert!(labels.contains(&"25-12-1-1500-4".to_string()));
        assert!(labels.contains(&"100-49-100-2000-2".to_string()));
    }

    #[test]
    fn test_plan_with_fixed_faults() {
        let settings = Settings { participants: vec![4, 6], faulty: Some(1), ..Settings::default() };
        assert!(plan(&settings).iter().all(|(p, _)| p.faulty == 1));
    }

    #[test]
    fn test_small_sweep() {
        let settings = Settings {
            participants: vec![3, 5],
            crash_probabilities: vec![0.0, 0.1],
            hold_delays_ms: vec![10],
            iterations: 2,
            run_timeout_secs: 60,
            faulty: None,
            seed: Some(11),
        };
        let mut labels = vec![];
        let reports = sweep(&settings, |label, _| labels.push(label.to_string())).unwrap();
        assert_eq!(reports.len(), 8);
        assert_eq!(labels[0], "3-1-0-10-0");
        for report in reports.iter() {
            match report.outcome {
                RunOutcome::Agreed(agreement) => {
                    assert!(agreement.deliveries == report.params.deliver_from())
                }
                RunOutcome::Stalled => panic!("run {} stalled", report),
            }
        }
    }
}
