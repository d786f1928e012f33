use crate::driver::{run, Cluster, RunOutcome, RunParams};
use crate::gatherer::Agreement;
use crate::synod::{quorum, Launch, ParticipantId, Value};
use crate::Result;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout, Duration};

const WAIT: Duration = Duration::from_secs(30);

async fn await_agreement(done: oneshot::Receiver<Result<Agreement>>) -> Result<Agreement> {
    timeout(WAIT, done).await.expect("run timed out").expect("gatherer dropped")
}

/// Puts every participant except `leader` on hold once `after` has passed.
async fn hold_all_but(cluster: &Cluster, leader: ParticipantId, after: Duration) {
    sleep(after).await;
    for id in (1..=cluster.len()).filter(|id| *id != leader) {
        cluster.hold(id);
    }
}

#[actix_rt::test]
async fn test_reliable_participants_agree_without_hold() {
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (cluster, done) = Cluster::spawn(3, 3, &mut rng);
        cluster.init();
        cluster.launch_all();

        let agreement = await_agreement(done).await.unwrap();
        assert_eq!(agreement.deliveries, 3);
    }
}

#[actix_rt::test]
async fn test_crash_after_launch_is_not_awaited() {
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (cluster, done) = Cluster::spawn(5, 4, &mut rng);
        cluster.init();
        cluster.launch_all();
        // Certain crash on the next draw, whatever participant 5 has sent by then.
        cluster.enable_faults(5, 1.0);

        let agreement = await_agreement(done).await.unwrap();
        assert_eq!(agreement.deliveries, 4);
    }
}

#[actix_rt::test]
async fn test_unanimous_proposal_is_decided() {
    for value in [Value::Zero, Value::One].iter().cloned() {
        let mut rng = StdRng::seed_from_u64(3);
        let (cluster, done) = Cluster::spawn(4, 4, &mut rng);
        cluster.init();
        for id in 1..=4 {
            cluster.launch(id, Launch::with_value(value));
        }
        hold_all_but(&cluster, 2, Duration::from_millis(10)).await;

        let agreement = await_agreement(done).await.unwrap();
        assert_eq!(agreement.value, value);
        assert_eq!(agreement.deliveries, 4);
    }
}

#[actix_rt::test]
async fn test_lone_proposer_imposes_its_value() {
    let mut rng = StdRng::seed_from_u64(4);
    let (cluster, done) = Cluster::spawn(5, 5, &mut rng);
    cluster.init();
    // Only participant 3 proposes; the others answer but never contend.
    for id in (1..=5).filter(|id| *id != 3) {
        cluster.hold(id);
    }
    cluster.launch(3, Launch::with_value(Value::One));

    let agreement = await_agreement(done).await.unwrap();
    assert_eq!(agreement.value, Value::One);
    assert_eq!(agreement.deliveries, 5);
}

#[actix_rt::test]
async fn test_single_participant_decides_alone() {
    let mut rng = StdRng::seed_from_u64(5);
    let (cluster, done) = Cluster::spawn(1, 1, &mut rng);
    cluster.init();
    cluster.launch(1, Launch::with_value(Value::Zero));

    let agreement = await_agreement(done).await.unwrap();
    assert_eq!(agreement, Agreement { value: Value::Zero, deliveries: 1 });
}

#[actix_rt::test]
async fn test_faulty_runs_never_disagree() {
    let n = 7;
    for seed in 0..20 {
        let mut params = RunParams::new(n, n - quorum(n), 0.1, Duration::from_millis(5));
        params.timeout = WAIT;
        let report = run(&params, seed).await.unwrap();
        match report.outcome {
            RunOutcome::Agreed(agreement) => assert_eq!(agreement.deliveries, quorum(n)),
            RunOutcome::Stalled => panic!("seed {} stalled", seed),
        }
    }
}

#[actix_rt::test]
async fn test_every_faulty_participant_crashing_still_terminates() {
    let n = 9;
    let mut params = RunParams::new(n, n - quorum(n), 1.0, Duration::from_millis(5));
    params.timeout = WAIT;
    let report = run(&params, 77).await.unwrap();
    assert!(matches!(report.outcome, RunOutcome::Agreed(Agreement { deliveries: 5, .. })));
}
