use crate::gatherer::{Agreement, Gatherer};
use crate::synod::{EnableFaults, Hold, Init, Launch, Participant, ParticipantId, Roster};
use crate::Result;

use actix::{Actor, Addr, Arbiter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::oneshot;
use tracing::warn;

/// The actors of one run: `n` participants and their gatherer.
///
/// Every participant runs on its own arbiter. The arbiters are stopped when the cluster is
/// dropped.
pub struct Cluster {
    participants: Vec<Addr<Participant>>,
    gatherer: Addr<Gatherer>,
    arbiters: Vec<Arbiter>,
}

impl Cluster {
    /// Starts the gatherer on the current arbiter and each of the `n` participants on a new
    /// arbiter. Each participant gets its own random source seeded from `rng`.
    ///
    /// Returns the receiver which resolves when the gatherer completes.
    pub fn spawn(
        n: usize,
        deliver_from: usize,
        rng: &mut StdRng,
    ) -> (Cluster, oneshot::Receiver<Result<Agreement>>) {
        let (done_tx, done_rx) = oneshot::channel();
        let gatherer = Gatherer::new(deliver_from, done_tx).start();
        let mut participants = Vec::with_capacity(n);
        let mut arbiters = Vec::with_capacity(n);
        for id in 1..=n {
            let participant_rng = StdRng::seed_from_u64(rng.gen());
            let arbiter = Arbiter::new();
            let addr = Participant::start_in_arbiter(&arbiter.handle(), move |_| {
                Participant::new(id, n, participant_rng)
            });
            participants.push(addr);
            arbiters.push(arbiter);
        }
        (Cluster { participants, gatherer, arbiters }, done_rx)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn roster(&self) -> Roster {
        Roster::new(
            self.participants.iter().cloned().map(Addr::recipient).collect(),
            self.gatherer.clone().recipient(),
        )
    }

    /// Hands the routing table to every participant. Must precede any other message.
    pub fn init(&self) {
        let roster = self.roster();
        for participant in self.participants.iter() {
            participant.do_send(Init { roster: roster.clone() });
        }
    }

    pub fn launch(&self, id: ParticipantId, launch: Launch) {
        if let Some(participant) = self.participant(id) {
            participant.do_send(launch);
        }
    }

    pub fn launch_all(&self) {
        for participant in self.participants.iter() {
            participant.do_send(Launch::random());
        }
    }

    pub fn enable_faults(&self, id: ParticipantId, crash_probability: f64) {
        if let Some(participant) = self.participant(id) {
            participant.do_send(EnableFaults { crash_probability });
        }
    }

    pub fn hold(&self, id: ParticipantId) {
        if let Some(participant) = self.participant(id) {
            participant.do_send(Hold);
        }
    }

    fn participant(&self, id: ParticipantId) -> Option<&Addr<Participant>> {
        let participant = id.checked_sub(1).and_then(|i| self.participants.get(i));
        if participant.is_none() {
            warn!("no participant {} in a cluster of {}", id, self.len());
        }
        participant
    }
}

impl Drop for Cluster {
    fn drop(&mut self) {
        for arbiter in self.arbiters.iter() {
            let _ = arbiter.stop();
        }
    }
}
