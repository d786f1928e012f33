use crate::colored::Colorize;
use crate::synod::{ParticipantId, Value};
use crate::{Error, Result};

use actix::{Actor, ActorContext, Context, Handler};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// A participant reports the value it decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Message)]
#[rtype(result = "Result<()>")]
pub struct Deliver {
    pub from: ParticipantId,
    pub value: Value,
}

/// The outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub value: Value,
    pub deliveries: usize,
}

/// Counts deliveries and checks that they all carry the same value.
#[derive(Debug, Clone)]
pub struct Tally {
    /// Number of deliveries which completes the run.
    deliver_from: usize,
    delivered: usize,
    value: Option<Value>,
}

impl Tally {
    pub fn new(deliver_from: usize) -> Self {
        Tally { deliver_from, delivered: 0, value: None }
    }

    /// Records a delivery. Returns the agreement once `deliver_from` matching deliveries
    /// have been seen, and an error as soon as a delivery disagrees with the first one.
    pub fn record(&mut self, deliver: Deliver) -> Result<Option<Agreement>> {
        let expected = *self.value.get_or_insert(deliver.value);
        if expected != deliver.value {
            return Err(Error::AgreementViolation {
                from: deliver.from,
                expected,
                delivered: deliver.value,
            });
        }
        self.delivered += 1;
        if self.delivered == self.deliver_from {
            Ok(Some(Agreement { value: expected, deliveries: self.delivered }))
        } else {
            Ok(None)
        }
    }
}

/// The termination detector of a run.
///
/// Resolves `done` exactly once, with the agreement or with the violation, then stops.
pub struct Gatherer {
    tally: Tally,
    done: Option<oneshot::Sender<Result<Agreement>>>,
}

impl Gatherer {
    pub fn new(deliver_from: usize, done: oneshot::Sender<Result<Agreement>>) -> Self {
        Gatherer { tally: Tally::new(deliver_from), done: Some(done) }
    }

    fn finish(&mut self, outcome: Result<Agreement>, ctx: &mut Context<Self>) {
        if let Some(done) = self.done.take() {
            let _ = done.send(outcome);
        }
        ctx.stop();
    }
}

impl Actor for Gatherer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("gatherer: started");
    }
}

impl Handler<Deliver> for Gatherer {
    type Result = Result<()>;

    fn handle(&mut self, msg: Deliver, ctx: &mut Context<Self>) -> Self::Result {
        // Late deliveries after completion are expected and carry nothing new.
        if self.done.is_none() {
            return Ok(());
        }
        debug!("[{}] participant {} delivered {}", "gatherer".cyan(), msg.from, msg.value);
        match self.tally.record(msg) {
            Ok(Some(agreement)) => {
                info!(
                    "[{}] {} participants agreed on {}",
                    "gatherer".cyan(),
                    agreement.deliveries,
                    agreement.value
                );
                self.finish(Ok(agreement), ctx);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(Error::AgreementViolation { from, expected, delivered }) => {
                error!(
                    "[{}] agreement violated: participant {} delivered {}, expected {}",
                    "gatherer".red(),
                    from,
                    delivered,
                    expected
                );
                self.finish(Err(Error::AgreementViolation { from, expected, delivered }), ctx);
                Err(Error::AgreementViolation { from, expected, delivered })
            }
            Err(e) => Err(e),
        }
    }
}
