use crate::colored::Colorize;

use super::message::{EnableFaults, Hold, Init, Launch, Roster, SynodMsg};
use super::state::{Outbound, Synod};
use super::{ParticipantId, Value};

use actix::{Actor, ActorContext, Context, Handler};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, warn};

/// One consensus participant.
///
/// The actor owns the protocol state and its random source. It only talks to its peers
/// through the [Roster] received with [Init].
pub struct Participant {
    synod: Synod,
    roster: Option<Roster>,
    rng: StdRng,
    /// Set once the participant is fault-prone.
    crash_probability: Option<f64>,
    /// Decided or crashed. Absorbing.
    terminated: bool,
}

impl Participant {
    pub fn new(id: ParticipantId, n: usize, rng: StdRng) -> Self {
        Participant {
            synod: Synod::new(id, n),
            roster: None,
            rng,
            crash_probability: None,
            terminated: false,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.synod.id()
    }

    fn dispatch(&self, outbound: Vec<Outbound>) {
        let roster = match self.roster.as_ref() {
            Some(roster) => roster,
            None => return,
        };
        for out in outbound {
            match out {
                Outbound::To(to, msg) => {
                    debug!("{} -> {}: {:?}", self.id(), to, msg);
                    roster.send(to, msg)
                }
                Outbound::Broadcast(msg) => {
                    debug!("{} -> *: {:?}", self.id(), msg);
                    roster.broadcast(msg)
                }
                Outbound::Deliver(deliver) => roster.deliver(deliver),
            }
        }
    }

    /// Runs after every handled message except `Init`. A decision terminates the participant
    /// before any crash is drawn.
    fn settle(&mut self, ctx: &mut Context<Self>) {
        if let Some(value) = self.synod.decision() {
            info!("[{}] participant {} decided {}", "synod".blue(), self.id(), value);
            self.terminate(ctx);
            return;
        }
        if let Some(p) = self.crash_probability {
            if self.rng.gen::<f64>() <= p {
                info!("[{}] participant {} crashed", "synod".red(), self.id());
                self.terminate(ctx);
            }
        }
    }

    fn terminate(&mut self, ctx: &mut Context<Self>) {
        self.terminated = true;
        ctx.stop();
    }

    fn propose(&mut self, value: Value) {
        info!("[{}] participant {} proposes {}", "synod".blue(), self.id(), value);
        let read = self.synod.propose(value);
        self.dispatch(vec![read]);
    }
}

impl Actor for Participant {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("participant {}: started", self.id());
    }
}

impl Handler<Init> for Participant {
    type Result = ();

    fn handle(&mut self, msg: Init, _ctx: &mut Context<Self>) -> Self::Result {
        if self.terminated {
            return;
        }
        self.roster = Some(msg.roster);
    }
}

impl Handler<EnableFaults> for Participant {
    type Result = ();

    fn handle(&mut self, msg: EnableFaults, ctx: &mut Context<Self>) -> Self::Result {
        if self.terminated {
            return;
        }
        debug!("participant {} is fault-prone (p = {})", self.id(), msg.crash_probability);
        self.crash_probability = Some(msg.crash_probability);
        self.settle(ctx);
    }
}

impl Handler<Hold> for Participant {
    type Result = ();

    fn handle(&mut self, _msg: Hold, ctx: &mut Context<Self>) -> Self::Result {
        if self.terminated {
            return;
        }
        self.synod.hold();
        self.settle(ctx);
    }
}

impl Handler<Launch> for Participant {
    type Result = ();

    fn handle(&mut self, msg: Launch, ctx: &mut Context<Self>) -> Self::Result {
        if self.terminated {
            return;
        }
        if self.roster.is_none() {
            warn!("participant {} launched before init, dropping", self.id());
            return;
        }
        let value = match msg.value {
            Some(value) => value,
            None => Value::random(&mut self.rng),
        };
        self.propose(value);
        self.settle(ctx);
    }
}

impl Handler<SynodMsg> for Participant {
    type Result = ();

    fn handle(&mut self, msg: SynodMsg, ctx: &mut Context<Self>) -> Self::Result {
        if self.terminated {
            return;
        }
        if self.roster.is_none() {
            warn!("participant {} received {:?} before init, dropping", self.id(), msg);
            return;
        }
        let outbound = self.synod.handle(msg);
        self.dispatch(outbound);
        self.settle(ctx);
    }
}
