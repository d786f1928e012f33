//! The per-participant Synod state machine.
//!
//! [Synod] holds no handles to other participants. Every transition returns the messages it
//! wants sent as [Outbound] values, the [Participant][super::Participant] actor routes them.

use crate::gatherer::Deliver;

use super::ballot::{self, Ballot};
use super::message::SynodMsg;
use super::{ParticipantId, Value};

use std::collections::{BTreeMap, BTreeSet};

/// Where a participant stands in its current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No round started yet.
    Idle,
    /// `Read` was broadcast, collecting `Gather` replies.
    Gathering,
    /// `Impose` was broadcast, collecting `Ack` replies.
    Imposing,
    /// A quorum acknowledged the current ballot and `Decide` went out.
    Committed,
    /// A `Decide` was received. Absorbing.
    Decided,
}

/// A message produced by a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outbound {
    /// Reply to a single participant.
    To(ParticipantId, SynodMsg),
    /// Send to every participant, including self.
    Broadcast(SynodMsg),
    /// Report the decision to the gatherer.
    Deliver(Deliver),
}

#[derive(Debug, Clone)]
pub struct Synod {
    id: ParticipantId,
    n: usize,
    quorum: usize,
    /// The ballot of the round this participant is pushing.
    ballot: Ballot,
    /// The value pushed through the current round.
    proposal: Option<Value>,
    /// Highest ballot promised in a `Read`.
    read_ballot: Ballot,
    /// Highest ballot at which a value was accepted, and that value.
    impose_ballot: Ballot,
    estimate: Option<Value>,
    /// `(estimate, imposeBallot)` reported by each sender during the gather phase.
    states: BTreeMap<ParticipantId, (Option<Value>, Ballot)>,
    acks: BTreeSet<ParticipantId>,
    held: bool,
    stage: Stage,
    decision: Option<Value>,
}

impl Synod {
    pub fn new(id: ParticipantId, n: usize) -> Self {
        debug_assert!(id >= 1 && id <= n, "participant id {} out of range 1..={}", id, n);
        Synod {
            id,
            n,
            quorum: ballot::quorum(n),
            ballot: ballot::initial(id, n),
            proposal: None,
            read_ballot: 0,
            impose_ballot: ballot::initial(id, n),
            estimate: None,
            states: BTreeMap::new(),
            acks: BTreeSet::new(),
            held: false,
            stage: Stage::Idle,
            decision: None,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn ballot(&self) -> Ballot {
        self.ballot
    }

    pub fn proposal(&self) -> Option<Value> {
        self.proposal
    }

    pub fn read_ballot(&self) -> Ballot {
        self.read_ballot
    }

    pub fn impose_ballot(&self) -> Ballot {
        self.impose_ballot
    }

    pub fn estimate(&self) -> Option<Value> {
        self.estimate
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn decision(&self) -> Option<Value> {
        self.decision
    }

    pub fn is_decided(&self) -> bool {
        self.decision.is_some()
    }

    /// Stops retrying aborted rounds from now on.
    pub fn hold(&mut self) {
        self.held = true;
    }

    /// Starts a new round for `value` with the next ballot of this participant.
    pub fn propose(&mut self, value: Value) -> Outbound {
        self.proposal = Some(value);
        self.ballot = ballot::next(self.ballot, self.n);
        self.states.clear();
        self.acks.clear();
        self.stage = Stage::Gathering;
        Outbound::Broadcast(SynodMsg::Read { ballot: self.ballot, from: self.id })
    }

    /// Applies one protocol message. A decided participant ignores everything.
    pub fn handle(&mut self, msg: SynodMsg) -> Vec<Outbound> {
        if self.is_decided() {
            return vec![];
        }
        match msg {
            SynodMsg::Read { ballot, from } => vec![self.on_read(ballot, from)],
            SynodMsg::Abort { ballot } => self.on_abort(ballot).into_iter().collect(),
            SynodMsg::Gather { ballot, est_ballot, estimate, from } => {
                self.on_gather(ballot, est_ballot, estimate, from).into_iter().collect()
            }
            SynodMsg::Impose { ballot, value, from } => vec![self.on_impose(ballot, value, from)],
            SynodMsg::Ack { ballot, from } => self.on_ack(ballot, from).into_iter().collect(),
            SynodMsg::Decide { value } => self.on_decide(value),
        }
    }

    /// Whether a request for `ballot` is dominated by a promise or an accepted value.
    fn is_stale(&self, ballot: Ballot) -> bool {
        self.read_ballot > ballot || self.impose_ballot > ballot
    }

    fn on_read(&mut self, ballot: Ballot, from: ParticipantId) -> Outbound {
        if self.is_stale(ballot) {
            return Outbound::To(from, SynodMsg::Abort { ballot });
        }
        self.read_ballot = ballot;
        Outbound::To(
            from,
            SynodMsg::Gather {
                ballot,
                est_ballot: self.impose_ballot,
                estimate: self.estimate,
                from: self.id,
            },
        )
    }

    fn on_abort(&mut self, ballot: Ballot) -> Option<Outbound> {
        if ballot != self.ballot {
            return None;
        }
        if self.held {
            return None;
        }
        // Aborts only ever name a ballot this participant proposed.
        let value = self.proposal?;
        Some(self.propose(value))
    }

    fn on_gather(
        &mut self,
        ballot: Ballot,
        est_ballot: Ballot,
        estimate: Option<Value>,
        from: ParticipantId,
    ) -> Option<Outbound> {
        if ballot != self.ballot || self.stage != Stage::Gathering {
            return None;
        }
        let _ = self.states.insert(from, (estimate, est_ballot));
        if self.states.len() < self.quorum {
            return None;
        }

        // Once some participant accepted a value, only that value may be imposed.
        let highest = self.states.values().max_by_key(|(_, est_ballot)| *est_ballot).cloned();
        if let Some((Some(value), est_ballot)) = highest {
            if est_ballot > 0 {
                self.proposal = Some(value);
            }
        }
        self.states.clear();

        let value = self.proposal?;
        self.stage = Stage::Imposing;
        Some(Outbound::Broadcast(SynodMsg::Impose { ballot: self.ballot, value, from: self.id }))
    }

    fn on_impose(&mut self, ballot: Ballot, value: Value, from: ParticipantId) -> Outbound {
        if self.is_stale(ballot) {
            return Outbound::To(from, SynodMsg::Abort { ballot });
        }
        self.estimate = Some(value);
        self.impose_ballot = ballot;
        Outbound::To(from, SynodMsg::Ack { ballot, from: self.id })
    }

    fn on_ack(&mut self, ballot: Ballot, from: ParticipantId) -> Option<Outbound> {
        if ballot != self.ballot || self.stage != Stage::Imposing {
            return None;
        }
        let _ = self.acks.insert(from);
        if self.acks.len() < self.quorum {
            return None;
        }
        let value = self.proposal?;
        self.stage = Stage::Committed;
        Some(Outbound::Broadcast(SynodMsg::Decide { value }))
    }

    fn on_decide(&mut self, value: Value) -> Vec<Outbound> {
        self.decision = Some(value);
        self.stage = Stage::Decided;
        vec![
            Outbound::Broadcast(SynodMsg::Decide { value }),
            Outbound::Deliver(Deliver { from: self.id, value }),
        ]
    }
}
