//! Ballot numbering and quorum arithmetic shared by every participant.
//!
//! Participant `i` of `n` owns the ballots `i - n, i, i + n, i + 2n, ...`. Each sequence is
//! strictly increasing and congruent to `i mod n`, so two participants can never produce the
//! same ballot and a higher ballot always wins a round.

use super::ParticipantId;

/// A round identifier.
pub type Ballot = i64;

/// The minimum number of participants whose replies are needed to impose or decide.
pub fn quorum(n: usize) -> usize {
    n / 2 + 1
}

/// The ballot a participant starts from. It is never used for a round, the first call to
/// [next] yields the first real ballot.
pub fn initial(id: ParticipantId, n: usize) -> Ballot {
    id as Ballot - n as Ballot
}

/// The ballot following `ballot` in the owner's sequence.
pub fn next(ballot: Ballot, n: usize) -> Ballot {
    ballot + n as Ballot
}

/// Iterates over the ballots owned by `id`, starting with [initial].
#[derive(Debug, Clone)]
pub struct BallotSeq {
    current: Ballot,
    n: usize,
}

impl BallotSeq {
    pub fn new(id: ParticipantId, n: usize) -> Self {
        BallotSeq { current: initial(id, n), n }
    }
}

impl Iterator for BallotSeq {
    type Item = Ballot;

    fn next(&mut self) -> Option<Ballot> {
        let ballot = self.current;
        self.current = next(self.current, self.n);
        Some(ballot)
    }
}
