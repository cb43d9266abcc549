use core::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::Address;

/// Identifies a single election hosted by a node. Assigned sequentially, starting at 1.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshDeserialize,
    BorshSerialize,
)]
#[serde(transparent)]
pub struct ElectionId(pub u64);

impl From<u64> for ElectionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ElectionId> for u64 {
    fn from(value: ElectionId) -> Self {
        value.0
    }
}

impl fmt::Display for ElectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense, 0-based index of a candidate in registration order.
pub type CandidateId = u32;

/// The stage an election is in. Transitions are strictly forward:
/// `Created -> InProgress -> Ended`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshDeserialize,
    BorshSerialize,
)]
pub enum Phase {
    /// Setup: candidates and voters are being registered.
    #[default]
    Created,
    /// Voting is open.
    InProgress,
    /// Voting is closed and results are final.
    Ended,
}

impl Phase {
    /// The numeric code of the phase, as wallet clients compare it.
    pub const fn code(self) -> u8 {
        match self {
            Phase::Created => 0,
            Phase::InProgress => 1,
            Phase::Ended => 2,
        }
    }

    /// The only phase this one may transition to, if any.
    pub const fn next(self) -> Option<Phase> {
        match self {
            Phase::Created => Some(Phase::InProgress),
            Phase::InProgress => Some(Phase::Ended),
            Phase::Ended => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "Created",
            Phase::InProgress => "InProgress",
            Phase::Ended => "Ended",
        };
        f.write_str(name)
    }
}

/// A candidate on the roster together with its live vote counter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Position on the roster.
    pub id: CandidateId,
    /// Display name, trimmed.
    pub name: String,
    /// Number of accepted ballots for this candidate.
    pub vote_count: u64,
}

/// A single accepted vote. Ballots are append-only log records, never mutated.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    /// The election the ballot was cast in.
    pub election_id: ElectionId,
    /// Sequence number of the ballot within its election, starting at 0.
    pub number: u64,
    /// The voter who cast it.
    pub voter: Address,
    /// The chosen candidate.
    pub candidate_id: CandidateId,
    /// Acceptance time in milliseconds since the Unix epoch.
    pub accepted_at_ms: u64,
}

/// The frozen tally of one candidate, as published to the results ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    /// Position on the roster.
    pub candidate_id: CandidateId,
    /// Display name.
    pub name: String,
    /// Final number of votes.
    pub vote_count: u64,
}

/// Aggregate figures recorded when an election's results are published.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    /// Number of candidates on the final roster.
    pub candidate_count: u32,
    /// Sum of all candidates' votes.
    pub total_votes: u64,
    /// Publication time in milliseconds since the Unix epoch.
    pub finalized_at_ms: u64,
}

/// A change notification emitted after a mutation has been durably committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElectionEvent {
    /// A new election was created.
    #[serde(rename_all = "camelCase")]
    ElectionCreated {
        /// The new election.
        election_id: ElectionId,
        /// Its owner.
        owner: Address,
    },
    /// A voter was added to the registry.
    #[serde(rename_all = "camelCase")]
    VoterRegistered {
        /// The election.
        election_id: ElectionId,
        /// The registered voter.
        voter: Address,
    },
    /// A candidate was added to the roster.
    #[serde(rename_all = "camelCase")]
    CandidateAdded {
        /// The election.
        election_id: ElectionId,
        /// The id assigned to the candidate.
        candidate_id: CandidateId,
        /// The candidate's name.
        name: String,
    },
    /// The election moved to a new phase.
    #[serde(rename_all = "camelCase")]
    PhaseChanged {
        /// The election.
        election_id: ElectionId,
        /// The phase entered.
        phase: Phase,
    },
    /// A ballot was accepted.
    BallotCast(Ballot),
}

impl ElectionEvent {
    /// The election this event belongs to.
    pub fn election_id(&self) -> ElectionId {
        match self {
            ElectionEvent::ElectionCreated { election_id, .. }
            | ElectionEvent::VoterRegistered { election_id, .. }
            | ElectionEvent::CandidateAdded { election_id, .. }
            | ElectionEvent::PhaseChanged { election_id, .. } => *election_id,
            ElectionEvent::BallotCast(ballot) => ballot.election_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_only_move_forward() {
        assert_eq!(Phase::default(), Phase::Created);
        assert_eq!(Phase::Created.next(), Some(Phase::InProgress));
        assert_eq!(Phase::InProgress.next(), Some(Phase::Ended));
        assert_eq!(Phase::Ended.next(), None);
        assert!(Phase::Created < Phase::InProgress && Phase::InProgress < Phase::Ended);
    }

    #[test]
    fn phase_codes_match_wallet_client() {
        assert_eq!(Phase::Created.code(), 0);
        assert_eq!(Phase::InProgress.code(), 1);
        assert_eq!(Phase::Ended.code(), 2);
    }

    #[test]
    fn event_json_shape() {
        let event = ElectionEvent::PhaseChanged {
            election_id: ElectionId(3),
            phase: Phase::InProgress,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"phaseChanged": {"electionId": 3, "phase": "InProgress"}})
        );
        assert_eq!(event.election_id(), ElectionId(3));
    }
}
