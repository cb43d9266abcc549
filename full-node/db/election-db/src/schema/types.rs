use borsh::{BorshDeserialize, BorshSerialize};
use election_interface::{Address, CandidateId, ElectionId, Phase};
use serde::{Deserialize, Serialize};

/// Sequence number of an accepted ballot within its election, starting at 0.
pub type BallotNumber = u64;

/// Key of a voter record: the election and the voter's address.
pub type VoterKey = (ElectionId, Address);

/// Key of a candidate row, live or final: the election and the candidate's id.
pub type CandidateKey = (ElectionId, CandidateId);

/// Key of a ballot: the election and the ballot number.
pub type BallotKey = (ElectionId, BallotNumber);

/// The on-disk header of an election.
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct StoredElection {
    /// The only address allowed to register voters and candidates or change the phase.
    pub owner: Address,
    /// The phase the election is in.
    pub phase: Phase,
    /// Milliseconds since the Unix epoch at creation.
    pub created_at_ms: u64,
}

/// Voting state of a registered voter. An address without a record is not registered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub enum Voter {
    /// Registered and has not voted yet.
    Fresh,
    /// Has cast its ballot.
    Voted,
}

impl Voter {
    /// Whether the ballot was cast.
    pub fn has_voted(&self) -> bool {
        matches!(self, Voter::Voted)
    }
}

/// A candidate on the live roster.
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct StoredCandidate {
    /// Trimmed display name.
    pub name: String,
    /// Number of accepted ballots for this candidate.
    pub vote_count: u64,
}

/// A candidate's count as frozen when the election ended.
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct FinalTally {
    /// Display name copied from the roster.
    pub name: String,
    /// The final count.
    pub vote_count: u64,
}
