use thiserror::Error;

use crate::{Address, CandidateId, ElectionId};

/// Every way an election operation can fail.
///
/// All kinds except [`ElectionError::Storage`] are local validation failures: they are
/// deterministic, and retrying the same call against the same state fails the same way.
/// A failed operation never leaves a partial mutation behind.
#[derive(Debug, Error)]
pub enum ElectionError {
    /// The caller lacks the right to perform the action: it is not the owner, or (when
    /// voting) it is not a registered voter.
    #[error("{0} is not authorized to perform this action")]
    Unauthorized(Address),
    /// The action is not legal in the election's current phase.
    #[error("Invalid election state: {0}")]
    InvalidState(String),
    /// The address is already in the voter registry.
    #[error("Voter {0} is already registered")]
    AlreadyRegistered(Address),
    /// The voter has already cast a ballot in this election.
    #[error("Voter {0} has already voted")]
    AlreadyVoted(Address),
    /// The address may not be registered as a voter (the owner cannot vote).
    #[error("{0} cannot be registered as a voter")]
    InvalidVoter(Address),
    /// A candidate name was empty after trimming.
    #[error("Candidate name cannot be empty")]
    EmptyName,
    /// No candidate has the given id.
    #[error("Candidate {0} does not exist")]
    NotFound(CandidateId),
    /// The election cannot start with an empty roster.
    #[error("Cannot start an election without candidates")]
    NoCandidates,
    /// No election is hosted under the given id.
    #[error("Election {0} does not exist")]
    UnknownElection(ElectionId),
    /// The storage layer failed. Nothing was applied; the call may be retried.
    #[error("Storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// The discriminant of an [`ElectionError`], with a stable numeric code for wire protocols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorKind {
    Unauthorized,
    InvalidState,
    AlreadyRegistered,
    AlreadyVoted,
    InvalidVoter,
    EmptyName,
    NotFound,
    NoCandidates,
    UnknownElection,
    Storage,
}

impl ErrorKind {
    /// Stable code identifying the kind on the wire.
    pub const fn code(self) -> i32 {
        match self {
            ErrorKind::Unauthorized => 1,
            ErrorKind::InvalidState => 2,
            ErrorKind::AlreadyRegistered => 3,
            ErrorKind::AlreadyVoted => 4,
            ErrorKind::InvalidVoter => 5,
            ErrorKind::EmptyName => 6,
            ErrorKind::NotFound => 7,
            ErrorKind::NoCandidates => 8,
            ErrorKind::UnknownElection => 9,
            ErrorKind::Storage => 10,
        }
    }

    /// Short machine-readable name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::AlreadyRegistered => "ALREADY_REGISTERED",
            ErrorKind::AlreadyVoted => "ALREADY_VOTED",
            ErrorKind::InvalidVoter => "INVALID_VOTER",
            ErrorKind::EmptyName => "EMPTY_NAME",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::NoCandidates => "NO_CANDIDATES",
            ErrorKind::UnknownElection => "UNKNOWN_ELECTION",
            ErrorKind::Storage => "STORAGE",
        }
    }
}

impl ElectionError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ElectionError::Unauthorized(_) => ErrorKind::Unauthorized,
            ElectionError::InvalidState(_) => ErrorKind::InvalidState,
            ElectionError::AlreadyRegistered(_) => ErrorKind::AlreadyRegistered,
            ElectionError::AlreadyVoted(_) => ErrorKind::AlreadyVoted,
            ElectionError::InvalidVoter(_) => ErrorKind::InvalidVoter,
            ElectionError::EmptyName => ErrorKind::EmptyName,
            ElectionError::NotFound(_) => ErrorKind::NotFound,
            ElectionError::NoCandidates => ErrorKind::NoCandidates,
            ElectionError::UnknownElection(_) => ErrorKind::UnknownElection,
            ElectionError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Only storage failures are transient; validation failures are authoritative.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ElectionError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn codes_are_distinct() {
        let kinds = [
            ErrorKind::Unauthorized,
            ErrorKind::InvalidState,
            ErrorKind::AlreadyRegistered,
            ErrorKind::AlreadyVoted,
            ErrorKind::InvalidVoter,
            ErrorKind::EmptyName,
            ErrorKind::NotFound,
            ErrorKind::NoCandidates,
            ErrorKind::UnknownElection,
            ErrorKind::Storage,
        ];
        let codes: HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn only_storage_is_retryable() {
        assert!(ElectionError::Storage(anyhow::anyhow!("disk full")).is_retryable());
        assert!(!ElectionError::EmptyName.is_retryable());
        assert!(!ElectionError::AlreadyVoted(Address::default()).is_retryable());
    }
}
