use std::collections::HashMap;

use election_db::schema::types::{StoredCandidate, StoredElection, Voter};
use election_interface::{Address, Candidate, CandidateId, CandidateResult, Phase};

/// In-memory snapshot of one election, mirroring what is committed to storage.
#[derive(Debug, Clone)]
pub(crate) struct ElectionState {
    pub(crate) owner: Address,
    pub(crate) phase: Phase,
    pub(crate) created_at_ms: u64,
    /// Indexed by candidate id.
    pub(crate) candidates: Vec<StoredCandidate>,
    pub(crate) voters: HashMap<Address, Voter>,
    /// Number of accepted ballots, which is also the number of the next one.
    pub(crate) ballot_count: u64,
}

impl ElectionState {
    pub(crate) fn new(owner: Address, created_at_ms: u64) -> Self {
        Self {
            owner,
            phase: Phase::Created,
            created_at_ms,
            candidates: Vec::new(),
            voters: HashMap::new(),
            ballot_count: 0,
        }
    }

    pub(crate) fn header(&self) -> StoredElection {
        StoredElection {
            owner: self.owner,
            phase: self.phase,
            created_at_ms: self.created_at_ms,
        }
    }

    pub(crate) fn candidate(&self, candidate_id: CandidateId) -> Option<&StoredCandidate> {
        self.candidates.get(candidate_id as usize)
    }

    pub(crate) fn roster(&self) -> Vec<Candidate> {
        self.candidates
            .iter()
            .zip(0..)
            .map(|(candidate, id)| Candidate {
                id,
                name: candidate.name.clone(),
                vote_count: candidate.vote_count,
            })
            .collect()
    }

    pub(crate) fn tallies(&self) -> Vec<CandidateResult> {
        self.roster()
            .into_iter()
            .map(|candidate| CandidateResult {
                candidate_id: candidate.id,
                name: candidate.name,
                vote_count: candidate.vote_count,
            })
            .collect()
    }
}
