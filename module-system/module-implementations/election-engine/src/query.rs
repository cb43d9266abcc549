use election_interface::rpc::MAX_BALLOTS_PER_REQUEST;
use election_interface::{
    Address, Ballot, Candidate, CandidateId, CandidateResult, ElectionError, Phase,
    ResultsSummary,
};
use election_results::AllResults;

use super::Election;

impl Election {
    /// The election's current phase.
    pub fn current_phase(&self) -> Phase {
        self.state.read().expect("Lock must not be poisoned").phase
    }

    /// The owner set at creation.
    pub fn owner(&self) -> Address {
        self.state.read().expect("Lock must not be poisoned").owner
    }

    /// A candidate with its live count.
    pub fn get_candidate(&self, candidate_id: CandidateId) -> Result<Candidate, ElectionError> {
        let state = self.state.read().expect("Lock must not be poisoned");
        state
            .candidate(candidate_id)
            .map(|candidate| Candidate {
                id: candidate_id,
                name: candidate.name.clone(),
                vote_count: candidate.vote_count,
            })
            .ok_or(ElectionError::NotFound(candidate_id))
    }

    /// The whole roster, ordered by id.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.state.read().expect("Lock must not be poisoned").roster()
    }

    /// Number of candidates on the roster.
    pub fn count(&self) -> u32 {
        // Ids are `u32`, so the roster never outgrows it.
        self.state
            .read()
            .expect("Lock must not be poisoned")
            .candidates
            .len() as u32
    }

    /// Whether `address` is a registered voter.
    pub fn is_registered(&self, address: &Address) -> bool {
        self.state
            .read()
            .expect("Lock must not be poisoned")
            .voters
            .contains_key(address)
    }

    /// Whether `address` has cast its ballot.
    pub fn has_voted(&self, address: &Address) -> bool {
        self.state
            .read()
            .expect("Lock must not be poisoned")
            .voters
            .get(address)
            .map_or(false, |voter| voter.has_voted())
    }

    /// Number of registered voters.
    pub fn voter_count(&self) -> usize {
        self.state
            .read()
            .expect("Lock must not be poisoned")
            .voters
            .len()
    }

    /// Number of accepted ballots.
    pub fn ballot_count(&self) -> u64 {
        self.state
            .read()
            .expect("Lock must not be poisoned")
            .ballot_count
    }

    /// Accepted ballots with numbers in `start..end`, at most [`MAX_BALLOTS_PER_REQUEST`]
    /// of them.
    pub fn ballots(&self, start: u64, end: u64) -> Result<Vec<Ballot>, ElectionError> {
        let end = end.min(start.saturating_add(MAX_BALLOTS_PER_REQUEST));
        Ok(self.storage.ballots(self.id, start, end)?)
    }

    /// The frozen count of a candidate, once the election has ended.
    pub fn result_for(&self, candidate_id: CandidateId) -> Result<u64, ElectionError> {
        self.results.result_for(self.id, candidate_id)
    }

    /// All frozen results, ordered by candidate id, once the election has ended.
    pub fn all_results(&self) -> Result<AllResults, ElectionError> {
        self.results.all_results(self.id)
    }

    /// Aggregate figures of the published results.
    pub fn results_summary(&self) -> Result<ResultsSummary, ElectionError> {
        self.results.summary(self.id)
    }

    /// The candidates with the highest final count; ties are all returned.
    pub fn leaders(&self) -> Result<Vec<CandidateResult>, ElectionError> {
        self.results.leaders(self.id)
    }
}
