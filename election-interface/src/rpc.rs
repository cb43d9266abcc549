//! The interface between an election host and its RPC server.

use tokio::sync::broadcast;

use crate::{
    Address, Ballot, Candidate, CandidateId, CandidateResult, ElectionError, ElectionEvent,
    ElectionId, Phase, ResultsSummary,
};

/// An upper bound on the number of ballots returned by one range query.
pub const MAX_BALLOTS_PER_REQUEST: u64 = 1024;

/// A host of one or more elections that can be served over RPC.
///
/// Every mutating method takes the authenticated `sender` supplied by the transport; the
/// provider trusts it as given.
pub trait ElectionRpcProvider {
    /// Creates a new election owned by `owner`.
    fn create_election(&self, owner: Address) -> Result<ElectionId, ElectionError>;

    /// Lists the ids of all hosted elections.
    fn list_elections(&self) -> Result<Vec<ElectionId>, ElectionError>;

    /// Adds a candidate to the roster.
    fn add_candidate(
        &self,
        election_id: ElectionId,
        sender: Address,
        name: String,
    ) -> Result<CandidateId, ElectionError>;

    /// Registers a voter.
    fn register_voter(
        &self,
        election_id: ElectionId,
        sender: Address,
        voter: Address,
    ) -> Result<(), ElectionError>;

    /// Opens voting.
    fn start_election(&self, election_id: ElectionId, sender: Address)
        -> Result<(), ElectionError>;

    /// Closes voting and publishes the results.
    fn end_election(&self, election_id: ElectionId, sender: Address) -> Result<(), ElectionError>;

    /// Casts the sender's vote.
    fn cast_vote(
        &self,
        election_id: ElectionId,
        sender: Address,
        candidate_id: CandidateId,
    ) -> Result<Ballot, ElectionError>;

    /// The owner set at creation. Clients compare it with the connected account to decide
    /// between the owner and voter views.
    fn owner(&self, election_id: ElectionId) -> Result<Address, ElectionError>;

    /// The election's current phase.
    fn current_phase(&self, election_id: ElectionId) -> Result<Phase, ElectionError>;

    /// A single candidate with its live count.
    fn get_candidate(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<Candidate, ElectionError>;

    /// The whole roster, ordered by id.
    fn get_candidates(&self, election_id: ElectionId) -> Result<Vec<Candidate>, ElectionError>;

    /// Number of candidates on the roster.
    fn candidate_count(&self, election_id: ElectionId) -> Result<u32, ElectionError>;

    /// Whether `address` is a registered voter.
    fn is_registered(&self, election_id: ElectionId, address: Address)
        -> Result<bool, ElectionError>;

    /// Whether `address` has voted.
    fn has_voted(&self, election_id: ElectionId, address: Address) -> Result<bool, ElectionError>;

    /// Accepted ballots with numbers in `start..end`.
    fn get_ballots(
        &self,
        election_id: ElectionId,
        start: u64,
        end: u64,
    ) -> Result<Vec<Ballot>, ElectionError>;

    /// The frozen count of one candidate. Only available once the election has ended.
    fn result_for(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<u64, ElectionError>;

    /// All frozen results, ordered by candidate id.
    fn all_results(&self, election_id: ElectionId) -> Result<Vec<CandidateResult>, ElectionError>;

    /// Aggregate figures of the published results.
    fn results_summary(&self, election_id: ElectionId) -> Result<ResultsSummary, ElectionError>;

    /// Subscribes to change notifications for every hosted election.
    fn subscribe_events(&self) -> Result<broadcast::Receiver<ElectionEvent>, ElectionError>;
}
