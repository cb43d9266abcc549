//! A typed client for the election JSON-RPC API.

use election_interface::{
    Address, Ballot, Candidate, CandidateId, CandidateResult, ElectionEvent, ElectionId, Phase,
    ResultsSummary,
};
use jsonrpsee::core::client::{ClientT, Subscription, SubscriptionClientT};
use jsonrpsee::core::Error;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;

/// Calls the `election_` methods of a node over any jsonrpsee transport.
#[derive(Debug, Clone)]
pub struct ElectionClient<C> {
    client: C,
}

impl ElectionClient<HttpClient> {
    /// Creates a client talking HTTP to the node at `endpoint`.
    pub fn http(endpoint: &str) -> anyhow::Result<Self> {
        let client = HttpClientBuilder::default().build(endpoint)?;
        Ok(Self { client })
    }
}

impl<C: ClientT + Sync> ElectionClient<C> {
    /// Wraps an already connected client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// `election_create`
    pub async fn create_election(&self, owner: Address) -> Result<ElectionId, Error> {
        self.client
            .request("election_create", rpc_params![owner])
            .await
    }

    /// `election_list`
    pub async fn list_elections(&self) -> Result<Vec<ElectionId>, Error> {
        self.client.request("election_list", rpc_params![]).await
    }

    /// `election_addCandidate`
    pub async fn add_candidate(
        &self,
        election_id: ElectionId,
        sender: Address,
        name: &str,
    ) -> Result<CandidateId, Error> {
        self.client
            .request(
                "election_addCandidate",
                rpc_params![election_id, sender, name],
            )
            .await
    }

    /// `election_registerVoter`
    pub async fn register_voter(
        &self,
        election_id: ElectionId,
        sender: Address,
        voter: Address,
    ) -> Result<(), Error> {
        self.client
            .request(
                "election_registerVoter",
                rpc_params![election_id, sender, voter],
            )
            .await
    }

    /// `election_startElection`
    pub async fn start_election(&self, election_id: ElectionId, sender: Address) -> Result<(), Error> {
        self.client
            .request("election_startElection", rpc_params![election_id, sender])
            .await
    }

    /// `election_endElection`
    pub async fn end_election(&self, election_id: ElectionId, sender: Address) -> Result<(), Error> {
        self.client
            .request("election_endElection", rpc_params![election_id, sender])
            .await
    }

    /// `election_castVote`
    pub async fn cast_vote(
        &self,
        election_id: ElectionId,
        sender: Address,
        candidate_id: CandidateId,
    ) -> Result<Ballot, Error> {
        self.client
            .request(
                "election_castVote",
                rpc_params![election_id, sender, candidate_id],
            )
            .await
    }

    /// `election_owner`
    pub async fn owner(&self, election_id: ElectionId) -> Result<Address, Error> {
        self.client
            .request("election_owner", rpc_params![election_id])
            .await
    }

    /// `election_currentPhase`
    pub async fn current_phase(&self, election_id: ElectionId) -> Result<Phase, Error> {
        self.client
            .request("election_currentPhase", rpc_params![election_id])
            .await
    }

    /// `election_getCandidate`
    pub async fn get_candidate(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<Candidate, Error> {
        self.client
            .request("election_getCandidate", rpc_params![election_id, candidate_id])
            .await
    }

    /// `election_getCandidates`
    pub async fn get_candidates(&self, election_id: ElectionId) -> Result<Vec<Candidate>, Error> {
        self.client
            .request("election_getCandidates", rpc_params![election_id])
            .await
    }

    /// `election_count`
    pub async fn candidate_count(&self, election_id: ElectionId) -> Result<u32, Error> {
        self.client
            .request("election_count", rpc_params![election_id])
            .await
    }

    /// `election_isRegistered`
    pub async fn is_registered(&self, election_id: ElectionId, address: Address) -> Result<bool, Error> {
        self.client
            .request("election_isRegistered", rpc_params![election_id, address])
            .await
    }

    /// `election_hasVoted`
    pub async fn has_voted(&self, election_id: ElectionId, address: Address) -> Result<bool, Error> {
        self.client
            .request("election_hasVoted", rpc_params![election_id, address])
            .await
    }

    /// `election_getBallots`
    pub async fn get_ballots(
        &self,
        election_id: ElectionId,
        start: u64,
        end: u64,
    ) -> Result<Vec<Ballot>, Error> {
        self.client
            .request("election_getBallots", rpc_params![election_id, start, end])
            .await
    }

    /// `election_resultFor`
    pub async fn result_for(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<u64, Error> {
        self.client
            .request("election_resultFor", rpc_params![election_id, candidate_id])
            .await
    }

    /// `election_allResults`
    pub async fn all_results(&self, election_id: ElectionId) -> Result<Vec<CandidateResult>, Error> {
        self.client
            .request("election_allResults", rpc_params![election_id])
            .await
    }

    /// `election_resultsSummary`
    pub async fn results_summary(&self, election_id: ElectionId) -> Result<ResultsSummary, Error> {
        self.client
            .request("election_resultsSummary", rpc_params![election_id])
            .await
    }
}

impl<C: SubscriptionClientT + Sync> ElectionClient<C> {
    /// `election_subscribeEvents`: a stream of every change committed on the node.
    pub async fn subscribe_events(&self) -> Result<Subscription<ElectionEvent>, Error> {
        self.client
            .subscribe(
                "election_subscribeEvents",
                rpc_params![],
                "election_unsubscribeEvents",
            )
            .await
    }
}
