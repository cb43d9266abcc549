use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use election_db::ElectionStorage;
use election_interface::rpc::ElectionRpcProvider;
use election_interface::{
    Address, Ballot, Candidate, CandidateId, CandidateResult, ElectionError, ElectionEvent,
    ElectionId, Phase, ResultsSummary,
};
use election_results::ResultLedger;
use tokio::sync::broadcast;
use tracing::info;

use super::{Context, Election, ElectionConfig};

/// How many events a slow subscriber may fall behind before it starts missing them.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Hosts every election stored in one [`ElectionStorage`].
pub struct ElectionService {
    storage: ElectionStorage,
    results: ResultLedger,
    elections: RwLock<BTreeMap<ElectionId, Arc<Election>>>,
    events: broadcast::Sender<ElectionEvent>,
}

impl ElectionService {
    /// Opens the service over `storage`, restoring every election found there.
    pub fn new(storage: ElectionStorage) -> anyhow::Result<Self> {
        let results = ResultLedger::new(storage.clone());
        let events = broadcast::channel(EVENT_CHANNEL_CAPACITY).0;

        let mut elections = BTreeMap::new();
        for (id, header) in storage.elections()? {
            let election = Election::restore(
                id,
                header,
                storage.clone(),
                results.clone(),
                events.clone(),
            )?;
            elections.insert(id, Arc::new(election));
        }
        info!(elections = elections.len(), "Election service ready");

        Ok(Self {
            storage,
            results,
            elections: RwLock::new(elections),
            events,
        })
    }

    /// Creates a new election and returns it. Ids are assigned sequentially from 1, following
    /// the highest id in storage.
    pub fn create_election(&self, config: &ElectionConfig) -> Result<Arc<Election>, ElectionError> {
        let mut elections = self.elections.write().expect("Lock must not be poisoned");
        let id = self
            .storage
            .last_election_id()?
            .map_or(ElectionId(1), |last| ElectionId(last.0 + 1));

        let election = Arc::new(Election::init(
            id,
            config,
            self.storage.clone(),
            self.results.clone(),
            self.events.clone(),
        )?);
        elections.insert(id, election.clone());
        Ok(election)
    }

    /// The election stored under `id`.
    pub fn election(&self, id: ElectionId) -> Result<Arc<Election>, ElectionError> {
        self.elections
            .read()
            .expect("Lock must not be poisoned")
            .get(&id)
            .cloned()
            .ok_or(ElectionError::UnknownElection(id))
    }

    /// Ids of all hosted elections, ascending.
    pub fn election_ids(&self) -> Vec<ElectionId> {
        self.elections
            .read()
            .expect("Lock must not be poisoned")
            .keys()
            .copied()
            .collect()
    }

    /// The ledger holding the published results of every hosted election.
    pub fn results(&self) -> &ResultLedger {
        &self.results
    }

    /// Receives an [`ElectionEvent`] for every committed change, in any election.
    pub fn subscribe(&self) -> broadcast::Receiver<ElectionEvent> {
        self.events.subscribe()
    }
}

impl ElectionRpcProvider for ElectionService {
    fn create_election(&self, owner: Address) -> Result<ElectionId, ElectionError> {
        ElectionService::create_election(self, &ElectionConfig { admin: owner })
            .map(|election| election.id())
    }

    fn list_elections(&self) -> Result<Vec<ElectionId>, ElectionError> {
        Ok(self.election_ids())
    }

    fn add_candidate(
        &self,
        election_id: ElectionId,
        sender: Address,
        name: String,
    ) -> Result<CandidateId, ElectionError> {
        self.election(election_id)?
            .add_candidate(&name, &Context::new(sender))
    }

    fn register_voter(
        &self,
        election_id: ElectionId,
        sender: Address,
        voter: Address,
    ) -> Result<(), ElectionError> {
        self.election(election_id)?
            .register_voter(voter, &Context::new(sender))
    }

    fn start_election(&self, election_id: ElectionId, sender: Address) -> Result<(), ElectionError> {
        self.election(election_id)?
            .start_election(&Context::new(sender))
    }

    fn end_election(&self, election_id: ElectionId, sender: Address) -> Result<(), ElectionError> {
        self.election(election_id)?
            .end_election(&Context::new(sender))
    }

    fn cast_vote(
        &self,
        election_id: ElectionId,
        sender: Address,
        candidate_id: CandidateId,
    ) -> Result<Ballot, ElectionError> {
        self.election(election_id)?
            .cast_vote(candidate_id, &Context::new(sender))
    }

    fn owner(&self, election_id: ElectionId) -> Result<Address, ElectionError> {
        Ok(self.election(election_id)?.owner())
    }

    fn current_phase(&self, election_id: ElectionId) -> Result<Phase, ElectionError> {
        Ok(self.election(election_id)?.current_phase())
    }

    fn get_candidate(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<Candidate, ElectionError> {
        self.election(election_id)?.get_candidate(candidate_id)
    }

    fn get_candidates(&self, election_id: ElectionId) -> Result<Vec<Candidate>, ElectionError> {
        Ok(self.election(election_id)?.candidates())
    }

    fn candidate_count(&self, election_id: ElectionId) -> Result<u32, ElectionError> {
        Ok(self.election(election_id)?.count())
    }

    fn is_registered(&self, election_id: ElectionId, address: Address) -> Result<bool, ElectionError> {
        Ok(self.election(election_id)?.is_registered(&address))
    }

    fn has_voted(&self, election_id: ElectionId, address: Address) -> Result<bool, ElectionError> {
        Ok(self.election(election_id)?.has_voted(&address))
    }

    fn get_ballots(
        &self,
        election_id: ElectionId,
        start: u64,
        end: u64,
    ) -> Result<Vec<Ballot>, ElectionError> {
        self.election(election_id)?.ballots(start, end)
    }

    fn result_for(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<u64, ElectionError> {
        self.election(election_id)?.result_for(candidate_id)
    }

    fn all_results(&self, election_id: ElectionId) -> Result<Vec<CandidateResult>, ElectionError> {
        self.election(election_id)?.all_results()?.iter().collect()
    }

    fn results_summary(&self, election_id: ElectionId) -> Result<ResultsSummary, ElectionError> {
        self.election(election_id)?.results_summary()
    }

    fn subscribe_events(&self) -> Result<broadcast::Receiver<ElectionEvent>, ElectionError> {
        Ok(self.subscribe())
    }
}
