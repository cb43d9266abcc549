use std::sync::RwLock;

use anyhow::ensure;
use election_db::schema::tables::ElectionById;
use election_db::schema::types::StoredElection;
use election_db::ElectionStorage;
use election_interface::{ElectionError, ElectionEvent, ElectionId};
use election_results::ResultLedger;
use election_schema_db::SchemaBatch;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::types::ElectionState;
use super::{now_ms, Election, ElectionConfig};

impl Election {
    /// Creates a new election in the `Created` phase and persists its header.
    pub fn init(
        id: ElectionId,
        config: &ElectionConfig,
        storage: ElectionStorage,
        results: ResultLedger,
        events: broadcast::Sender<ElectionEvent>,
    ) -> Result<Self, ElectionError> {
        let state = ElectionState::new(config.admin, now_ms());

        let mut batch = SchemaBatch::new();
        batch.put::<ElectionById>(&id, &state.header())?;
        storage.commit(batch)?;

        info!(election_id = %id, owner = %config.admin, "Election created");
        let election = Self {
            id,
            storage,
            results,
            state: RwLock::new(state),
            events,
        };
        election.emit(ElectionEvent::ElectionCreated {
            election_id: id,
            owner: config.admin,
        });
        Ok(election)
    }

    /// Rebuilds an election from what was committed to storage.
    pub fn restore(
        id: ElectionId,
        header: StoredElection,
        storage: ElectionStorage,
        results: ResultLedger,
        events: broadcast::Sender<ElectionEvent>,
    ) -> anyhow::Result<Self> {
        let mut state = ElectionState::new(header.owner, header.created_at_ms);
        state.phase = header.phase;

        for (expected_id, (candidate_id, candidate)) in
            (0u32..).zip(storage.candidates(id)?.into_iter())
        {
            ensure!(
                candidate_id == expected_id,
                "Election {id}: candidate ids are not contiguous, found {candidate_id} where {expected_id} was expected"
            );
            state.candidates.push(candidate);
        }
        state.voters = storage.voters(id)?.into_iter().collect();
        state.ballot_count = storage.ballot_count(id)?;

        debug!(
            election_id = %id,
            phase = %state.phase,
            candidates = state.candidates.len(),
            voters = state.voters.len(),
            ballots = state.ballot_count,
            "Election restored"
        );
        Ok(Self {
            id,
            storage,
            results,
            state: RwLock::new(state),
            events,
        })
    }
}
