use std::path::Path;
use std::sync::Arc;

use election_interface::{Address, Ballot, CandidateId, ElectionId};
use election_schema_db::schema::KeyCodec;
use election_schema_db::{Schema, SchemaBatch, SchemaIterator, SeekKeyEncoder, DB};
use tracing::debug;

use crate::rocks_db_config::{gen_rocksdb_options, RocksdbConfig};
use crate::schema::tables::{
    BallotByNumber, CandidateById, ElectionById, ElectionPrefix, VoterByAddress,
    ELECTION_TABLES, RESULT_TABLES,
};
use crate::schema::types::{StoredCandidate, StoredElection, Voter};

const ELECTION_DB_PATH_SUFFIX: &str = "election";

/// A database which stores every election hosted by a node together with the results ledger.
///
/// Writes are staged in a [`SchemaBatch`] by the caller and applied with
/// [`ElectionStorage::commit`]; a batch may touch any table, election or results alike.
#[derive(Clone, Debug)]
pub struct ElectionStorage {
    db: Arc<DB>,
}

impl ElectionStorage {
    /// Open an [`ElectionStorage`] (backed by RocksDB) at the specified path.
    /// The returned instance will be at the path `{path}/election`.
    pub fn with_path(path: impl AsRef<Path>, config: &RocksdbConfig) -> anyhow::Result<Self> {
        let path = path.as_ref().join(ELECTION_DB_PATH_SUFFIX);
        let inner = DB::open(
            path,
            "election-db",
            ELECTION_TABLES.iter().chain(RESULT_TABLES).copied(),
            &gen_rocksdb_options(config),
        )?;

        Ok(Self {
            db: Arc::new(inner),
        })
    }

    /// Atomically applies every write staged in `batch`.
    pub fn commit(&self, batch: SchemaBatch) -> anyhow::Result<()> {
        debug!(rows = batch.len(), "Committing election batch");
        self.db.write_schemas(batch)
    }

    /// Reads a single row of any table.
    pub fn get<S: Schema>(&self, key: &impl KeyCodec<S>) -> anyhow::Result<Option<S::Value>> {
        self.db.get::<S>(key)
    }

    /// A lazy iterator over the rows of one election in a table keyed by `(ElectionId, _)`,
    /// in key order.
    pub fn iter_election<S: Schema>(&self, election_id: ElectionId) -> anyhow::Result<SchemaIterator<S>>
    where
        ElectionPrefix: SeekKeyEncoder<S>,
    {
        self.db.iter_prefix::<S>(&ElectionPrefix(election_id))
    }

    /// Collects the rows of one election in a table keyed by `(ElectionId, _)`.
    pub fn scan_election<S: Schema>(
        &self,
        election_id: ElectionId,
    ) -> anyhow::Result<Vec<(S::Key, S::Value)>>
    where
        ElectionPrefix: SeekKeyEncoder<S>,
    {
        self.iter_election::<S>(election_id)?
            .map(|row| row.map(|output| output.into_tuple()))
            .collect()
    }

    /// All stored election headers, ordered by id.
    pub fn elections(&self) -> anyhow::Result<Vec<(ElectionId, StoredElection)>> {
        let mut iter = self.db.iter::<ElectionById>()?;
        iter.seek_to_first();
        iter.map(|row| row.map(|output| output.into_tuple()))
            .collect()
    }

    /// The highest election id ever written, if any.
    pub fn last_election_id(&self) -> anyhow::Result<Option<ElectionId>> {
        let mut iter = self.db.rev_iter::<ElectionById>()?;
        iter.seek_to_last();
        iter.next()
            .transpose()
            .map(|last| last.map(|output| output.key))
    }

    /// The voter registry of one election.
    pub fn voters(&self, election_id: ElectionId) -> anyhow::Result<Vec<(Address, Voter)>> {
        Ok(self
            .scan_election::<VoterByAddress>(election_id)?
            .into_iter()
            .map(|((_, address), voter)| (address, voter))
            .collect())
    }

    /// The live roster of one election, ordered by candidate id.
    pub fn candidates(
        &self,
        election_id: ElectionId,
    ) -> anyhow::Result<Vec<(CandidateId, StoredCandidate)>> {
        Ok(self
            .scan_election::<CandidateById>(election_id)?
            .into_iter()
            .map(|((_, candidate_id), candidate)| (candidate_id, candidate))
            .collect())
    }

    /// Number of ballots accepted in one election.
    pub fn ballot_count(&self, election_id: ElectionId) -> anyhow::Result<u64> {
        let mut iter = self.db.rev_iter::<BallotByNumber>()?;
        iter.seek_for_prev(&(election_id, u64::MAX))?;
        match iter.next().transpose()? {
            Some(output) if output.key.0 == election_id => Ok(output.key.1 + 1),
            _ => Ok(0),
        }
    }

    /// Ballots of one election with numbers in `start..end`.
    pub fn ballots(
        &self,
        election_id: ElectionId,
        start: u64,
        end: u64,
    ) -> anyhow::Result<Vec<Ballot>> {
        let mut ballots = Vec::new();
        if start >= end {
            return Ok(ballots);
        }
        let mut iter = self.iter_election::<BallotByNumber>(election_id)?;
        iter.seek(&(election_id, start))?;
        for row in iter {
            let output = row?;
            if output.key.1 >= end {
                break;
            }
            ballots.push(output.value);
        }
        Ok(ballots)
    }
}
