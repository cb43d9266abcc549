//! The results ledger.
//!
//! Final counts are published exactly once per election, in the same storage batch that moves
//! the election to [`Phase::Ended`](election_interface::Phase::Ended). After that they never
//! change. Readers only ever look at the result tables, never at the live roster, so the
//! ledger can be queried without touching (or locking) the election that produced it.


use election_db::schema::tables::{FinalTallyByCandidate, ResultsSummaryByElection};
use election_db::schema::types::FinalTally;
use election_db::ElectionStorage;
use election_interface::{CandidateId, CandidateResult, ElectionError, ElectionId, ResultsSummary};
use election_schema_db::{SchemaBatch, SchemaIterator};
use tracing::info;

/// Reads and stages the published results of every election in one storage instance.
#[derive(Clone, Debug)]
pub struct ResultLedger {
    storage: ElectionStorage,
}

impl ResultLedger {
    /// Binds the ledger to `storage`.
    pub fn new(storage: ElectionStorage) -> Self {
        Self { storage }
    }

    /// Stages the publication of `tallies` (ordered by candidate id) into `batch`.
    ///
    /// Nothing is visible until the caller commits the batch.
    pub fn publish(
        &self,
        batch: &mut SchemaBatch,
        election_id: ElectionId,
        tallies: &[CandidateResult],
        finalized_at_ms: u64,
    ) -> Result<ResultsSummary, ElectionError> {
        if self.is_published(election_id)? {
            return Err(ElectionError::InvalidState(format!(
                "Results of election {election_id} are already published"
            )));
        }

        let mut total_votes: u64 = 0;
        for tally in tallies {
            total_votes = total_votes
                .checked_add(tally.vote_count)
                .ok_or_else(|| {
                    ElectionError::InvalidState("Total vote count overflows u64".to_owned())
                })?;
            batch.put::<FinalTallyByCandidate>(
                &(election_id, tally.candidate_id),
                &FinalTally {
                    name: tally.name.clone(),
                    vote_count: tally.vote_count,
                },
            )?;
        }

        let summary = ResultsSummary {
            candidate_count: u32::try_from(tallies.len())
                .map_err(|_| ElectionError::InvalidState("Too many candidates".to_owned()))?,
            total_votes,
            finalized_at_ms,
        };
        batch.put::<ResultsSummaryByElection>(&election_id, &summary)?;

        info!(
            %election_id,
            candidate_count = summary.candidate_count,
            total_votes,
            "Staged election results"
        );
        Ok(summary)
    }

    /// Whether the results of `election_id` have been published.
    pub fn is_published(&self, election_id: ElectionId) -> Result<bool, ElectionError> {
        Ok(self
            .storage
            .get::<ResultsSummaryByElection>(&election_id)?
            .is_some())
    }

    /// Aggregate figures of the published results.
    pub fn summary(&self, election_id: ElectionId) -> Result<ResultsSummary, ElectionError> {
        self.storage
            .get::<ResultsSummaryByElection>(&election_id)?
            .ok_or_else(|| not_published(election_id))
    }

    /// The frozen count of one candidate.
    pub fn result_for(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<u64, ElectionError> {
        self.exit_if_not_published(election_id)?;
        self.storage
            .get::<FinalTallyByCandidate>(&(election_id, candidate_id))?
            .map(|tally| tally.vote_count)
            .ok_or(ElectionError::NotFound(candidate_id))
    }

    /// All frozen results of one election, ordered by candidate id.
    ///
    /// The returned sequence is lazy: rows are read from storage while iterating. It can be
    /// iterated any number of times and always yields the same rows.
    pub fn all_results(&self, election_id: ElectionId) -> Result<AllResults, ElectionError> {
        self.exit_if_not_published(election_id)?;
        Ok(AllResults {
            storage: self.storage.clone(),
            election_id,
        })
    }

    /// Every candidate sharing the highest count. Ties are returned in full, ordered by id.
    pub fn leaders(&self, election_id: ElectionId) -> Result<Vec<CandidateResult>, ElectionError> {
        let mut leaders: Vec<CandidateResult> = Vec::new();
        for result in &self.all_results(election_id)? {
            let result = result?;
            match leaders.first() {
                Some(leader) if leader.vote_count > result.vote_count => {}
                Some(leader) if leader.vote_count == result.vote_count => leaders.push(result),
                _ => leaders = vec![result],
            }
        }
        Ok(leaders)
    }

    fn exit_if_not_published(&self, election_id: ElectionId) -> Result<(), ElectionError> {
        if self.is_published(election_id)? {
            Ok(())
        } else {
            Err(not_published(election_id))
        }
    }
}

fn not_published(election_id: ElectionId) -> ElectionError {
    ElectionError::InvalidState(format!(
        "Results of election {election_id} are not available before it ends"
    ))
}

/// The published results of one election. See [`ResultLedger::all_results`].
#[derive(Clone, Debug)]
pub struct AllResults {
    storage: ElectionStorage,
    election_id: ElectionId,
}

impl AllResults {
    /// The election these results belong to.
    pub fn election_id(&self) -> ElectionId {
        self.election_id
    }

    /// Starts a fresh pass over the results.
    pub fn iter(&self) -> ResultsIter<'_> {
        ResultsIter {
            rows: self
                .storage
                .iter_election::<FinalTallyByCandidate>(self.election_id)
                .map_err(Some),
        }
    }
}

impl<'a> IntoIterator for &'a AllResults {
    type Item = Result<CandidateResult, ElectionError>;
    type IntoIter = ResultsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass over [`AllResults`].
pub struct ResultsIter<'a> {
    // A failure to open the underlying iterator is reported once, as the first item.
    rows: Result<SchemaIterator<'a, FinalTallyByCandidate>, Option<anyhow::Error>>,
}

impl<'a> Iterator for ResultsIter<'a> {
    type Item = Result<CandidateResult, ElectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.rows {
            Ok(rows) => rows.next().map(|row| {
                let output = row?;
                let (_, candidate_id) = output.key;
                Ok(CandidateResult {
                    candidate_id,
                    name: output.value.name,
                    vote_count: output.value.vote_count,
                })
            }),
            Err(err) => err.take().map(|err| Err(ElectionError::Storage(err))),
        }
    }
}
