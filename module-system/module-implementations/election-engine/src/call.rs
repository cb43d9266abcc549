use election_db::schema::tables::{BallotByNumber, CandidateById, ElectionById, VoterByAddress};
use election_db::schema::types::{StoredCandidate, Voter};
use election_interface::{Address, Ballot, CandidateId, ElectionError, ElectionEvent, Phase};
use election_schema_db::SchemaBatch;
use tracing::{debug, info};

use super::types::ElectionState;
use super::{now_ms, Context, Election};

/// Call actions supported by an election.
#[derive(
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
    serde::Serialize,
    serde::Deserialize,
    Debug,
    PartialEq,
    Eq,
    Clone,
)]
#[serde(rename_all = "camelCase")]
pub enum CallMessage {
    /// Adds a candidate to the roster. Owner only, while the election is being set up.
    AddCandidate {
        /// Display name; surrounding whitespace is dropped.
        name: String,
    },
    /// Registers a voter. Owner only, until the election ends.
    RegisterVoter(Address),
    /// Opens voting. Owner only.
    StartElection,
    /// Closes voting and publishes the results. Owner only.
    EndElection,
    /// Casts the sender's ballot for a candidate.
    Vote(CandidateId),
}

/// What a successful call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResponse {
    /// The id assigned to the new candidate.
    CandidateAdded(CandidateId),
    /// The voter is registered.
    VoterRegistered,
    /// The election moved to a new phase.
    PhaseChanged(Phase),
    /// The ballot was accepted.
    BallotAccepted(Ballot),
}

impl Election {
    /// Dispatches a [`CallMessage`] on behalf of `context`.
    pub fn call(
        &self,
        msg: CallMessage,
        context: &Context,
    ) -> Result<CallResponse, ElectionError> {
        match msg {
            CallMessage::AddCandidate { name } => self
                .add_candidate(&name, context)
                .map(CallResponse::CandidateAdded),
            CallMessage::RegisterVoter(voter) => self
                .register_voter(voter, context)
                .map(|()| CallResponse::VoterRegistered),
            CallMessage::StartElection => self
                .start_election(context)
                .map(|()| CallResponse::PhaseChanged(Phase::InProgress)),
            CallMessage::EndElection => self
                .end_election(context)
                .map(|()| CallResponse::PhaseChanged(Phase::Ended)),
            CallMessage::Vote(candidate_id) => self
                .cast_vote(candidate_id, context)
                .map(CallResponse::BallotAccepted),
        }
    }

    /// Adds a candidate to the roster and returns its id. Must be called by the owner
    /// while the election is in the `Created` phase.
    ///
    /// Once voting has opened this fails with `InvalidState` whoever the caller is.
    pub fn add_candidate(
        &self,
        name: &str,
        context: &Context,
    ) -> Result<CandidateId, ElectionError> {
        let mut state = self.state.write().expect("Lock must not be poisoned");
        exit_if_not_in_phase(&state, Phase::Created, "add a candidate")?;
        exit_if_not_owner(&state, context)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ElectionError::EmptyName);
        }
        let candidate_id = next_candidate_id(state.candidates.len())?;
        let candidate = StoredCandidate {
            name: name.to_owned(),
            vote_count: 0,
        };

        let mut batch = SchemaBatch::new();
        batch.put::<CandidateById>(&(self.id, candidate_id), &candidate)?;
        self.storage.commit(batch)?;

        state.candidates.push(candidate);
        info!(election_id = %self.id, candidate_id, name, "Candidate added");
        self.emit(ElectionEvent::CandidateAdded {
            election_id: self.id,
            candidate_id,
            name: name.to_owned(),
        });
        Ok(candidate_id)
    }

    /// Adds a voter to the registry. Must be called by the owner before the election ends.
    /// The owner can't register itself.
    pub fn register_voter(&self, voter: Address, context: &Context) -> Result<(), ElectionError> {
        let mut state = self.state.write().expect("Lock must not be poisoned");
        exit_if_not_owner(&state, context)?;
        if state.phase == Phase::Ended {
            return Err(ElectionError::InvalidState(
                "Cannot register a voter after the election has ended".to_owned(),
            ));
        }
        if voter == state.owner {
            return Err(ElectionError::InvalidVoter(voter));
        }
        if state.voters.contains_key(&voter) {
            return Err(ElectionError::AlreadyRegistered(voter));
        }

        let mut batch = SchemaBatch::new();
        batch.put::<VoterByAddress>(&(self.id, voter), &Voter::Fresh)?;
        self.storage.commit(batch)?;

        state.voters.insert(voter, Voter::Fresh);
        info!(election_id = %self.id, %voter, "Voter registered");
        self.emit(ElectionEvent::VoterRegistered {
            election_id: self.id,
            voter,
        });
        Ok(())
    }

    /// Opens voting. Must be called by the owner, with at least one candidate on the roster.
    pub fn start_election(&self, context: &Context) -> Result<(), ElectionError> {
        let mut state = self.state.write().expect("Lock must not be poisoned");
        exit_if_not_owner(&state, context)?;
        exit_if_not_in_phase(&state, Phase::Created, "start the election")?;
        if state.candidates.is_empty() {
            return Err(ElectionError::NoCandidates);
        }

        let mut header = state.header();
        header.phase = Phase::InProgress;
        let mut batch = SchemaBatch::new();
        batch.put::<ElectionById>(&self.id, &header)?;
        self.storage.commit(batch)?;

        state.phase = Phase::InProgress;
        info!(election_id = %self.id, candidates = state.candidates.len(), "Election started");
        self.emit(ElectionEvent::PhaseChanged {
            election_id: self.id,
            phase: Phase::InProgress,
        });
        Ok(())
    }

    /// Closes voting. The phase change and the publication of the final counts are committed
    /// together, so the results exist exactly when the election has ended.
    pub fn end_election(&self, context: &Context) -> Result<(), ElectionError> {
        let mut state = self.state.write().expect("Lock must not be poisoned");
        exit_if_not_owner(&state, context)?;
        exit_if_not_in_phase(&state, Phase::InProgress, "end the election")?;

        let mut header = state.header();
        header.phase = Phase::Ended;
        let mut batch = SchemaBatch::new();
        batch.put::<ElectionById>(&self.id, &header)?;
        let summary = self
            .results
            .publish(&mut batch, self.id, &state.tallies(), now_ms())?;
        self.storage.commit(batch)?;

        state.phase = Phase::Ended;
        info!(
            election_id = %self.id,
            total_votes = summary.total_votes,
            "Election ended"
        );
        self.emit(ElectionEvent::PhaseChanged {
            election_id: self.id,
            phase: Phase::Ended,
        });
        Ok(())
    }

    /// Casts the sender's ballot for `candidate_id`.
    ///
    /// Marking the voter, incrementing the candidate and logging the ballot happen in one
    /// write: either all of them are applied or none is.
    pub fn cast_vote(
        &self,
        candidate_id: CandidateId,
        context: &Context,
    ) -> Result<Ballot, ElectionError> {
        let voter = *context.sender();
        let mut state = self.state.write().expect("Lock must not be poisoned");
        debug!(election_id = %self.id, %voter, candidate_id, "Attempt to vote");

        exit_if_not_in_phase(&state, Phase::InProgress, "vote")?;
        match state.voters.get(&voter) {
            None => return Err(ElectionError::Unauthorized(voter)),
            Some(Voter::Voted) => return Err(ElectionError::AlreadyVoted(voter)),
            Some(Voter::Fresh) => {}
        }
        let mut candidate = state
            .candidate(candidate_id)
            .cloned()
            .ok_or(ElectionError::NotFound(candidate_id))?;

        candidate.vote_count = add_vote(candidate.vote_count)?;
        let ballot = Ballot {
            election_id: self.id,
            number: state.ballot_count,
            voter,
            candidate_id,
            accepted_at_ms: now_ms(),
        };

        let mut batch = SchemaBatch::new();
        batch.put::<VoterByAddress>(&(self.id, voter), &Voter::Voted)?;
        batch.put::<CandidateById>(&(self.id, candidate_id), &candidate)?;
        batch.put::<BallotByNumber>(&(self.id, ballot.number), &ballot)?;
        self.storage.commit(batch)?;

        state.voters.insert(voter, Voter::Voted);
        state.candidates[candidate_id as usize] = candidate;
        state.ballot_count += 1;
        info!(
            election_id = %self.id,
            %voter,
            candidate_id,
            number = ballot.number,
            "Vote accepted"
        );
        self.emit(ElectionEvent::BallotCast(ballot.clone()));
        Ok(ballot)
    }
}

/// The id the next candidate on a roster of `roster_len` entries gets.
pub(crate) fn next_candidate_id(roster_len: usize) -> Result<CandidateId, ElectionError> {
    CandidateId::try_from(roster_len)
        .map_err(|_| ElectionError::InvalidState("The candidate roster is full".to_owned()))
}

/// A vote count after one more accepted ballot.
pub(crate) fn add_vote(vote_count: u64) -> Result<u64, ElectionError> {
    vote_count
        .checked_add(1)
        .ok_or_else(|| ElectionError::InvalidState("The vote count overflows u64".to_owned()))
}

fn exit_if_not_owner(state: &ElectionState, context: &Context) -> Result<(), ElectionError> {
    if &state.owner != context.sender() {
        return Err(ElectionError::Unauthorized(*context.sender()));
    }
    Ok(())
}

fn exit_if_not_in_phase(
    state: &ElectionState,
    expected: Phase,
    action: &str,
) -> Result<(), ElectionError> {
    if state.phase != expected {
        return Err(ElectionError::InvalidState(format!(
            "Cannot {action} while the election is {}; it must be {expected}",
            state.phase
        )));
    }
    Ok(())
}
