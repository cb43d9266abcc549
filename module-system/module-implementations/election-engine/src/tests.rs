use std::collections::HashSet;
use std::sync::Arc;

use election_db::rocks_db_config::RocksdbConfig;
use election_db::ElectionStorage;
use election_interface::rpc::ElectionRpcProvider;
use election_interface::{
    Address, CandidateResult, ElectionError, ElectionEvent, ElectionId, Phase,
};
use proptest::prelude::*;
use tempfile::TempDir;

use super::call::{add_vote, next_candidate_id, CallMessage, CallResponse};
use super::{Context, Election, ElectionConfig, ElectionService};

fn addr(byte: u8) -> Address {
    Address::new([byte; 20])
}

fn owner() -> Address {
    addr(0xad)
}

fn open_service(tmpdir: &TempDir) -> ElectionService {
    let storage = ElectionStorage::with_path(tmpdir.path(), &RocksdbConfig::default()).unwrap();
    ElectionService::new(storage).unwrap()
}

fn new_election(service: &ElectionService) -> Arc<Election> {
    service
        .create_election(&ElectionConfig { admin: owner() })
        .unwrap()
}

fn result(candidate_id: u32, name: &str, vote_count: u64) -> CandidateResult {
    CandidateResult {
        candidate_id,
        name: name.to_owned(),
        vote_count,
    }
}

/// Alice and Bob on the roster, voters `0x01..` and `0x02..` registered.
fn setup_alice_bob(election: &Election) -> (Context, Context, Context) {
    let admin = Context::new(owner());
    let voter_a = Context::new(addr(1));
    let voter_b = Context::new(addr(2));

    assert_eq!(election.add_candidate("Alice", &admin).unwrap(), 0);
    assert_eq!(election.add_candidate("Bob", &admin).unwrap(), 1);
    election.register_voter(addr(1), &admin).unwrap();
    election.register_voter(addr(2), &admin).unwrap();
    (admin, voter_a, voter_b)
}

fn all_results(election: &Election) -> Vec<CandidateResult> {
    election
        .all_results()
        .unwrap()
        .iter()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_election_alice_bob() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, voter_b) = setup_alice_bob(&election);

    election.start_election(&admin).unwrap();
    let ballot = election.cast_vote(0, &voter_a).unwrap();
    assert_eq!(ballot.number, 0);
    assert_eq!(ballot.voter, addr(1));
    election.cast_vote(1, &voter_b).unwrap();
    election.end_election(&admin).unwrap();

    assert_eq!(election.current_phase(), Phase::Ended);
    assert_eq!(
        all_results(&election),
        vec![result(0, "Alice", 1), result(1, "Bob", 1)]
    );
    assert_eq!(election.result_for(0).unwrap(), 1);
    assert_eq!(election.result_for(1).unwrap(), 1);
    assert!(matches!(
        election.result_for(2),
        Err(ElectionError::NotFound(2))
    ));

    let summary = election.results_summary().unwrap();
    assert_eq!(summary.candidate_count, 2);
    assert_eq!(summary.total_votes, 2);
    assert_eq!(election.leaders().unwrap().len(), 2);
}

#[test]
fn test_unregistered_voter_is_rejected() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, _, _) = setup_alice_bob(&election);
    election.start_election(&admin).unwrap();

    let voter_c = Context::new(addr(3));
    assert!(matches!(
        election.cast_vote(0, &voter_c),
        Err(ElectionError::Unauthorized(a)) if a == addr(3)
    ));
    assert!(election.candidates().iter().all(|c| c.vote_count == 0));
    assert_eq!(election.ballot_count(), 0);
}

#[test]
fn test_owner_cannot_vote() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, _, _) = setup_alice_bob(&election);

    assert!(matches!(
        election.register_voter(owner(), &admin),
        Err(ElectionError::InvalidVoter(_))
    ));
    election.start_election(&admin).unwrap();
    assert!(matches!(
        election.cast_vote(0, &admin),
        Err(ElectionError::Unauthorized(_))
    ));
}

#[test]
fn test_registration_rules() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, _) = setup_alice_bob(&election);

    assert!(matches!(
        election.register_voter(addr(1), &admin),
        Err(ElectionError::AlreadyRegistered(_))
    ));
    assert!(matches!(
        election.register_voter(addr(9), &voter_a),
        Err(ElectionError::Unauthorized(_))
    ));
    assert!(election.is_registered(&addr(1)));
    assert!(!election.is_registered(&addr(9)));
    assert_eq!(election.voter_count(), 2);

    // Late registration is allowed while voting is open.
    election.start_election(&admin).unwrap();
    election.register_voter(addr(3), &admin).unwrap();
    election.cast_vote(1, &Context::new(addr(3))).unwrap();

    election.end_election(&admin).unwrap();
    assert!(matches!(
        election.register_voter(addr(4), &admin),
        Err(ElectionError::InvalidState(_))
    ));
    assert!(!election.is_registered(&addr(4)));
}

#[test]
fn test_vote_at_most_once() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, _) = setup_alice_bob(&election);
    election.start_election(&admin).unwrap();

    assert!(!election.has_voted(&addr(1)));
    election.cast_vote(0, &voter_a).unwrap();
    assert!(election.has_voted(&addr(1)));

    for candidate_id in [0, 1] {
        assert!(matches!(
            election.cast_vote(candidate_id, &voter_a),
            Err(ElectionError::AlreadyVoted(_))
        ));
    }
    assert_eq!(election.get_candidate(0).unwrap().vote_count, 1);
    assert_eq!(election.get_candidate(1).unwrap().vote_count, 0);
    assert_eq!(election.ballot_count(), 1);
}

#[test]
fn test_vote_preconditions_in_order() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, _) = setup_alice_bob(&election);

    // Phase is checked before registration.
    assert!(matches!(
        election.cast_vote(0, &Context::new(addr(7))),
        Err(ElectionError::InvalidState(_))
    ));
    assert!(matches!(
        election.cast_vote(0, &voter_a),
        Err(ElectionError::InvalidState(_))
    ));

    election.start_election(&admin).unwrap();
    assert!(matches!(
        election.cast_vote(2, &voter_a),
        Err(ElectionError::NotFound(2))
    ));
    // A rejected ballot leaves the voter free to vote.
    assert!(!election.has_voted(&addr(1)));
    election.cast_vote(1, &voter_a).unwrap();
    // Already voted wins over an unknown candidate.
    assert!(matches!(
        election.cast_vote(5, &voter_a),
        Err(ElectionError::AlreadyVoted(_))
    ));
}

#[test]
fn test_phases_are_monotonic() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let admin = Context::new(owner());

    assert_eq!(election.current_phase(), Phase::Created);
    assert!(matches!(
        election.start_election(&admin),
        Err(ElectionError::NoCandidates)
    ));
    assert!(matches!(
        election.end_election(&admin),
        Err(ElectionError::InvalidState(_))
    ));

    election.add_candidate("Alice", &admin).unwrap();
    assert!(matches!(
        election.start_election(&Context::new(addr(1))),
        Err(ElectionError::Unauthorized(_))
    ));
    election.start_election(&admin).unwrap();
    assert_eq!(election.current_phase(), Phase::InProgress);
    assert!(matches!(
        election.start_election(&admin),
        Err(ElectionError::InvalidState(_))
    ));
    assert!(matches!(
        election.end_election(&Context::new(addr(1))),
        Err(ElectionError::Unauthorized(_))
    ));

    election.end_election(&admin).unwrap();
    assert_eq!(election.current_phase(), Phase::Ended);
    assert!(matches!(
        election.start_election(&admin),
        Err(ElectionError::InvalidState(_))
    ));
    assert!(matches!(
        election.end_election(&admin),
        Err(ElectionError::InvalidState(_))
    ));
    assert!(matches!(
        election.add_candidate("Bob", &admin),
        Err(ElectionError::InvalidState(_))
    ));
    assert_eq!(election.current_phase(), Phase::Ended);
}

#[test]
fn test_vote_after_end_is_rejected() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, voter_b) = setup_alice_bob(&election);

    election.start_election(&admin).unwrap();
    election.cast_vote(0, &voter_a).unwrap();
    election.end_election(&admin).unwrap();

    let results = all_results(&election);
    assert!(matches!(
        election.cast_vote(1, &voter_b),
        Err(ElectionError::InvalidState(_))
    ));
    assert!(!election.has_voted(voter_b.sender()));
    assert_eq!(election.ballot_count(), 1);
    assert_eq!(election.result_for(0).unwrap(), 1);
    assert_eq!(election.result_for(1).unwrap(), 0);
    assert_eq!(all_results(&election), results);
}

#[test]
fn test_counter_limits_are_not_retryable() {
    assert_eq!(next_candidate_id(3).unwrap(), 3);
    assert_eq!(add_vote(41).unwrap(), 42);

    let err = add_vote(u64::MAX).unwrap_err();
    assert!(matches!(err, ElectionError::InvalidState(_)));
    assert!(!err.is_retryable());

    #[cfg(target_pointer_width = "64")]
    {
        let err = next_candidate_id(usize::MAX).unwrap_err();
        assert!(matches!(err, ElectionError::InvalidState(_)));
        assert!(!err.is_retryable());
    }
}

#[test]
fn test_add_candidate_after_start_is_invalid_for_anyone() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, _) = setup_alice_bob(&election);
    election.start_election(&admin).unwrap();

    for context in [admin, voter_a, Context::new(addr(42))] {
        assert!(matches!(
            election.add_candidate("Carol", &context),
            Err(ElectionError::InvalidState(_))
        ));
    }
    assert_eq!(election.count(), 2);
}

#[test]
fn test_candidate_roster() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let admin = Context::new(owner());

    assert!(matches!(
        election.add_candidate("   ", &admin),
        Err(ElectionError::EmptyName)
    ));
    assert!(matches!(
        election.add_candidate("", &admin),
        Err(ElectionError::EmptyName)
    ));
    assert!(matches!(
        election.add_candidate("Mallory", &Context::new(addr(1))),
        Err(ElectionError::Unauthorized(_))
    ));
    assert_eq!(election.count(), 0);

    assert_eq!(election.add_candidate("  Alice ", &admin).unwrap(), 0);
    let alice = election.get_candidate(0).unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.vote_count, 0);
    assert!(matches!(
        election.get_candidate(1),
        Err(ElectionError::NotFound(1))
    ));
}

#[test]
fn test_results_unavailable_before_end() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, _) = setup_alice_bob(&election);
    election.start_election(&admin).unwrap();
    election.cast_vote(0, &voter_a).unwrap();

    assert!(matches!(
        election.result_for(0),
        Err(ElectionError::InvalidState(_))
    ));
    assert!(matches!(
        election.all_results(),
        Err(ElectionError::InvalidState(_))
    ));
    assert!(matches!(
        election.results_summary(),
        Err(ElectionError::InvalidState(_))
    ));
}

#[test]
fn test_all_results_is_restartable() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, voter_b) = setup_alice_bob(&election);
    election.start_election(&admin).unwrap();
    election.cast_vote(1, &voter_a).unwrap();
    election.cast_vote(1, &voter_b).unwrap();
    election.end_election(&admin).unwrap();

    let results = election.all_results().unwrap();
    let first: Vec<_> = results.iter().collect::<Result<_, _>>().unwrap();
    let second: Vec<_> = (&results).into_iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![result(0, "Alice", 0), result(1, "Bob", 2)]);
    assert_eq!(election.leaders().unwrap(), vec![result(1, "Bob", 2)]);
}

#[test]
fn test_ballot_log() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let (admin, voter_a, voter_b) = setup_alice_bob(&election);
    election.start_election(&admin).unwrap();
    let first = election.cast_vote(1, &voter_b).unwrap();
    let second = election.cast_vote(0, &voter_a).unwrap();

    assert_eq!((first.number, second.number), (0, 1));
    assert_eq!(election.ballots(0, 10).unwrap(), vec![first, second.clone()]);
    assert_eq!(election.ballots(1, 2).unwrap(), vec![second]);
    assert!(election.ballots(2, 10).unwrap().is_empty());
}

#[test]
fn test_call_messages() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let admin = Context::new(owner());

    let responses = [
        (
            CallMessage::AddCandidate {
                name: "candidate_1".to_owned(),
            },
            &admin,
        ),
        (CallMessage::RegisterVoter(addr(1)), &admin),
        (CallMessage::StartElection, &admin),
    ]
    .into_iter()
    .map(|(msg, context)| election.call(msg, context).unwrap())
    .collect::<Vec<_>>();
    assert_eq!(
        responses,
        vec![
            CallResponse::CandidateAdded(0),
            CallResponse::VoterRegistered,
            CallResponse::PhaseChanged(Phase::InProgress),
        ]
    );

    let response = election
        .call(CallMessage::Vote(0), &Context::new(addr(1)))
        .unwrap();
    assert!(matches!(response, CallResponse::BallotAccepted(ballot) if ballot.candidate_id == 0));
    assert_eq!(
        election.call(CallMessage::EndElection, &admin).unwrap(),
        CallResponse::PhaseChanged(Phase::Ended)
    );

    let json = serde_json::to_string(&CallMessage::Vote(3)).unwrap();
    assert_eq!(json, r#"{"vote":3}"#);
}

#[test]
fn test_state_survives_restart() {
    let tmpdir = tempfile::tempdir().unwrap();
    {
        let service = open_service(&tmpdir);
        let finished = new_election(&service);
        let (admin, voter_a, voter_b) = setup_alice_bob(&finished);
        finished.start_election(&admin).unwrap();
        finished.cast_vote(0, &voter_a).unwrap();
        finished.cast_vote(1, &voter_b).unwrap();
        finished.end_election(&admin).unwrap();

        let running = new_election(&service);
        let (admin, voter_a, _) = setup_alice_bob(&running);
        running.start_election(&admin).unwrap();
        running.cast_vote(1, &voter_a).unwrap();
    }

    let service = open_service(&tmpdir);
    assert_eq!(service.election_ids(), vec![ElectionId(1), ElectionId(2)]);

    let finished = service.election(ElectionId(1)).unwrap();
    assert_eq!(finished.current_phase(), Phase::Ended);
    assert_eq!(finished.owner(), owner());
    assert_eq!(
        all_results(&finished),
        vec![result(0, "Alice", 1), result(1, "Bob", 1)]
    );

    let running = service.election(ElectionId(2)).unwrap();
    assert_eq!(running.current_phase(), Phase::InProgress);
    assert!(running.has_voted(&addr(1)));
    assert!(!running.has_voted(&addr(2)));
    assert_eq!(running.ballot_count(), 1);
    assert!(matches!(
        running.cast_vote(0, &Context::new(addr(1))),
        Err(ElectionError::AlreadyVoted(_))
    ));
    // Numbering continues where it stopped.
    assert_eq!(running.cast_vote(0, &Context::new(addr(2))).unwrap().number, 1);

    // A new election gets the next id.
    assert_eq!(new_election(&service).id(), ElectionId(3));
}

#[test]
fn test_elections_are_independent() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let first = new_election(&service);
    let second = service
        .create_election(&ElectionConfig { admin: addr(0x77) })
        .unwrap();
    assert_eq!((first.id(), second.id()), (ElectionId(1), ElectionId(2)));

    setup_alice_bob(&first);
    assert_eq!(second.count(), 0);
    assert!(!second.is_registered(&addr(1)));
    assert!(matches!(
        second.add_candidate("Alice", &Context::new(owner())),
        Err(ElectionError::Unauthorized(_))
    ));
    assert!(matches!(
        service.election(ElectionId(9)),
        Err(ElectionError::UnknownElection(ElectionId(9)))
    ));
}

#[test]
fn test_rpc_provider_surface() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let mut events = service.subscribe_events().unwrap();

    let id = ElectionRpcProvider::create_election(&service, owner()).unwrap();
    assert_eq!(service.list_elections().unwrap(), vec![id]);
    assert_eq!(ElectionRpcProvider::owner(&service, id).unwrap(), owner());
    assert_eq!(
        service
            .add_candidate(id, owner(), "Alice".to_owned())
            .unwrap(),
        0
    );
    service.register_voter(id, owner(), addr(1)).unwrap();
    service.start_election(id, owner()).unwrap();
    let ballot = service.cast_vote(id, addr(1), 0).unwrap();
    service.end_election(id, owner()).unwrap();

    assert_eq!(service.current_phase(id).unwrap(), Phase::Ended);
    assert_eq!(service.candidate_count(id).unwrap(), 1);
    assert_eq!(service.get_candidates(id).unwrap().len(), 1);
    assert!(service.has_voted(id, addr(1)).unwrap());
    assert_eq!(service.get_ballots(id, 0, 100).unwrap(), vec![ballot.clone()]);
    assert_eq!(service.result_for(id, 0).unwrap(), 1);
    assert_eq!(
        service.all_results(id).unwrap(),
        vec![result(0, "Alice", 1)]
    );
    assert_eq!(service.results_summary(id).unwrap().total_votes, 1);
    assert!(matches!(
        service.current_phase(ElectionId(5)),
        Err(ElectionError::UnknownElection(_))
    ));

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            ElectionEvent::ElectionCreated {
                election_id: id,
                owner: owner(),
            },
            ElectionEvent::CandidateAdded {
                election_id: id,
                candidate_id: 0,
                name: "Alice".to_owned(),
            },
            ElectionEvent::VoterRegistered {
                election_id: id,
                voter: addr(1),
            },
            ElectionEvent::PhaseChanged {
                election_id: id,
                phase: Phase::InProgress,
            },
            ElectionEvent::BallotCast(ballot),
            ElectionEvent::PhaseChanged {
                election_id: id,
                phase: Phase::Ended,
            },
        ]
    );
}

#[test]
fn test_failed_calls_emit_nothing() {
    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let mut events = service.subscribe();

    assert!(election.start_election(&Context::new(owner())).is_err());
    assert!(election.add_candidate(" ", &Context::new(owner())).is_err());
    assert!(events.try_recv().is_err());
}

#[test]
fn test_concurrent_voters() {
    const VOTERS: u8 = 64;

    let tmpdir = tempfile::tempdir().unwrap();
    let service = open_service(&tmpdir);
    let election = new_election(&service);
    let admin = Context::new(owner());
    for name in ["Alice", "Bob", "Carol"] {
        election.add_candidate(name, &admin).unwrap();
    }
    for voter in 1..=VOTERS {
        election.register_voter(addr(voter), &admin).unwrap();
    }
    election.start_election(&admin).unwrap();

    std::thread::scope(|scope| {
        for voter in 1..=VOTERS {
            let election = &election;
            scope.spawn(move || {
                let context = Context::new(addr(voter));
                // Every voter tries twice; exactly one attempt may succeed.
                let first = election.cast_vote(u32::from(voter % 3), &context);
                let second = election.cast_vote(u32::from(voter % 3), &context);
                assert!(first.is_ok());
                assert!(matches!(second, Err(ElectionError::AlreadyVoted(_))));
            });
        }
    });

    election.end_election(&admin).unwrap();
    let total: u64 = all_results(&election)
        .iter()
        .map(|result| result.vote_count)
        .sum();
    assert_eq!(total, u64::from(VOTERS));

    let numbers: HashSet<u64> = election
        .ballots(0, u64::from(VOTERS) + 10)
        .unwrap()
        .into_iter()
        .map(|ballot| ballot.number)
        .collect();
    assert_eq!(numbers, (0..u64::from(VOTERS)).collect());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn votes_are_conserved(
        candidates in 1u32..5,
        registered in 1u8..12,
        attempts in proptest::collection::vec((0u8..16, 0u32..6), 0..40),
    ) {
        let tmpdir = tempfile::tempdir().unwrap();
        let service = open_service(&tmpdir);
        let election = new_election(&service);
        let admin = Context::new(owner());
        for i in 0..candidates {
            election.add_candidate(&format!("candidate_{i}"), &admin).unwrap();
        }
        for voter in 0..registered {
            election.register_voter(addr(voter), &admin).unwrap();
        }
        election.start_election(&admin).unwrap();

        let mut successful = HashSet::new();
        for (voter, candidate_id) in attempts {
            let outcome = election.cast_vote(candidate_id, &Context::new(addr(voter)));
            let expected_ok = voter < registered
                && candidate_id < candidates
                && !successful.contains(&voter);
            prop_assert_eq!(outcome.is_ok(), expected_ok);
            if expected_ok {
                successful.insert(voter);
            }
        }
        election.end_election(&admin).unwrap();

        let total: u64 = all_results(&election).iter().map(|r| r.vote_count).sum();
        prop_assert_eq!(total, successful.len() as u64);
        prop_assert_eq!(election.results_summary().unwrap().total_votes, total);
    }
}
