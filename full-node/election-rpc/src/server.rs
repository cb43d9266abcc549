//! A JSON-RPC server implementation for any [`ElectionRpcProvider`].

use election_interface::rpc::ElectionRpcProvider;
use election_interface::{Address, CandidateId, ElectionId};
use futures::future::Either;
use jsonrpsee::{RpcModule, SubscriptionMessage};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::to_rpc_error;

/// Creates a new [`jsonrpsee::RpcModule`] that exposes all JSON-RPC methods
/// necessary to drive and read an [`ElectionRpcProvider`].
///
/// # Example
/// ```no_run
/// use election_db::rocks_db_config::RocksdbConfig;
/// use election_db::ElectionStorage;
/// use election_engine::ElectionService;
/// use election_rpc::server::rpc_module;
///
/// /// Opens the elections stored under `path` and starts serving JSON-RPC requests.
/// async fn rpc_server(path: &std::path::Path) -> jsonrpsee::server::ServerHandle {
///     let storage = ElectionStorage::with_path(path, &RocksdbConfig::default()).unwrap();
///     let service = ElectionService::new(storage).unwrap();
///     let rpc_module = rpc_module(service).unwrap();
///
///     let server = jsonrpsee::server::ServerBuilder::default()
///         .build("127.0.0.1:0")
///         .await
///         .unwrap();
///     server.start(rpc_module)
/// }
/// ```
pub fn rpc_module<T>(elections: T) -> anyhow::Result<RpcModule<T>>
where
    T: ElectionRpcProvider + Send + Sync + 'static,
{
    let mut rpc = RpcModule::new(elections);

    // Hosting.
    rpc.register_method("election_create", move |params, elections| {
        let owner: Address = params.one()?;
        elections.create_election(owner).map_err(to_rpc_error)
    })?;
    rpc.register_method("election_list", move |_, elections| {
        elections.list_elections().map_err(to_rpc_error)
    })?;

    // Owner and voter actions.
    rpc.register_method("election_addCandidate", move |params, elections| {
        let (election_id, sender, name): (ElectionId, Address, String) = params.parse()?;
        elections
            .add_candidate(election_id, sender, name)
            .map_err(to_rpc_error)
    })?;
    rpc.register_method("election_registerVoter", move |params, elections| {
        let (election_id, sender, voter): (ElectionId, Address, Address) = params.parse()?;
        elections
            .register_voter(election_id, sender, voter)
            .map_err(to_rpc_error)
    })?;
    rpc.register_method("election_startElection", move |params, elections| {
        let (election_id, sender): (ElectionId, Address) = params.parse()?;
        elections
            .start_election(election_id, sender)
            .map_err(to_rpc_error)
    })?;
    rpc.register_method("election_endElection", move |params, elections| {
        let (election_id, sender): (ElectionId, Address) = params.parse()?;
        elections
            .end_election(election_id, sender)
            .map_err(to_rpc_error)
    })?;
    rpc.register_method("election_castVote", move |params, elections| {
        let (election_id, sender, candidate_id): (ElectionId, Address, CandidateId) =
            params.parse()?;
        elections
            .cast_vote(election_id, sender, candidate_id)
            .map_err(to_rpc_error)
    })?;

    // Live state.
    rpc.register_method("election_owner", move |params, elections| {
        let election_id: ElectionId = params.one()?;
        elections.owner(election_id).map_err(to_rpc_error)
    })?;
    rpc.register_method("election_currentPhase", move |params, elections| {
        let election_id: ElectionId = params.one()?;
        elections.current_phase(election_id).map_err(to_rpc_error)
    })?;
    rpc.register_method("election_getCandidate", move |params, elections| {
        let (election_id, candidate_id): (ElectionId, CandidateId) = params.parse()?;
        elections
            .get_candidate(election_id, candidate_id)
            .map_err(to_rpc_error)
    })?;
    rpc.register_method("election_getCandidates", move |params, elections| {
        let election_id: ElectionId = params.one()?;
        elections.get_candidates(election_id).map_err(to_rpc_error)
    })?;
    rpc.register_method("election_count", move |params, elections| {
        let election_id: ElectionId = params.one()?;
        elections.candidate_count(election_id).map_err(to_rpc_error)
    })?;
    rpc.register_method("election_isRegistered", move |params, elections| {
        let (election_id, address): (ElectionId, Address) = params.parse()?;
        elections
            .is_registered(election_id, address)
            .map_err(to_rpc_error)
    })?;
    rpc.register_method("election_hasVoted", move |params, elections| {
        let (election_id, address): (ElectionId, Address) = params.parse()?;
        elections
            .has_voted(election_id, address)
            .map_err(to_rpc_error)
    })?;
    rpc.register_method("election_getBallots", move |params, elections| {
        let (election_id, start, end): (ElectionId, u64, u64) = params.parse()?;
        elections
            .get_ballots(election_id, start, end)
            .map_err(to_rpc_error)
    })?;

    // Published results.
    rpc.register_method("election_resultFor", move |params, elections| {
        let (election_id, candidate_id): (ElectionId, CandidateId) = params.parse()?;
        elections
            .result_for(election_id, candidate_id)
            .map_err(to_rpc_error)
    })?;
    rpc.register_method("election_allResults", move |params, elections| {
        let election_id: ElectionId = params.one()?;
        elections.all_results(election_id).map_err(to_rpc_error)
    })?;
    rpc.register_method("election_resultsSummary", move |params, elections| {
        let election_id: ElectionId = params.one()?;
        elections.results_summary(election_id).map_err(to_rpc_error)
    })?;

    rpc.register_subscription(
        "election_subscribeEvents",
        "election_event",
        "election_unsubscribeEvents",
        |_, pending_subscription, elections| async move {
            let mut rx = elections.subscribe_events().map_err(to_rpc_error)?;

            // Accept the subscription. This message is sent immediately
            let subscription = pending_subscription.accept().await?;
            let closed = subscription.closed();
            futures::pin_mut!(closed);

            // This loop continues running until the subscription ends.
            loop {
                let next_msg = rx.recv();
                futures::pin_mut!(next_msg);
                match futures::future::select(closed, next_msg).await {
                    // If the subscription closed, we're done
                    Either::Left(_) => break Ok(()),
                    Either::Right((outcome, channel_closing_future)) => {
                        closed = channel_closing_future;
                        let event = match outcome {
                            Ok(event) => event,
                            Err(RecvError::Lagged(skipped)) => {
                                warn!(skipped, "Event subscriber fell behind");
                                continue;
                            }
                            Err(RecvError::Closed) => break Ok(()),
                        };
                        let msg = SubscriptionMessage::from_json(&event)?;
                        // Sending only fails if the subscriber has canceled, so we can stop sending messages
                        if subscription.send(msg).await.is_err() {
                            break Ok(());
                        }
                    }
                }
            }
        },
    )?;

    Ok(rpc)
}
