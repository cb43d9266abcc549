//! Drives a running election node over JSON-RPC.
//!
//! Every command prints the node's answer as JSON. The `--sender` of an owner or voter action
//! is trusted by the node as given, exactly like the address a wallet session would attach.

use anyhow::Context;
use election_interface::{Address, CandidateId, ElectionId};
use election_rpc::client::ElectionClient;
use jsonrpsee::core::client::ClientT;
use serde_json::{json, Value};

/// The default node endpoint, matching the sample node configuration.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:12345";

/// Command line client for an election node.
#[derive(clap::Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// A url like http://localhost:12345
    #[arg(long, global = true, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,
    /// The action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// The election selected by a command.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Target {
    /// The id of the election
    #[arg(long = "election")]
    pub election_id: u64,
}

/// The election and the caller of an owner or voter action.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Signed {
    #[command(flatten)]
    target: Target,
    /// The address the action is performed as, in hex
    #[arg(long)]
    pub sender: Address,
}

/// Actions against a node.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Create a new election owned by the given address
    Create {
        /// The owner of the new election
        owner: Address,
    },
    /// List the ids of all elections on the node
    List,
    /// Add a candidate to an election that has not started
    AddCandidate {
        #[command(flatten)]
        signed: Signed,
        /// The candidate's display name
        name: String,
    },
    /// Register a voter
    RegisterVoter {
        #[command(flatten)]
        signed: Signed,
        /// The voter's address
        voter: Address,
    },
    /// Open voting
    Start {
        #[command(flatten)]
        signed: Signed,
    },
    /// Close voting and publish the results
    End {
        #[command(flatten)]
        signed: Signed,
    },
    /// Cast a vote as the sender
    Vote {
        #[command(flatten)]
        signed: Signed,
        /// The candidate to vote for
        candidate_id: CandidateId,
    },
    /// Show the current phase
    Phase {
        #[command(flatten)]
        target: Target,
    },
    /// Show the roster with live counts
    Candidates {
        #[command(flatten)]
        target: Target,
    },
    /// Show the owner, and whether an address is the owner, is registered and has voted
    Status {
        #[command(flatten)]
        target: Target,
        /// The address to look up
        address: Address,
    },
    /// Show the accepted ballots with numbers in `start..end`
    Ballots {
        #[command(flatten)]
        target: Target,
        /// First ballot number
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// One past the last ballot number
        #[arg(long, default_value_t = 100)]
        end: u64,
    },
    /// Show the published results of an ended election
    Results {
        #[command(flatten)]
        target: Target,
        /// Only show the count of this candidate
        #[arg(long)]
        candidate: Option<CandidateId>,
    },
}

impl Target {
    fn id(&self) -> ElectionId {
        ElectionId(self.election_id)
    }
}

impl Command {
    /// Runs the command against `client` and returns the node's answer.
    pub async fn run<C: ClientT + Sync>(&self, client: &ElectionClient<C>) -> anyhow::Result<Value> {
        let value = match self {
            Command::Create { owner } => {
                json!({ "electionId": client.create_election(*owner).await? })
            }
            Command::List => json!(client.list_elections().await?),
            Command::AddCandidate { signed, name } => {
                let id = client
                    .add_candidate(signed.target.id(), signed.sender, name)
                    .await?;
                json!({ "candidateId": id })
            }
            Command::RegisterVoter { signed, voter } => {
                client
                    .register_voter(signed.target.id(), signed.sender, *voter)
                    .await?;
                json!({ "registered": voter })
            }
            Command::Start { signed } => {
                client.start_election(signed.target.id(), signed.sender).await?;
                json!({ "phase": client.current_phase(signed.target.id()).await? })
            }
            Command::End { signed } => {
                client.end_election(signed.target.id(), signed.sender).await?;
                json!(client.results_summary(signed.target.id()).await?)
            }
            Command::Vote {
                signed,
                candidate_id,
            } => json!(
                client
                    .cast_vote(signed.target.id(), signed.sender, *candidate_id)
                    .await?
            ),
            Command::Phase { target } => {
                json!({ "phase": client.current_phase(target.id()).await? })
            }
            Command::Candidates { target } => json!(client.get_candidates(target.id()).await?),
            Command::Status { target, address } => {
                let owner = client.owner(target.id()).await?;
                json!({
                    "address": address,
                    "owner": owner,
                    "isOwner": owner == *address,
                    "registered": client.is_registered(target.id(), *address).await?,
                    "hasVoted": client.has_voted(target.id(), *address).await?,
                })
            }
            Command::Ballots { target, start, end } => {
                json!(client.get_ballots(target.id(), *start, *end).await?)
            }
            Command::Results {
                target,
                candidate: Some(candidate_id),
            } => json!({
                "candidateId": candidate_id,
                "voteCount": client.result_for(target.id(), *candidate_id).await?,
            }),
            Command::Results {
                target,
                candidate: None,
            } => json!({
                "summary": client.results_summary(target.id()).await?,
                "results": client.all_results(target.id()).await?,
            }),
        };
        Ok(value)
    }
}

impl Cli {
    /// Connects to the node and runs the selected command.
    pub async fn run(&self) -> anyhow::Result<Value> {
        let client = ElectionClient::http(&self.rpc_url)
            .with_context(|| format!("Invalid rpc url: {}", self.rpc_url))?;
        self.command.run(&client).await.with_context(|| {
            format!(
                "Request to {} failed. You can change the node with --rpc-url",
                self.rpc_url
            )
        })
    }
}
