#![forbid(unsafe_code)]

//! The election state machine.
//!
//! An [`Election`] owns one election's voter registry, candidate roster and phase. Every
//! mutation is validated against an in-memory snapshot, committed to storage as a single
//! atomic batch, and only then applied to the snapshot. The [`ElectionService`] hosts many
//! elections over one storage instance and serves them over RPC.

pub mod call;
pub mod genesis;
pub mod query;
mod service;

#[cfg(test)]
mod tests;

mod types;

use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use election_db::ElectionStorage;
use election_interface::{Address, ElectionEvent, ElectionId};
use election_results::ResultLedger;
pub use service::ElectionService;
use tokio::sync::broadcast;
use types::ElectionState;

/// Initial configuration of an election.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElectionConfig {
    /// The owner: the only address allowed to manage the election.
    pub admin: Address,
}

/// The authenticated principal of a call. The engine trusts it as given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    sender: Address,
}

impl Context {
    /// A context for calls made by `sender`.
    pub fn new(sender: Address) -> Self {
        Self { sender }
    }

    /// The caller.
    pub fn sender(&self) -> &Address {
        &self.sender
    }
}

/// A single election.
pub struct Election {
    id: ElectionId,
    storage: ElectionStorage,
    results: ResultLedger,
    pub(crate) state: RwLock<ElectionState>,
    events: broadcast::Sender<ElectionEvent>,
}

impl Election {
    /// The id this election is stored under.
    pub fn id(&self) -> ElectionId {
        self.id
    }

    /// Notifies subscribers. Having none is not an error.
    fn emit(&self, event: ElectionEvent) {
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for Election {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Election").field("id", &self.id).finish()
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
