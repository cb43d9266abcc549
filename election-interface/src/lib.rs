//! This crate defines the core types shared by every component of the election engine:
//! identities, the election phase machine, ballots and results, the error kinds the engine
//! reports, and the [`ElectionRpcProvider`](rpc::ElectionRpcProvider) trait that RPC servers
//! are built on.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod address;
mod election;
mod error;
pub mod rpc;

pub use address::{Address, ADDRESS_LENGTH};
pub use election::*;
pub use error::{ElectionError, ErrorKind};
