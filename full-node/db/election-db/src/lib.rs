#![forbid(unsafe_code)]

//! Durable storage for elections.
//!
//! A single RocksDB instance holds both the live election tables and the results ledger, so
//! that ending an election and publishing its results commit in one atomic write.

pub mod rocks_db_config;
pub mod schema;
mod storage;

pub use storage::ElectionStorage;
