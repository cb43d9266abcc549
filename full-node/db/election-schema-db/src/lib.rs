// SPDX-License-Identifier: Apache-2.0
// Adapted from aptos-core/schemadb

#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! This library implements a schematized DB on top of [RocksDB](https://rocksdb.org/). It makes
//! sure all data passed in and out are structured according to predefined schemas and prevents
//! access to raw keys and values.
//!
//! Every kind of key-value pair lives in its own column family. To store one, declare a
//! [`Schema`] (usually through [`define_schema!`]) naming the key type, the value type and the
//! column family, and implement the codecs for them.
//!
//! Writes are grouped in a [`SchemaBatch`] and applied with [`DB::write_schemas`], which
//! commits the whole batch atomically: either every row lands, or none does.

mod db;
mod iterator;
mod metrics;
pub mod schema;
mod schema_batch;
pub mod test;

use std::io;

pub use db::DB;
pub use iterator::{IteratorOutput, SchemaIterator, SeekKeyEncoder};
pub use schema::Schema;
pub use schema_batch::SchemaBatch;

/// Raw, encoded key bytes.
pub type SchemaKey = Vec<u8>;
/// Raw, encoded value bytes.
pub type SchemaValue = Vec<u8>;

/// A single pending write in a [`SchemaBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Insert or overwrite the value under a key.
    Put {
        /// The encoded value.
        value: SchemaValue,
    },
    /// Remove the key.
    Delete,
}

/// An error that occurred during (de)serialization of a [`Schema`]'s keys or
/// values.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Unable to deserialize a key because it has a different length than
    /// expected.
    #[error("Invalid key length. Expected {expected:}, got {got:}")]
    #[allow(missing_docs)] // The fields' names are self-explanatory.
    InvalidKeyLength { expected: usize, got: usize },
    /// Some other error occurred when (de)serializing a key or value. Inspect
    /// the inner [`anyhow::Error`] for more details.
    #[error(transparent)]
    Wrapped(#[from] anyhow::Error),
    /// I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
}
