//! This module defines the following tables:
//!
//! Election Tables:
//! - `ElectionId -> StoredElection`
//! - `(ElectionId, Address) -> Voter`
//! - `(ElectionId, CandidateId) -> StoredCandidate`
//! - `(ElectionId, BallotNumber) -> Ballot`
//!
//! Result Tables:
//! - `(ElectionId, CandidateId) -> FinalTally`
//! - `ElectionId -> ResultsSummary`
//!
//! Every composite key starts with the [`ElectionId`], encoded big-endian, so all rows of
//! one election are contiguous and can be scanned with an [`ElectionPrefix`].

use election_interface::{Ballot, ElectionId, ResultsSummary};
use election_schema_db::schema::Result;
use election_schema_db::SeekKeyEncoder;

use super::types::{
    BallotKey, CandidateKey, FinalTally, StoredCandidate, StoredElection, Voter, VoterKey,
};

/// A list of all tables holding live election state.
pub const ELECTION_TABLES: &[&str] = &[
    ElectionById::table_name(),
    VoterByAddress::table_name(),
    CandidateById::table_name(),
    BallotByNumber::table_name(),
];

/// A list of all tables of the results ledger. They are written once per election, in the
/// same batch that ends it, and never change afterwards.
pub const RESULT_TABLES: &[&str] = &[
    FinalTallyByCandidate::table_name(),
    ResultsSummaryByElection::table_name(),
];

/// Macro to define a table that implements [`election_schema_db::Schema`].
/// KeyCodec<Schema> and ValueCodec<Schema> must be implemented separately.
macro_rules! define_table_without_codec {
    ($(#[$docs:meta])+ ( $table_name:ident ) $key:ty => $value:ty) => {
        $(#[$docs])+
        ///
        #[doc = concat!("Takes [`", stringify!($key), "`] as a key and returns [`", stringify!($value), "`]")]
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $table_name;

        impl ::election_schema_db::schema::Schema for $table_name {
            const COLUMN_FAMILY_NAME: &'static str = $table_name::table_name();
            type Key = $key;
            type Value = $value;
        }

        impl $table_name {
            #[doc=concat!("Return ", stringify!($table_name), " as it is present inside the database.")]
            pub const fn table_name() -> &'static str {
                ::core::stringify!($table_name)
            }
        }

        impl ::std::fmt::Display for $table_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::core::write!(f, "{}", stringify!($table_name))
            }
        }
    };
}

macro_rules! impl_borsh_value_codec {
    ($table_name:ident, $value:ty) => {
        impl ::election_schema_db::schema::ValueCodec<$table_name> for $value {
            fn encode_value(
                &self,
            ) -> ::std::result::Result<::std::vec::Vec<u8>, ::election_schema_db::CodecError> {
                ::borsh::BorshSerialize::try_to_vec(self).map_err(Into::into)
            }

            fn decode_value(
                data: &[u8],
            ) -> ::std::result::Result<Self, ::election_schema_db::CodecError> {
                ::borsh::BorshDeserialize::deserialize_reader(&mut &data[..]).map_err(Into::into)
            }
        }
    };
}

/// Defines a table whose key is a [`SeekKeyEncoder`]. Borsh serializes integers as
/// little-endian, but RocksDB uses lexigographic ordering which is only
/// compatible with big-endian, so we use [`bincode`] with the big-endian option
/// here. Values are borsh-encoded.
macro_rules! define_table_with_seek_key_codec {
    ($(#[$docs:meta])+ ($table_name:ident) $key:ty => $value:ty) => {
        define_table_without_codec!($(#[$docs])+ ( $table_name ) $key => $value);

        impl ::election_schema_db::schema::KeyEncoder<$table_name> for $key {
            fn encode_key(&self) -> ::std::result::Result<::std::vec::Vec<u8>, ::election_schema_db::CodecError> {
                encode_big_endian(self)
            }
        }

        impl ::election_schema_db::schema::KeyDecoder<$table_name> for $key {
            fn decode_key(data: &[u8]) -> ::std::result::Result<Self, ::election_schema_db::CodecError> {
                use ::anyhow::Context as _;
                use ::bincode::Options as _;

                let bincode_options = ::bincode::options()
                    .with_fixint_encoding()
                    .with_big_endian();

                bincode_options.deserialize_from(&mut &data[..]).context("Failed to deserialize key").map_err(Into::into)
            }
        }

        impl ::election_schema_db::SeekKeyEncoder<$table_name> for $key {
            fn encode_seek_key(&self) -> ::std::result::Result<::std::vec::Vec<u8>, ::election_schema_db::CodecError> {
                <Self as ::election_schema_db::schema::KeyEncoder<$table_name>>::encode_key(self)
            }
        }

        impl_borsh_value_codec!($table_name, $value);
    };
}

/// Makes a table keyed by `(ElectionId, _)` scannable one election at a time.
macro_rules! impl_election_prefix {
    ($table_name:ident) => {
        impl SeekKeyEncoder<$table_name> for ElectionPrefix {
            fn encode_seek_key(&self) -> Result<Vec<u8>> {
                encode_big_endian(&self.0)
            }
        }
    };
}

fn encode_big_endian<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    use anyhow::Context as _;
    use bincode::Options as _;

    let bincode_options = bincode::options()
        .with_fixint_encoding()
        .with_big_endian();

    Ok(bincode_options
        .serialize(value)
        .context("Failed to serialize key")?)
}

/// Seeks the rows of a single election in a table keyed by `(ElectionId, _)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectionPrefix(pub ElectionId);

define_table_with_seek_key_codec!(
    /// The primary source for election headers: owner, phase and creation time.
    (ElectionById) ElectionId => StoredElection
);

define_table_with_seek_key_codec!(
    /// The voter registry. An address is registered in an election iff it has a row here.
    (VoterByAddress) VoterKey => Voter
);

define_table_with_seek_key_codec!(
    /// The live candidate roster with running counts.
    (CandidateById) CandidateKey => StoredCandidate
);

define_table_with_seek_key_codec!(
    /// The append-only log of accepted ballots.
    (BallotByNumber) BallotKey => Ballot
);

define_table_with_seek_key_codec!(
    /// Final per-candidate counts, published when an election ends.
    (FinalTallyByCandidate) CandidateKey => FinalTally
);

define_table_with_seek_key_codec!(
    /// Aggregate figures of the published results.
    (ResultsSummaryByElection) ElectionId => ResultsSummary
);

impl_election_prefix!(VoterByAddress);
impl_election_prefix!(CandidateById);
impl_election_prefix!(BallotByNumber);
impl_election_prefix!(FinalTallyByCandidate);
