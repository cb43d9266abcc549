pub mod tables;
/// Defines the on-disk representation of the election state and the results ledger.
pub mod types;
