//! JSON-RPC server and client implementations for the election engine.
//!
//! Every method lives in the `election_` namespace. Failures are returned as JSON-RPC error
//! objects whose code identifies the [`ErrorKind`](election_interface::ErrorKind) (see
//! [`error_code`]) and whose data is an [`ErrorData`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "client")]
pub mod client;

use election_interface::{ElectionError, ErrorKind};
use jsonrpsee::types::ErrorObjectOwned;

/// Codes of election errors count down from here, one per [`ErrorKind`].
pub const ELECTION_ERROR_CODE_BASE: i32 = -32000;

/// The JSON-RPC error code reported for `kind`.
pub const fn error_code(kind: ErrorKind) -> i32 {
    ELECTION_ERROR_CODE_BASE - kind.code()
}

/// The `data` member of an election error object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    /// Human readable description of the failure.
    pub message: String,
    /// Whether the same call may succeed if retried.
    pub retryable: bool,
}

/// Converts an [`ElectionError`] into the error object sent to clients.
pub fn to_rpc_error(err: ElectionError) -> ErrorObjectOwned {
    let kind = err.kind();
    ErrorObjectOwned::owned(
        error_code(kind),
        kind.as_str(),
        Some(ErrorData {
            message: err.to_string(),
            retryable: err.is_retryable(),
        }),
    )
}
