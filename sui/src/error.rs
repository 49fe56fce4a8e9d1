//! Error types for the Sui JSON-RPC client.

use thiserror::Error;

/// Errors that can occur when querying a Sui fullnode.
#[derive(Debug, Error)]
pub enum SuiClientError {
    /// HTTP request failed (transport level).
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Fullnode answered with a non-success HTTP status.
    #[error("RPC HTTP error (status {status}): {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },

    /// Fullnode returned a JSON-RPC error object.
    #[error("RPC error (code {code}): {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node.
        message: String,
    },

    /// Response body did not parse as the expected shape.
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}

impl From<SuiClientError> for dtickets_core::IndexerError {
    fn from(err: SuiClientError) -> Self {
        Self::Ledger(err.to_string())
    }
}
