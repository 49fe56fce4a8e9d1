//! Error taxonomy for the indexer pipeline.
//!
//! The variants map directly onto how the poll loop reacts to a failure:
//!
//! - [`IndexerError::Config`]: fatal at startup, before any tracker spawns
//! - [`IndexerError::FilterMismatch`]: fatal to the current batch only; the
//!   cursor is not advanced and the same page is retried next cycle
//! - [`IndexerError::Ledger`], [`IndexerError::Storage`],
//!   [`IndexerError::Decode`]: transient; logged, cursor left unchanged,
//!   cycle rescheduled after the standard delay

use thiserror::Error;

/// Errors that can occur in the indexer pipeline.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Missing or invalid configuration (e.g. no tracked package id).
    ///
    /// Aborts the whole pipeline at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A notification's type does not start with the tracker's module prefix.
    ///
    /// Signals a misconfigured event filter. The whole batch is discarded
    /// rather than silently dropping the offending item.
    #[error("Event type '{event_type}' does not match tracked module '{expected_prefix}'")]
    FilterMismatch {
        /// Fully-qualified type of the offending notification.
        event_type: String,
        /// The module prefix the tracker subscribed to.
        expected_prefix: String,
    },

    /// Ledger fetch failed (transport or RPC error).
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Projection or cursor store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A known event variant carried a payload that could not be decoded.
    ///
    /// Unknown variants are never a decode error; they are skipped.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for indexer operations.
pub type Result<T> = std::result::Result<T, IndexerError>;
