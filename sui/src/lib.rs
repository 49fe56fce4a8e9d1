//! # dTickets Sui
//!
//! Sui JSON-RPC implementation of the indexer's ledger read boundary.
//!
//! [`SuiLedgerClient`] implements `dtickets_core::LedgerClient` over a
//! fullnode's `suix_queryEvents` method: ascending order, filtered by
//! `MoveEventModule`, with the node's `(txDigest, eventSeq)` event id as the
//! opaque page cursor.

mod client;
mod error;
mod rpc;

pub use client::SuiLedgerClient;
pub use error::SuiClientError;
