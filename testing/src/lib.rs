//! # dTickets Testing
//!
//! Fast, deterministic in-memory implementations of the indexer's boundary
//! traits, plus builders for raw ledger notifications:
//!
//! - [`InMemoryProjectionStore`]: `HashMap`-backed projection storage
//! - [`InMemoryCursorStore`]: in-memory tracker-id → cursor mapping
//! - [`ScriptedLedgerClient`]: replays pre-canned pages (and injected
//!   failures) in order, then steady-states on empty pages
//! - [`events`]: builders for the five known notification variants
//!
//! Together these let pipeline tests run whole fetch→reconcile→persist cycles
//! without a database or an RPC endpoint.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning is a test bug, not a documented failure

mod ledger_mock;
mod store_mocks;

pub mod events;

pub use ledger_mock::ScriptedLedgerClient;
pub use store_mocks::{InMemoryCursorStore, InMemoryProjectionStore};
