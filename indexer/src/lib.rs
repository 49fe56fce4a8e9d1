//! # dTickets Indexer
//!
//! The event-ingestion and reconciliation pipeline for the dTickets ledger
//! module: cursor-tracked polling, per-source batching, idempotent and
//! order-independent state reconciliation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   page of raw events    ┌──────────────────┐
//! │  Ledger Client   │ ──────────────────────▶ │ Batch Reconciler │
//! │ (suix_queryEvents)│                        │   (pure fold)    │
//! └──────────────────┘                         └────────┬─────────┘
//!          ▲                                            │ PendingWrites
//!          │ cursor                                     ▼
//! ┌────────┴─────────┐   advance on success    ┌──────────────────┐
//! │   Cursor Store   │ ◀────────────────────── │    Poll Loop     │
//! └──────────────────┘                         └────────┬─────────┘
//!                                                       │ upsert-merge
//!                                                       ▼
//!                                              ┌──────────────────┐
//!                                              │ Projection Store │
//!                                              └──────────────────┘
//! ```
//!
//! One [`tracker::EventTracker`] per tracked module, each running its own
//! [`poll::run_tracker`] loop as an independent task. Trackers share no
//! mutable in-memory state, only the external stores, and a failing tracker
//! never affects the others.

pub mod config;
pub mod metrics;
pub mod poll;
pub mod reconcile;
pub mod tracker;

pub use config::IndexerConfig;
pub use poll::{CycleOutcome, execute_cycle, run_tracker};
pub use reconcile::{PendingWrites, reconcile_page};
pub use tracker::{EventTracker, registry};
