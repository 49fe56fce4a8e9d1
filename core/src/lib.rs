//! # dTickets Core
//!
//! Domain records, ledger event types, and boundary traits for the dTickets
//! indexer.
//!
//! The indexer ingests the append-only event stream emitted by the `dtickets`
//! Move module and projects it into queryable relational state. This crate
//! defines everything the pipeline shares with its collaborators:
//!
//! - **Ledger events** ([`event`]): the tagged union of notification
//!   variants, decoded by suffix match on the fully-qualified type string
//! - **Records and patches** ([`record`]): the projected state and the
//!   explicit upsert-merge semantics applied to it
//! - **Boundary traits** ([`ledger`], [`store`]): the external capabilities
//!   the pipeline consumes: a paged cursor-addressable ledger read, a
//!   projection store, and a durable cursor store
//! - **Error taxonomy** ([`error`]): which failures are fatal, batch-fatal,
//!   or transient
//!
//! The pipeline itself (reconciler, poll loop, tracker registry) lives in the
//! `dtickets-indexer` crate; concrete Sui RPC and Postgres implementations of
//! the boundary traits live in `dtickets-sui` and `dtickets-postgres`.

pub mod error;
pub mod event;
pub mod ledger;
pub mod record;
pub mod store;

pub use error::{IndexerError, Result};
pub use event::{LedgerEvent, RawLedgerEvent};
pub use ledger::{EventCursor, EventFilter, EventPage, LedgerClient};
pub use record::{
    EventPatch, EventRecord, ListingPatch, ResaleListingRecord, TicketPatch, TicketRecord,
};
pub use store::{CursorStore, ProjectionStore};
