//! Ledger read boundary.
//!
//! The pipeline never talks to a concrete RPC implementation; it is written
//! against [`LedgerClient`], a paged, cursor-addressable read of events
//! filtered by source module. Pages are delivered in ascending order with a
//! stable per-page next-cursor token. Timeouts and transport retries are the
//! implementation's concern; the poll loop only reacts to success or failure.

use crate::error::Result;
use crate::event::RawLedgerEvent;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Filter selecting events emitted by one module of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Package id, e.g. `0x0f13...80a7`.
    pub package: String,
    /// Module name within the package, e.g. `dtickets`.
    pub module: String,
}

impl EventFilter {
    /// Create a filter for a package/module pair.
    #[must_use]
    pub fn new(package: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            module: module.into(),
        }
    }

    /// The fully-qualified type prefix every matching event must carry.
    #[must_use]
    pub fn type_prefix(&self) -> String {
        format!("{}::{}", self.package, self.module)
    }
}

/// Opaque, totally ordered position token in a tracked source's stream.
///
/// Identifies the last successfully processed page boundary; advanced only
/// after both reconciliation and persistence of that page succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCursor {
    /// Digest of the transaction that emitted the boundary event.
    pub tx_digest: String,
    /// Sequence of the event within that transaction.
    pub event_seq: String,
}

impl EventCursor {
    /// Create a cursor from its two components.
    #[must_use]
    pub fn new(tx_digest: impl Into<String>, event_seq: impl Into<String>) -> Self {
        Self {
            tx_digest: tx_digest.into(),
            event_seq: event_seq.into(),
        }
    }
}

/// One page of notifications from the ledger, in delivery order.
#[derive(Debug, Clone)]
pub struct EventPage {
    /// Notifications in ascending delivery order.
    pub items: Vec<RawLedgerEvent>,
    /// Position token for the page boundary, if the ledger supplied one.
    pub next_cursor: Option<EventCursor>,
    /// Whether the ledger reports more data beyond this page.
    pub has_more: bool,
}

impl EventPage {
    /// An empty page with no cursor movement.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }
}

/// Paged, cursor-addressable read of ledger events.
///
/// Page size is bounded by the ledger's own limit; callers never re-implement
/// it. Implementations must return items in ascending delivery order.
pub trait LedgerClient: Send + Sync {
    /// Fetch the next page of events matching `filter`, starting after
    /// `cursor` (or from the beginning when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Ledger`] on transport or RPC failure.
    fn fetch_page(
        &self,
        filter: &EventFilter,
        cursor: Option<&EventCursor>,
    ) -> impl Future<Output = Result<EventPage>> + Send;
}
