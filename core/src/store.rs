//! Durable storage boundaries.
//!
//! Two capabilities back the pipeline: a [`ProjectionStore`] holding the three
//! record kinds, and a [`CursorStore`] holding one cursor per tracked source.
//! Both must support concurrent upserts from multiple trackers; ordinary
//! per-key atomicity is sufficient because the reconciliation is safe under
//! arbitrary interleaving of independent record ids.
//!
//! All writes are upsert-merges with the semantics defined by the patch types
//! in [`crate::record`]; the pipeline issues no deletes against projection
//! records.

use crate::error::Result;
use crate::ledger::EventCursor;
use crate::record::{
    EventPatch, EventRecord, ListingPatch, ResaleListingRecord, TicketPatch, TicketRecord,
};
use std::future::Future;

/// Typed upsert-merge storage for the projected relational state.
pub trait ProjectionStore: Send + Sync {
    /// Merge an event patch into the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the write fails.
    fn merge_event(&self, patch: &EventPatch) -> impl Future<Output = Result<()>> + Send;

    /// Merge a ticket patch into the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the write fails.
    fn merge_ticket(&self, patch: &TicketPatch) -> impl Future<Output = Result<()>> + Send;

    /// Merge a resale listing patch into the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the write fails.
    fn merge_listing(&self, patch: &ListingPatch) -> impl Future<Output = Result<()>> + Send;

    /// Read an event record by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the read fails.
    fn get_event(&self, id: &str) -> impl Future<Output = Result<Option<EventRecord>>> + Send;

    /// Read a ticket record by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the read fails.
    fn get_ticket(&self, id: &str) -> impl Future<Output = Result<Option<TicketRecord>>> + Send;

    /// Read a resale listing record by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the read fails.
    fn get_listing(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<ResaleListingRecord>>> + Send;

    /// Count tickets referencing an event.
    ///
    /// This is the source of truth for `tickets_sold`; the pipeline recounts
    /// instead of incrementing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the query fails.
    fn count_tickets(&self, event_id: &str) -> impl Future<Output = Result<u32>> + Send;

    /// Persist a freshly recomputed tickets-sold counter for an event.
    ///
    /// A no-op if the event record does not exist yet (its creation
    /// notification may arrive in a later page; the next ticket write for it
    /// triggers another recount).
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the write fails.
    fn set_tickets_sold(
        &self,
        event_id: &str,
        tickets_sold: u32,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Durable tracker-id → cursor mapping, surviving process restarts.
pub trait CursorStore: Send + Sync {
    /// Load the cursor for a tracked source, if one was ever saved.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the read fails.
    fn load(&self, tracker_id: &str) -> impl Future<Output = Result<Option<EventCursor>>> + Send;

    /// Persist the cursor for a tracked source.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the write fails.
    fn save(
        &self,
        tracker_id: &str,
        cursor: &EventCursor,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Drop the cursor for a tracked source, forcing the next start to replay
    /// from the beginning. Operational tooling only; the poll loop never
    /// calls this.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexerError::Storage`] if the delete fails.
    fn delete(&self, tracker_id: &str) -> impl Future<Output = Result<()>> + Send;
}
