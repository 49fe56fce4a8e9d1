//! In-memory projection and cursor stores.

use dtickets_core::error::Result;
use dtickets_core::ledger::EventCursor;
use dtickets_core::record::{
    EventPatch, EventRecord, ListingPatch, ResaleListingRecord, TicketPatch, TicketRecord,
};
use dtickets_core::store::{CursorStore, ProjectionStore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory projection store for fast, deterministic testing.
///
/// Applies the same upsert-merge semantics as the Postgres store, via the
/// patch `merge` functions, over three `HashMap`s.
///
/// # Example
///
/// ```
/// use dtickets_testing::InMemoryProjectionStore;
/// use dtickets_core::record::TicketPatch;
/// use dtickets_core::store::ProjectionStore;
///
/// # async fn example() -> dtickets_core::Result<()> {
/// let store = InMemoryProjectionStore::new();
///
/// store
///     .merge_ticket(&TicketPatch {
///         id: "0xt1".to_string(),
///         event_id: Some("0xe1".to_string()),
///         ticket_number: Some(1),
///         owner: "0xr1".to_string(),
///     })
///     .await?;
///
/// assert_eq!(store.count_tickets("0xe1").await?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryProjectionStore {
    events: Arc<RwLock<HashMap<String, EventRecord>>>,
    tickets: Arc<RwLock<HashMap<String, TicketRecord>>>,
    listings: Arc<RwLock<HashMap<String, ResaleListingRecord>>>,
}

impl InMemoryProjectionStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all projection data (for test isolation).
    pub fn clear(&self) {
        self.events.write().unwrap().clear();
        self.tickets.write().unwrap().clear();
        self.listings.write().unwrap().clear();
    }

    /// Number of stored event records.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// Number of stored ticket records.
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.tickets.read().unwrap().len()
    }

    /// Number of stored resale listing records.
    #[must_use]
    pub fn listing_count(&self) -> usize {
        self.listings.read().unwrap().len()
    }

    /// Snapshot of the full projection state, for whole-state assertions.
    #[must_use]
    pub fn snapshot(
        &self,
    ) -> (
        HashMap<String, EventRecord>,
        HashMap<String, TicketRecord>,
        HashMap<String, ResaleListingRecord>,
    ) {
        (
            self.events.read().unwrap().clone(),
            self.tickets.read().unwrap().clone(),
            self.listings.read().unwrap().clone(),
        )
    }
}

impl ProjectionStore for InMemoryProjectionStore {
    async fn merge_event(&self, patch: &EventPatch) -> Result<()> {
        let mut events = self.events.write().unwrap();
        let merged = patch.merge(events.get(&patch.id).cloned());
        events.insert(patch.id.clone(), merged);
        Ok(())
    }

    async fn merge_ticket(&self, patch: &TicketPatch) -> Result<()> {
        let mut tickets = self.tickets.write().unwrap();
        let merged = patch.merge(tickets.get(&patch.id).cloned());
        tickets.insert(patch.id.clone(), merged);
        Ok(())
    }

    async fn merge_listing(&self, patch: &ListingPatch) -> Result<()> {
        let mut listings = self.listings.write().unwrap();
        let merged = patch.merge(listings.get(&patch.id).cloned());
        listings.insert(patch.id.clone(), merged);
        Ok(())
    }

    async fn get_event(&self, id: &str) -> Result<Option<EventRecord>> {
        Ok(self.events.read().unwrap().get(id).cloned())
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<TicketRecord>> {
        Ok(self.tickets.read().unwrap().get(id).cloned())
    }

    async fn get_listing(&self, id: &str) -> Result<Option<ResaleListingRecord>> {
        Ok(self.listings.read().unwrap().get(id).cloned())
    }

    async fn count_tickets(&self, event_id: &str) -> Result<u32> {
        let count = self
            .tickets
            .read()
            .unwrap()
            .values()
            .filter(|t| t.event_id == event_id)
            .count();
        Ok(u32::try_from(count).unwrap())
    }

    async fn set_tickets_sold(&self, event_id: &str, tickets_sold: u32) -> Result<()> {
        if let Some(event) = self.events.write().unwrap().get_mut(event_id) {
            event.tickets_sold = tickets_sold;
        }
        Ok(())
    }
}

/// In-memory cursor store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCursorStore {
    cursors: Arc<RwLock<HashMap<String, EventCursor>>>,
}

impl InMemoryCursorStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous read of the stored cursor, for assertions.
    #[must_use]
    pub fn get(&self, tracker_id: &str) -> Option<EventCursor> {
        self.cursors.read().unwrap().get(tracker_id).cloned()
    }
}

impl CursorStore for InMemoryCursorStore {
    async fn load(&self, tracker_id: &str) -> Result<Option<EventCursor>> {
        Ok(self.cursors.read().unwrap().get(tracker_id).cloned())
    }

    async fn save(&self, tracker_id: &str, cursor: &EventCursor) -> Result<()> {
        self.cursors
            .write()
            .unwrap()
            .insert(tracker_id.to_string(), cursor.clone());
        Ok(())
    }

    async fn delete(&self, tracker_id: &str) -> Result<()> {
        self.cursors.write().unwrap().remove(tracker_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cursor_store_round_trip() {
        let store = InMemoryCursorStore::new();
        assert!(store.load("0xabc::dtickets").await.unwrap().is_none());

        let cursor = EventCursor::new("digest-1", "0");
        store.save("0xabc::dtickets", &cursor).await.unwrap();
        assert_eq!(store.load("0xabc::dtickets").await.unwrap(), Some(cursor));

        store.delete("0xabc::dtickets").await.unwrap();
        assert!(store.load("0xabc::dtickets").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_tickets_sold_ignores_missing_event() {
        let store = InMemoryProjectionStore::new();
        store.set_tickets_sold("0xmissing", 3).await.unwrap();
        assert_eq!(store.event_count(), 0);
    }
}
