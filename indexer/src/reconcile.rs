//! Batch reconciliation: fold one page of notifications into pending writes.
//!
//! The reconciler is a pure function from an ordered page of raw
//! notifications to three id-keyed maps of pending writes, such that applying
//! the writes in any order yields the same final state as applying the
//! notifications in their original order, modulo the intentional
//! last-write-wins fold within the batch. Multiple notifications about the
//! same record collapse into a single write, so the caller issues at most one
//! store operation per distinct id per kind.
//!
//! Persistence is the caller's responsibility; nothing here touches a store.

use dtickets_core::error::{IndexerError, Result};
use dtickets_core::event::{LedgerEvent, RawLedgerEvent};
use dtickets_core::record::{EventPatch, ListingPatch, TicketPatch};
use std::collections::HashMap;

/// Net effect of one page of notifications, keyed by record id.
///
/// At most one pending write per distinct id per map; each write is the fold
/// of every notification in the page touching that id, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingWrites {
    /// Event patches by event id.
    pub events: HashMap<String, EventPatch>,
    /// Ticket patches by ticket id.
    pub tickets: HashMap<String, TicketPatch>,
    /// Resale listing patches by listing id.
    pub listings: HashMap<String, ListingPatch>,
}

impl PendingWrites {
    /// Whether the batch produced no writes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.tickets.is_empty() && self.listings.is_empty()
    }

    /// Event ids whose tickets-sold counter must be recomputed: every event
    /// referenced by a ticket write in this batch.
    ///
    /// Owner-only ticket writes (resale completions) carry no event id and
    /// are deliberately absent: resale transfers ownership, it never changes
    /// how many tickets were sold.
    #[must_use]
    pub fn touched_event_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .tickets
            .values()
            .filter_map(|t| t.event_id.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Fold an ordered page of notifications into [`PendingWrites`].
///
/// Every notification's type must start with `module_prefix`; a mismatch
/// fails the whole batch, because it means the tracker subscribed to the
/// wrong source and silently dropping the item would corrupt the projection.
/// Unknown type suffixes are skipped: deliberate forward compatibility with
/// event families this pipeline does not yet understand.
///
/// # Errors
///
/// - [`IndexerError::FilterMismatch`] if any notification fails the prefix
///   precondition
/// - [`IndexerError::Decode`] if a known variant's payload is malformed
pub fn reconcile_page(items: &[RawLedgerEvent], module_prefix: &str) -> Result<PendingWrites> {
    let mut writes = PendingWrites::default();

    for raw in items {
        if !raw.event_type.starts_with(module_prefix) {
            return Err(IndexerError::FilterMismatch {
                event_type: raw.event_type.clone(),
                expected_prefix: module_prefix.to_string(),
            });
        }

        match LedgerEvent::decode(raw)? {
            LedgerEvent::EventCreated(payload) => {
                // Full snapshot; a later occurrence for the same id in this
                // batch simply replaces the pending patch.
                writes.events.insert(
                    payload.event_id.clone(),
                    EventPatch {
                        id: payload.event_id,
                        name: payload.name,
                        venue: payload.venue,
                        organizer: payload.organizer,
                        img_url: payload.img_url,
                        start_time: payload.start_time,
                        end_time: payload.end_time,
                        ticket_price: payload.ticket_price,
                        total_tickets: payload.total_tickets,
                    },
                );
            }
            LedgerEvent::TicketPurchased(payload) => {
                writes.tickets.insert(
                    payload.ticket_id.clone(),
                    TicketPatch {
                        id: payload.ticket_id,
                        event_id: Some(payload.event_id),
                        ticket_number: Some(payload.ticket_number),
                        owner: payload.recipient,
                    },
                );
            }
            LedgerEvent::TicketListedForResale(payload) => {
                let pending = writes
                    .listings
                    .entry(payload.listing_id.clone())
                    .or_insert_with(|| ListingPatch {
                        id: payload.listing_id.clone(),
                        ticket_id: None,
                        event_id: None,
                        seller: None,
                        price: None,
                        active: true,
                    });
                // `active` is deliberately left untouched on an existing
                // entry: a cancel/resold earlier in this batch already closed
                // the listing id, and it stays closed.
                pending.ticket_id = Some(payload.ticket_id);
                pending.event_id = Some(payload.original_event_id);
                pending.seller = Some(payload.seller);
                pending.price = Some(payload.resale_price);
            }
            LedgerEvent::ResaleCancelled(payload) => {
                close_listing(&mut writes, payload.listing_id);
            }
            LedgerEvent::TicketResold(payload) => {
                // Two independent partial writes from one notification: the
                // listing closes and the ticket changes owner.
                close_listing(&mut writes, payload.listing_id);
                writes
                    .tickets
                    .entry(payload.ticket_id.clone())
                    .and_modify(|pending| pending.owner = payload.buyer.clone())
                    .or_insert_with(|| TicketPatch {
                        id: payload.ticket_id,
                        event_id: None,
                        ticket_number: None,
                        owner: payload.buyer,
                    });
            }
            LedgerEvent::Unrecognized => {}
        }
    }

    Ok(writes)
}

/// Flip a pending listing write to inactive, preserving any other fields
/// already accumulated for that id in this batch.
fn close_listing(writes: &mut PendingWrites, listing_id: String) {
    writes
        .listings
        .entry(listing_id.clone())
        .and_modify(|pending| pending.active = false)
        .or_insert_with(|| ListingPatch {
            id: listing_id,
            ticket_id: None,
            event_id: None,
            seller: None,
            price: None,
            active: false,
        });
}
