//! Projection records and partial-patch merge semantics.
//!
//! The projection is resilient to duplicate and out-of-order delivery because
//! every write is an **upsert-merge**: create the record if absent, otherwise
//! overwrite only the fields the patch carries. The merge is an explicit
//! function per record kind rather than a storage-level primitive, so the
//! semantics are the same whether the backing store is Postgres or an
//! in-memory test double.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A projected ledger event (the thing tickets are sold for).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Ledger-assigned object id.
    pub id: String,
    /// Event name.
    pub name: String,
    /// Free-form description.
    ///
    /// Not carried by the creation notification; defaults to empty and is
    /// never touched by the pipeline afterwards.
    pub description: String,
    /// Venue name.
    pub venue: String,
    /// Organizer principal address.
    pub organizer: String,
    /// Image reference.
    pub img_url: String,
    /// Event start.
    pub start_time: DateTime<Utc>,
    /// Event end.
    pub end_time: DateTime<Utc>,
    /// Unit ticket price in MIST.
    pub ticket_price: u64,
    /// Total ticket capacity.
    pub total_tickets: u32,
    /// Number of tickets issued so far.
    ///
    /// Always recomputed as a count of [`TicketRecord`]s referencing this
    /// event, never incremented heuristically, which makes it self-correcting
    /// under duplicate or reordered delivery.
    pub tickets_sold: u32,
}

/// Pending write for an [`EventRecord`].
///
/// Creation notifications are full snapshots, so the patch carries every
/// field except `description` (absent on the wire) and `tickets_sold`
/// (derived). Repeated deliveries for the same id are corrections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPatch {
    /// Target record id.
    pub id: String,
    /// Event name.
    pub name: String,
    /// Venue name.
    pub venue: String,
    /// Organizer principal address.
    pub organizer: String,
    /// Image reference.
    pub img_url: String,
    /// Event start.
    pub start_time: DateTime<Utc>,
    /// Event end.
    pub end_time: DateTime<Utc>,
    /// Unit ticket price in MIST.
    pub ticket_price: u64,
    /// Total ticket capacity.
    pub total_tickets: u32,
}

impl EventPatch {
    /// Apply this patch on top of an existing record, or materialize a fresh
    /// record if none exists.
    #[must_use]
    pub fn merge(&self, existing: Option<EventRecord>) -> EventRecord {
        let (description, tickets_sold) =
            existing.map_or_else(|| (String::new(), 0), |e| (e.description, e.tickets_sold));

        EventRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            description,
            venue: self.venue.clone(),
            organizer: self.organizer.clone(),
            img_url: self.img_url.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            ticket_price: self.ticket_price,
            total_tickets: self.total_tickets,
            tickets_sold,
        }
    }
}

/// A projected ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Ledger-assigned object id.
    pub id: String,
    /// Owning event id.
    ///
    /// Empty when the ticket was first seen through a resale completion with
    /// no prior purchase notification (a known upstream inconsistency,
    /// preserved as-is).
    pub event_id: String,
    /// Sequence number within the event.
    pub ticket_number: u32,
    /// Current owner principal.
    ///
    /// Always the most recent assignment seen, whether from the initial
    /// purchase or a resale completion.
    pub owner: String,
}

/// Pending write for a [`TicketRecord`].
///
/// A purchase carries the full field set; a resale completion only reassigns
/// the owner, so `event_id` and `ticket_number` are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketPatch {
    /// Target record id.
    pub id: String,
    /// Owning event id, when known.
    pub event_id: Option<String>,
    /// Sequence number, when known.
    pub ticket_number: Option<u32>,
    /// New owner principal.
    pub owner: String,
}

impl TicketPatch {
    /// Apply this patch on top of an existing record, or materialize a fresh
    /// record if none exists.
    #[must_use]
    pub fn merge(&self, existing: Option<TicketRecord>) -> TicketRecord {
        match existing {
            Some(ticket) => TicketRecord {
                id: self.id.clone(),
                event_id: self.event_id.clone().unwrap_or(ticket.event_id),
                ticket_number: self.ticket_number.unwrap_or(ticket.ticket_number),
                owner: self.owner.clone(),
            },
            None => TicketRecord {
                id: self.id.clone(),
                event_id: self.event_id.clone().unwrap_or_default(),
                ticket_number: self.ticket_number.unwrap_or(0),
                owner: self.owner.clone(),
            },
        }
    }
}

/// A projected resale listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResaleListingRecord {
    /// Ledger-assigned listing id.
    pub id: String,
    /// The ticket being offered.
    pub ticket_id: String,
    /// The event the ticket belongs to.
    pub event_id: String,
    /// Seller principal address.
    pub seller: String,
    /// Asking price in MIST.
    pub price: u64,
    /// Whether the listing is still open.
    ///
    /// True only between a listing notification and the next cancel/resold for
    /// the same id. Once false it is never flipped back: a re-listing upstream
    /// produces a new listing id.
    pub active: bool,
}

/// Pending write for a [`ResaleListingRecord`].
///
/// A listing notification carries the full field set; cancel/resold only flip
/// `active`, so everything else is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPatch {
    /// Target record id.
    pub id: String,
    /// The ticket being offered, when known.
    pub ticket_id: Option<String>,
    /// The event the ticket belongs to, when known.
    pub event_id: Option<String>,
    /// Seller principal address, when known.
    pub seller: Option<String>,
    /// Asking price in MIST, when known.
    pub price: Option<u64>,
    /// Whether the listing is open after this write.
    pub active: bool,
}

impl ListingPatch {
    /// Apply this patch on top of an existing record, or materialize a fresh
    /// record if none exists.
    ///
    /// An inactive listing never becomes active again, regardless of what a
    /// late or redelivered listing notification claims.
    #[must_use]
    pub fn merge(&self, existing: Option<ResaleListingRecord>) -> ResaleListingRecord {
        match existing {
            Some(listing) => ResaleListingRecord {
                id: self.id.clone(),
                ticket_id: self.ticket_id.clone().unwrap_or(listing.ticket_id),
                event_id: self.event_id.clone().unwrap_or(listing.event_id),
                seller: self.seller.clone().unwrap_or(listing.seller),
                price: self.price.unwrap_or(listing.price),
                active: listing.active && self.active,
            },
            None => ResaleListingRecord {
                id: self.id.clone(),
                ticket_id: self.ticket_id.clone().unwrap_or_default(),
                event_id: self.event_id.clone().unwrap_or_default(),
                seller: self.seller.clone().unwrap_or_default(),
                price: self.price.unwrap_or(0),
                active: self.active,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event_patch(id: &str, venue: &str) -> EventPatch {
        EventPatch {
            id: id.to_string(),
            name: "RustConf".to_string(),
            venue: venue.to_string(),
            organizer: "0xorg".to_string(),
            img_url: String::new(),
            start_time: Utc.timestamp_millis_opt(1_735_689_600_000).single().unwrap(),
            end_time: Utc.timestamp_millis_opt(1_735_776_000_000).single().unwrap(),
            ticket_price: 100,
            total_tickets: 10,
        }
    }

    #[test]
    fn event_merge_creates_with_empty_description_and_zero_sold() {
        let record = event_patch("0xe1", "Portland").merge(None);
        assert_eq!(record.description, "");
        assert_eq!(record.tickets_sold, 0);
    }

    #[test]
    fn event_merge_preserves_derived_fields_on_correction() {
        let mut existing = event_patch("0xe1", "Portland").merge(None);
        existing.description = "keynote".to_string();
        existing.tickets_sold = 7;

        let corrected = event_patch("0xe1", "Seattle").merge(Some(existing));
        assert_eq!(corrected.venue, "Seattle");
        assert_eq!(corrected.description, "keynote");
        assert_eq!(corrected.tickets_sold, 7);
    }

    #[test]
    fn ticket_merge_without_prior_purchase_creates_orphan() {
        // A resold notification for a never-seen ticket produces a record
        // with only id and owner. Preserved upstream behavior.
        let patch = TicketPatch {
            id: "0xt9".to_string(),
            event_id: None,
            ticket_number: None,
            owner: "0xb1".to_string(),
        };
        let record = patch.merge(None);
        assert_eq!(record.event_id, "");
        assert_eq!(record.ticket_number, 0);
        assert_eq!(record.owner, "0xb1");
    }

    #[test]
    fn ticket_merge_owner_only_keeps_event_linkage() {
        let existing = TicketRecord {
            id: "0xt1".to_string(),
            event_id: "0xe1".to_string(),
            ticket_number: 4,
            owner: "0xr1".to_string(),
        };
        let patch = TicketPatch {
            id: "0xt1".to_string(),
            event_id: None,
            ticket_number: None,
            owner: "0xb1".to_string(),
        };
        let record = patch.merge(Some(existing));
        assert_eq!(record.event_id, "0xe1");
        assert_eq!(record.ticket_number, 4);
        assert_eq!(record.owner, "0xb1");
    }

    #[test]
    fn listing_merge_never_reactivates() {
        let closed = ResaleListingRecord {
            id: "0xl1".to_string(),
            ticket_id: "0xt1".to_string(),
            event_id: "0xe1".to_string(),
            seller: "0xs1".to_string(),
            price: 50,
            active: false,
        };
        // Redelivered "listed" notification after the listing already closed.
        let patch = ListingPatch {
            id: "0xl1".to_string(),
            ticket_id: Some("0xt1".to_string()),
            event_id: Some("0xe1".to_string()),
            seller: Some("0xs1".to_string()),
            price: Some(50),
            active: true,
        };
        assert!(!patch.merge(Some(closed)).active);
    }

    #[test]
    fn listing_merge_flip_inactive_preserves_fields() {
        let open = ResaleListingRecord {
            id: "0xl1".to_string(),
            ticket_id: "0xt1".to_string(),
            event_id: "0xe1".to_string(),
            seller: "0xs1".to_string(),
            price: 50,
            active: true,
        };
        let patch = ListingPatch {
            id: "0xl1".to_string(),
            ticket_id: None,
            event_id: None,
            seller: None,
            price: None,
            active: false,
        };
        let closed = patch.merge(Some(open));
        assert!(!closed.active);
        assert_eq!(closed.seller, "0xs1");
        assert_eq!(closed.price, 50);
    }
}
