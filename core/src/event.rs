//! Ledger event decoding.
//!
//! The ledger delivers notifications as a fully-qualified type string
//! (`{package}::{module}::{Variant}`) plus a JSON payload. This module decodes
//! them into a tagged union over the five variants the pipeline understands,
//! with an explicit [`LedgerEvent::Unrecognized`] case for forward
//! compatibility: future event families added upstream must not break an
//! already-deployed indexer.
//!
//! Numeric fields arrive as decimal strings (Move `u64` values are serialized
//! as strings in event JSON) and timestamps as millisecond strings; the
//! `wire` deserializers below convert them at the decode boundary so the rest
//! of the pipeline works with proper types.

use crate::error::IndexerError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A raw notification as delivered by the ledger: type tag plus JSON payload.
#[derive(Debug, Clone)]
pub struct RawLedgerEvent {
    /// Fully-qualified event type, e.g. `0xabc::dtickets::EventCreated`.
    pub event_type: String,
    /// Parsed JSON payload of the Move event.
    pub payload: serde_json::Value,
}

impl RawLedgerEvent {
    /// Create a raw event from a type string and payload.
    #[must_use]
    pub const fn new(event_type: String, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Payload of an `EventCreated` notification.
///
/// Fields are idempotent snapshots of the event object, not deltas; a repeated
/// delivery for the same id is a correction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventCreated {
    /// Ledger-assigned event object id.
    pub event_id: String,
    /// Event name.
    pub name: String,
    /// Venue name.
    pub venue: String,
    /// Organizer principal address.
    pub organizer: String,
    /// Image reference.
    pub img_url: String,
    /// Event start, milliseconds since the Unix epoch on the wire.
    #[serde(deserialize_with = "wire::datetime_from_ms")]
    pub start_time: DateTime<Utc>,
    /// Event end, milliseconds since the Unix epoch on the wire.
    #[serde(deserialize_with = "wire::datetime_from_ms")]
    pub end_time: DateTime<Utc>,
    /// Unit ticket price in MIST.
    #[serde(deserialize_with = "wire::u64_from_dec")]
    pub ticket_price: u64,
    /// Total ticket capacity.
    #[serde(deserialize_with = "wire::u32_from_dec")]
    pub total_tickets: u32,
}

/// Payload of a `TicketPurchased` notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketPurchased {
    /// Ledger-assigned ticket object id.
    pub ticket_id: String,
    /// Owning event id.
    pub event_id: String,
    /// Principal the ticket was issued to.
    pub recipient: String,
    /// Sequence number within the event.
    #[serde(deserialize_with = "wire::u32_from_dec")]
    pub ticket_number: u32,
}

/// Payload of a `TicketListedForResale` notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketListedForResale {
    /// Ledger-assigned listing object id.
    pub listing_id: String,
    /// The ticket being offered.
    pub ticket_id: String,
    /// The event the ticket belongs to.
    pub original_event_id: String,
    /// Seller principal address.
    pub seller: String,
    /// Asking price in MIST.
    #[serde(deserialize_with = "wire::u64_from_dec")]
    pub resale_price: u64,
}

/// Payload of a `ResaleCancelled` notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResaleCancelled {
    /// The listing being withdrawn.
    pub listing_id: String,
    /// The ticket that was offered.
    pub ticket_id: String,
}

/// Payload of a `TicketResold` notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketResold {
    /// The listing that completed.
    pub listing_id: String,
    /// The ticket that changed hands.
    pub ticket_id: String,
    /// New owner principal address.
    pub buyer: String,
}

/// A decoded ledger notification.
///
/// Decoding dispatches on the exact type-string suffix: the five known
/// variants map to their payload structs, anything else is `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// An event was created (or corrected) on the ledger.
    EventCreated(EventCreated),
    /// A ticket was issued for an event.
    TicketPurchased(TicketPurchased),
    /// A ticket was listed on the resale market.
    TicketListedForResale(TicketListedForResale),
    /// A resale listing was withdrawn by its seller.
    ResaleCancelled(ResaleCancelled),
    /// A resale listing completed and the ticket changed hands.
    TicketResold(TicketResold),
    /// An event family this pipeline does not (yet) understand.
    ///
    /// Skipped by the reconciler, by design.
    Unrecognized,
}

impl LedgerEvent {
    /// Decode a raw notification by suffix match on its type string.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Decode`] if the suffix names a known variant
    /// but the payload does not deserialize. A malformed known event means
    /// the page cannot be trusted, so the caller fails the whole batch.
    pub fn decode(raw: &RawLedgerEvent) -> Result<Self, IndexerError> {
        fn payload<T: for<'de> Deserialize<'de>>(
            raw: &RawLedgerEvent,
        ) -> Result<T, IndexerError> {
            serde_json::from_value(raw.payload.clone()).map_err(|e| {
                IndexerError::Decode(format!("{}: {e}", raw.event_type))
            })
        }

        let event = if raw.event_type.ends_with("::EventCreated") {
            Self::EventCreated(payload(raw)?)
        } else if raw.event_type.ends_with("::TicketPurchased") {
            Self::TicketPurchased(payload(raw)?)
        } else if raw.event_type.ends_with("::TicketListedForResale") {
            Self::TicketListedForResale(payload(raw)?)
        } else if raw.event_type.ends_with("::ResaleCancelled") {
            Self::ResaleCancelled(payload(raw)?)
        } else if raw.event_type.ends_with("::TicketResold") {
            Self::TicketResold(payload(raw)?)
        } else {
            Self::Unrecognized
        };

        Ok(event)
    }
}

mod wire {
    //! Deserializers for the ledger's string-encoded scalar fields.

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn u64_from_dec<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| D::Error::custom(format!("invalid u64 '{s}': {e}")))
    }

    pub fn u32_from_dec<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| D::Error::custom(format!("invalid u32 '{s}': {e}")))
    }

    pub fn datetime_from_ms<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let millis: i64 = s
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{s}': {e}")))?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| D::Error::custom(format!("timestamp '{s}' out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(event_type: &str, payload: serde_json::Value) -> RawLedgerEvent {
        RawLedgerEvent::new(event_type.to_string(), payload)
    }

    #[test]
    fn decodes_event_created() {
        let event = LedgerEvent::decode(&raw(
            "0xabc::dtickets::EventCreated",
            json!({
                "event_id": "0xe1",
                "name": "RustConf",
                "venue": "Portland",
                "organizer": "0xorg",
                "img_url": "https://img.example/e1.png",
                "start_time": "1735689600000",
                "end_time": "1735776000000",
                "ticket_price": "100",
                "total_tickets": "10"
            }),
        ));

        match event {
            Ok(LedgerEvent::EventCreated(payload)) => {
                assert_eq!(payload.event_id, "0xe1");
                assert_eq!(payload.ticket_price, 100);
                assert_eq!(payload.total_tickets, 10);
                assert_eq!(payload.start_time.timestamp_millis(), 1_735_689_600_000);
            }
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    #[test]
    fn decodes_ticket_purchased() {
        let event = LedgerEvent::decode(&raw(
            "0xabc::dtickets::TicketPurchased",
            json!({
                "ticket_id": "0xt1",
                "event_id": "0xe1",
                "recipient": "0xr1",
                "ticket_number": "3"
            }),
        ));

        match event {
            Ok(LedgerEvent::TicketPurchased(payload)) => {
                assert_eq!(payload.ticket_number, 3);
                assert_eq!(payload.recipient, "0xr1");
            }
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    #[test]
    fn decodes_resale_variants() {
        let listed = LedgerEvent::decode(&raw(
            "0xabc::dtickets::TicketListedForResale",
            json!({
                "listing_id": "0xl1",
                "ticket_id": "0xt1",
                "original_event_id": "0xe1",
                "seller": "0xs1",
                "resale_price": "50"
            }),
        ));
        assert!(matches!(listed, Ok(LedgerEvent::TicketListedForResale(_))));

        let cancelled = LedgerEvent::decode(&raw(
            "0xabc::dtickets::ResaleCancelled",
            json!({ "listing_id": "0xl1", "ticket_id": "0xt1" }),
        ));
        assert!(matches!(cancelled, Ok(LedgerEvent::ResaleCancelled(_))));

        let resold = LedgerEvent::decode(&raw(
            "0xabc::dtickets::TicketResold",
            json!({ "listing_id": "0xl1", "ticket_id": "0xt1", "buyer": "0xb1" }),
        ));
        assert!(matches!(resold, Ok(LedgerEvent::TicketResold(_))));
    }

    #[test]
    fn unknown_suffix_is_unrecognized_not_error() {
        let event = LedgerEvent::decode(&raw(
            "0xabc::dtickets::EventSoldOut",
            json!({ "event_id": "0xe1" }),
        ));
        assert_eq!(event.ok(), Some(LedgerEvent::Unrecognized));
    }

    #[test]
    fn malformed_known_payload_is_decode_error() {
        let event = LedgerEvent::decode(&raw(
            "0xabc::dtickets::TicketPurchased",
            json!({ "ticket_id": "0xt1" }),
        ));
        assert!(matches!(event, Err(IndexerError::Decode(_))));
    }

    #[test]
    fn non_numeric_wire_field_is_decode_error() {
        let event = LedgerEvent::decode(&raw(
            "0xabc::dtickets::TicketPurchased",
            json!({
                "ticket_id": "0xt1",
                "event_id": "0xe1",
                "recipient": "0xr1",
                "ticket_number": "three"
            }),
        ));
        assert!(matches!(event, Err(IndexerError::Decode(_))));
    }
}
