//! Builders for raw ledger notifications.
//!
//! Each builder produces a [`RawLedgerEvent`] with the wire-format payload the
//! `dtickets` module emits (numeric fields as decimal strings, timestamps as
//! millisecond strings), so tests exercise the same decode path as production.

use dtickets_core::event::RawLedgerEvent;
use serde_json::json;

/// Default millisecond timestamps used by the event builder.
pub const START_TIME_MS: i64 = 1_735_689_600_000;
/// End of the default event window.
pub const END_TIME_MS: i64 = 1_735_776_000_000;

/// Build an `EventCreated` notification.
#[must_use]
pub fn event_created(
    prefix: &str,
    event_id: &str,
    venue: &str,
    ticket_price: u64,
    total_tickets: u32,
) -> RawLedgerEvent {
    RawLedgerEvent::new(
        format!("{prefix}::EventCreated"),
        json!({
            "event_id": event_id,
            "name": "RustConf",
            "venue": venue,
            "organizer": "0xorg",
            "img_url": "https://img.example/event.png",
            "start_time": START_TIME_MS.to_string(),
            "end_time": END_TIME_MS.to_string(),
            "ticket_price": ticket_price.to_string(),
            "total_tickets": total_tickets.to_string(),
        }),
    )
}

/// Build a `TicketPurchased` notification.
#[must_use]
pub fn ticket_purchased(
    prefix: &str,
    ticket_id: &str,
    event_id: &str,
    recipient: &str,
    ticket_number: u32,
) -> RawLedgerEvent {
    RawLedgerEvent::new(
        format!("{prefix}::TicketPurchased"),
        json!({
            "ticket_id": ticket_id,
            "event_id": event_id,
            "recipient": recipient,
            "ticket_number": ticket_number.to_string(),
        }),
    )
}

/// Build a `TicketListedForResale` notification.
#[must_use]
pub fn ticket_listed(
    prefix: &str,
    listing_id: &str,
    ticket_id: &str,
    event_id: &str,
    seller: &str,
    price: u64,
) -> RawLedgerEvent {
    RawLedgerEvent::new(
        format!("{prefix}::TicketListedForResale"),
        json!({
            "listing_id": listing_id,
            "ticket_id": ticket_id,
            "original_event_id": event_id,
            "seller": seller,
            "resale_price": price.to_string(),
        }),
    )
}

/// Build a `ResaleCancelled` notification.
#[must_use]
pub fn resale_cancelled(prefix: &str, listing_id: &str, ticket_id: &str) -> RawLedgerEvent {
    RawLedgerEvent::new(
        format!("{prefix}::ResaleCancelled"),
        json!({
            "listing_id": listing_id,
            "ticket_id": ticket_id,
        }),
    )
}

/// Build a `TicketResold` notification.
#[must_use]
pub fn ticket_resold(
    prefix: &str,
    listing_id: &str,
    ticket_id: &str,
    buyer: &str,
) -> RawLedgerEvent {
    RawLedgerEvent::new(
        format!("{prefix}::TicketResold"),
        json!({
            "listing_id": listing_id,
            "ticket_id": ticket_id,
            "buyer": buyer,
        }),
    )
}

/// Build a notification with a suffix this pipeline does not understand.
#[must_use]
pub fn unrecognized(prefix: &str) -> RawLedgerEvent {
    RawLedgerEvent::new(
        format!("{prefix}::EventSoldOut"),
        json!({ "event_id": "0xe1" }),
    )
}
