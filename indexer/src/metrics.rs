//! Pipeline metrics.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `indexer_pages_fetched_total{tracker}` - Pages fetched per tracker
//! - `indexer_events_fetched_total{tracker}` - Notifications fetched per tracker
//! - `indexer_cycles_failed_total{tracker}` - Failed poll cycles per tracker
//! - `indexer_writes_applied_total{kind}` - Pending writes applied, by record kind

use metrics::{counter, describe_counter};

/// Register metric descriptions. Call once at startup, before any cycle runs.
pub fn register_indexer_metrics() {
    describe_counter!(
        "indexer_pages_fetched_total",
        "Total pages fetched from the ledger, per tracker"
    );
    describe_counter!(
        "indexer_events_fetched_total",
        "Total notifications fetched from the ledger, per tracker"
    );
    describe_counter!(
        "indexer_cycles_failed_total",
        "Total poll cycles that failed and were retried, per tracker"
    );
    describe_counter!(
        "indexer_writes_applied_total",
        "Total pending writes applied to the projection store, by record kind"
    );

    tracing::info!("Indexer metrics registered");
}

/// Record a fetched page and its item count.
pub fn record_page_fetched(tracker: &str, items: usize) {
    counter!("indexer_pages_fetched_total", "tracker" => tracker.to_string()).increment(1);
    counter!("indexer_events_fetched_total", "tracker" => tracker.to_string())
        .increment(items as u64);
}

/// Record a failed cycle.
pub fn record_cycle_failed(tracker: &str) {
    counter!("indexer_cycles_failed_total", "tracker" => tracker.to_string()).increment(1);
}

/// Record one batch's applied writes.
pub fn record_writes_applied(events: usize, tickets: usize, listings: usize) {
    counter!("indexer_writes_applied_total", "kind" => "event").increment(events as u64);
    counter!("indexer_writes_applied_total", "kind" => "ticket").increment(tickets as u64);
    counter!("indexer_writes_applied_total", "kind" => "listing").increment(listings as u64);
}
