//! The per-tracker poll loop.
//!
//! Drives one tracked source through repeated fetch→reconcile→persist cycles
//! indefinitely. The running cursor is an explicit value threaded through each
//! cycle, never shared state: each tracker's loop owns exactly one cursor
//! variable in its own call stack.
//!
//! A cycle is an atomic unit: it either fully completes (writes applied,
//! counters recomputed, cursor advanced) or fully fails and retries from the
//! same cursor after the standard delay. "Caught up" is simply "last fetch
//! returned an empty page": a steady state, not an exit condition. The loop
//! has no terminal state short of process shutdown, which is delivered as a
//! broadcast signal at the scheduling boundary.

use crate::metrics;
use crate::tracker::EventTracker;
use dtickets_core::error::Result;
use dtickets_core::ledger::{EventCursor, LedgerClient};
use dtickets_core::store::{CursorStore, ProjectionStore};
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Scheduling decision of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Cursor to use for the next cycle. Unchanged if the cycle failed or the
    /// page was empty.
    pub cursor: Option<EventCursor>,
    /// Whether the next cycle should run immediately (more data is likely
    /// available) instead of after the polling interval.
    pub has_more: bool,
}

/// Run one fetch→reconcile→persist cycle for a tracker.
///
/// Failures are contained here: any error during fetch, reconciliation, or
/// persistence is logged and mapped to "same cursor, no more pages", so the
/// next cycle retries from the same position after the standard delay. A
/// failing cycle never tears down the loop, and never leaves the cursor
/// partially advanced.
pub async fn execute_cycle<L, P, C>(
    tracker: &EventTracker,
    ledger: &L,
    projections: &P,
    cursors: &C,
    cursor: Option<EventCursor>,
) -> CycleOutcome
where
    L: LedgerClient,
    P: ProjectionStore,
    C: CursorStore,
{
    match try_cycle(tracker, ledger, projections, cursors, cursor.as_ref()).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => CycleOutcome {
            cursor,
            has_more: false,
        },
        Err(e) => {
            error!(tracker = %tracker.id, error = %e, "Poll cycle failed, will retry from same cursor");
            metrics::record_cycle_failed(&tracker.id);
            CycleOutcome {
                cursor,
                has_more: false,
            }
        }
    }
}

/// The fallible body of a cycle.
///
/// Returns `Ok(Some(outcome))` when the page was non-empty and fully
/// persisted (cursor advanced), `Ok(None)` when the page was empty or the
/// ledger supplied no boundary token (cursor kept).
async fn try_cycle<L, P, C>(
    tracker: &EventTracker,
    ledger: &L,
    projections: &P,
    cursors: &C,
    cursor: Option<&EventCursor>,
) -> Result<Option<CycleOutcome>>
where
    L: LedgerClient,
    P: ProjectionStore,
    C: CursorStore,
{
    let page = ledger.fetch_page(&tracker.filter, cursor).await?;
    info!(
        tracker = %tracker.id,
        fetched = page.items.len(),
        has_more = page.has_more,
        "Fetched events"
    );
    metrics::record_page_fetched(&tracker.id, page.items.len());

    if page.items.is_empty() {
        return Ok(None);
    }

    let writes = (tracker.reconciler)(&page.items, &tracker.filter.type_prefix())?;
    apply_writes(projections, &writes).await?;

    // The cursor moves only after the whole page is persisted.
    let Some(next_cursor) = page.next_cursor else {
        return Ok(None);
    };
    cursors.save(&tracker.id, &next_cursor).await?;

    Ok(Some(CycleOutcome {
        cursor: Some(next_cursor),
        has_more: page.has_more,
    }))
}

/// Apply one batch's pending writes to the projection store, then recompute
/// tickets-sold for every event a ticket write referenced.
///
/// The counter is a fresh count query, not an increment; that is what makes
/// it self-correcting regardless of processing order or duplicate delivery.
async fn apply_writes<P>(projections: &P, writes: &crate::reconcile::PendingWrites) -> Result<()>
where
    P: ProjectionStore,
{
    try_join_all(writes.events.values().map(|p| projections.merge_event(p))).await?;
    try_join_all(writes.tickets.values().map(|p| projections.merge_ticket(p))).await?;
    try_join_all(
        writes
            .listings
            .values()
            .map(|p| projections.merge_listing(p)),
    )
    .await?;

    for event_id in writes.touched_event_ids() {
        let sold = projections.count_tickets(&event_id).await?;
        projections.set_tickets_sold(&event_id, sold).await?;
    }

    metrics::record_writes_applied(
        writes.events.len(),
        writes.tickets.len(),
        writes.listings.len(),
    );
    Ok(())
}

/// Run a tracker's poll loop until shutdown.
///
/// Cycles are strictly sequential within a tracker; there is never more than
/// one in-flight fetch/reconcile/persist sequence per source. After a
/// successful non-empty page the next cycle runs with zero delay; otherwise it
/// waits out the polling interval. Suspension happens only at this scheduling
/// boundary, which is also the only point the shutdown signal is observed, so
/// stopping never aborts an in-flight cycle.
pub async fn run_tracker<L, P, C>(
    tracker: EventTracker,
    ledger: Arc<L>,
    projections: Arc<P>,
    cursors: Arc<C>,
    poll_interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) where
    L: LedgerClient,
    P: ProjectionStore,
    C: CursorStore,
{
    // Read once at loop start; afterwards the cursor lives in this stack.
    let mut cursor = match cursors.load(&tracker.id).await {
        Ok(cursor) => cursor,
        Err(e) => {
            // Treated like any transient storage failure: start from the
            // beginning and let idempotent reconciliation absorb the replay.
            warn!(tracker = %tracker.id, error = %e, "Failed to load cursor, starting from beginning");
            None
        }
    };

    match &cursor {
        Some(c) => info!(tracker = %tracker.id, tx_digest = %c.tx_digest, event_seq = %c.event_seq, "Resuming from cursor"),
        None => info!(tracker = %tracker.id, "Starting from beginning"),
    }

    loop {
        let outcome = execute_cycle(
            &tracker,
            ledger.as_ref(),
            projections.as_ref(),
            cursors.as_ref(),
            cursor,
        )
        .await;
        cursor = outcome.cursor;

        let delay = if outcome.has_more {
            Duration::ZERO
        } else {
            poll_interval
        };

        tokio::select! {
            _ = shutdown.recv() => {
                info!(tracker = %tracker.id, "Tracker received shutdown signal");
                break;
            }
            () = tokio::time::sleep(delay) => {}
        }
    }

    info!(tracker = %tracker.id, "Tracker stopped");
}
