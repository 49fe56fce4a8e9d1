//! # dTickets Postgres
//!
//! `PostgreSQL` implementations of the indexer's storage boundaries:
//!
//! - [`PostgresProjectionStore`]: the three record tables with
//!   upsert-merge writes (`ON CONFLICT ... DO UPDATE`, `COALESCE` for
//!   partial patches) and the `COUNT(*)` query behind tickets-sold
//! - [`PostgresCursorStore`]: one durable cursor row per tracked source
//!
//! The merge SQL mirrors the patch `merge` functions in `dtickets_core`
//! exactly; the in-memory test doubles and this store must be
//! interchangeable without changing projection semantics.
//!
//! # Schema
//!
//! See `migrations/0001_projection_tables.sql`. Ticket prices are stored as
//! `BIGINT` (u64 MIST values wrap at 2^63, i.e. ~9.2 billion SUI, far above
//! the total supply), capacities and counters as `INT`.

use dtickets_core::error::{IndexerError, Result};
use dtickets_core::ledger::EventCursor;
use dtickets_core::record::{
    EventPatch, EventRecord, ListingPatch, ResaleListingRecord, TicketPatch, TicketRecord,
};
use dtickets_core::store::{CursorStore, ProjectionStore};
use sqlx::postgres::PgPool;

fn storage_err(context: &str, e: &sqlx::Error) -> IndexerError {
    IndexerError::Storage(format!("{context}: {e}"))
}

/// Postgres-backed projection store.
#[derive(Debug, Clone)]
pub struct PostgresProjectionStore {
    pool: PgPool,
}

impl PostgresProjectionStore {
    /// Create a store using an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations, creating the projection and cursor tables if
    /// they don't already exist.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Storage`] if migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| IndexerError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ProjectionStore for PostgresProjectionStore {
    async fn merge_event(&self, patch: &EventPatch) -> Result<()> {
        // description and tickets_sold are never part of the patch: the
        // former is defaulted on insert, the latter is derived.
        #[allow(clippy::cast_possible_wrap)] // MIST prices stay far below 2^63
        sqlx::query(
            "INSERT INTO events
                 (id, name, venue, organizer, img_url, start_time, end_time,
                  ticket_price, total_tickets)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 venue = EXCLUDED.venue,
                 organizer = EXCLUDED.organizer,
                 img_url = EXCLUDED.img_url,
                 start_time = EXCLUDED.start_time,
                 end_time = EXCLUDED.end_time,
                 ticket_price = EXCLUDED.ticket_price,
                 total_tickets = EXCLUDED.total_tickets,
                 updated_at = now()",
        )
        .bind(&patch.id)
        .bind(&patch.name)
        .bind(&patch.venue)
        .bind(&patch.organizer)
        .bind(&patch.img_url)
        .bind(patch.start_time)
        .bind(patch.end_time)
        .bind(patch.ticket_price as i64)
        .bind(i32::try_from(patch.total_tickets).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to merge event", &e))?;

        Ok(())
    }

    async fn merge_ticket(&self, patch: &TicketPatch) -> Result<()> {
        let ticket_number = patch
            .ticket_number
            .map(|n| i32::try_from(n).unwrap_or(i32::MAX));

        sqlx::query(
            "INSERT INTO tickets (id, event_id, ticket_number, owner)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, 0), $4)
             ON CONFLICT (id) DO UPDATE SET
                 event_id = COALESCE($2, tickets.event_id),
                 ticket_number = COALESCE($3, tickets.ticket_number),
                 owner = EXCLUDED.owner,
                 updated_at = now()",
        )
        .bind(&patch.id)
        .bind(patch.event_id.as_deref())
        .bind(ticket_number)
        .bind(&patch.owner)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to merge ticket", &e))?;

        Ok(())
    }

    async fn merge_listing(&self, patch: &ListingPatch) -> Result<()> {
        // `active AND $6` enforces that a closed listing never reopens, the
        // same rule as ListingPatch::merge.
        #[allow(clippy::cast_possible_wrap)] // MIST prices stay far below 2^63
        sqlx::query(
            "INSERT INTO resale_listings (id, ticket_id, event_id, seller, price, active)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, ''),
                     COALESCE($5, 0), $6)
             ON CONFLICT (id) DO UPDATE SET
                 ticket_id = COALESCE($2, resale_listings.ticket_id),
                 event_id = COALESCE($3, resale_listings.event_id),
                 seller = COALESCE($4, resale_listings.seller),
                 price = COALESCE($5, resale_listings.price),
                 active = resale_listings.active AND $6,
                 updated_at = now()",
        )
        .bind(&patch.id)
        .bind(patch.ticket_id.as_deref())
        .bind(patch.event_id.as_deref())
        .bind(patch.seller.as_deref())
        .bind(patch.price.map(|p| p as i64))
        .bind(patch.active)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to merge listing", &e))?;

        Ok(())
    }

    async fn get_event(&self, id: &str) -> Result<Option<EventRecord>> {
        type EventRow = (
            String,
            String,
            String,
            String,
            String,
            String,
            chrono::DateTime<chrono::Utc>,
            chrono::DateTime<chrono::Utc>,
            i64,
            i32,
            i32,
        );

        let row: Option<EventRow> = sqlx::query_as(
            "SELECT id, name, description, venue, organizer, img_url,
                    start_time, end_time, ticket_price, total_tickets, tickets_sold
             FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to get event", &e))?;

        #[allow(clippy::cast_sign_loss)] // Written as non-negative by this store
        Ok(row.map(
            |(
                id,
                name,
                description,
                venue,
                organizer,
                img_url,
                start_time,
                end_time,
                ticket_price,
                total_tickets,
                tickets_sold,
            )| EventRecord {
                id,
                name,
                description,
                venue,
                organizer,
                img_url,
                start_time,
                end_time,
                ticket_price: ticket_price as u64,
                total_tickets: total_tickets as u32,
                tickets_sold: tickets_sold as u32,
            },
        ))
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<TicketRecord>> {
        let row: Option<(String, String, i32, String)> = sqlx::query_as(
            "SELECT id, event_id, ticket_number, owner FROM tickets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to get ticket", &e))?;

        #[allow(clippy::cast_sign_loss)] // Written as non-negative by this store
        Ok(row.map(|(id, event_id, ticket_number, owner)| TicketRecord {
            id,
            event_id,
            ticket_number: ticket_number as u32,
            owner,
        }))
    }

    async fn get_listing(&self, id: &str) -> Result<Option<ResaleListingRecord>> {
        let row: Option<(String, String, String, String, i64, bool)> = sqlx::query_as(
            "SELECT id, ticket_id, event_id, seller, price, active
             FROM resale_listings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to get listing", &e))?;

        #[allow(clippy::cast_sign_loss)] // Written as non-negative by this store
        Ok(
            row.map(|(id, ticket_id, event_id, seller, price, active)| ResaleListingRecord {
                id,
                ticket_id,
                event_id,
                seller,
                price: price as u64,
                active,
            }),
        )
    }

    async fn count_tickets(&self, event_id: &str) -> Result<u32> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| storage_err("Failed to count tickets", &e))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn set_tickets_sold(&self, event_id: &str, tickets_sold: u32) -> Result<()> {
        // Deliberately an UPDATE: if the event's creation notification is
        // still in a later page, the next ticket write triggers a recount.
        sqlx::query(
            "UPDATE events SET tickets_sold = $2, updated_at = now() WHERE id = $1",
        )
        .bind(event_id)
        .bind(i32::try_from(tickets_sold).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to set tickets_sold", &e))?;

        Ok(())
    }
}

/// Postgres-backed cursor store.
#[derive(Debug, Clone)]
pub struct PostgresCursorStore {
    pool: PgPool,
}

impl PostgresCursorStore {
    /// Create a store using an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CursorStore for PostgresCursorStore {
    async fn load(&self, tracker_id: &str) -> Result<Option<EventCursor>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT tx_digest, event_seq FROM cursors WHERE id = $1")
                .bind(tracker_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_err("Failed to load cursor", &e))?;

        Ok(row.map(|(tx_digest, event_seq)| EventCursor::new(tx_digest, event_seq)))
    }

    async fn save(&self, tracker_id: &str, cursor: &EventCursor) -> Result<()> {
        sqlx::query(
            "INSERT INTO cursors (id, tx_digest, event_seq)
             VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET
                 tx_digest = EXCLUDED.tx_digest,
                 event_seq = EXCLUDED.event_seq,
                 updated_at = now()",
        )
        .bind(tracker_id)
        .bind(&cursor.tx_digest)
        .bind(&cursor.event_seq)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to save cursor", &e))?;

        Ok(())
    }

    async fn delete(&self, tracker_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM cursors WHERE id = $1")
            .bind(tracker_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_err("Failed to delete cursor", &e))?;

        Ok(())
    }
}
