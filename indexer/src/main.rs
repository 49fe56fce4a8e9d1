//! dTickets indexer worker.
//!
//! Background process that polls the ledger for `dtickets` module events and
//! materializes the relational projection. No network surface of its own
//! beyond the Prometheus scrape endpoint; reads are served by a separate
//! query service against the same database.

use dtickets_indexer::{IndexerConfig, metrics, registry, run_tracker};
use dtickets_postgres::{PostgresCursorStore, PostgresProjectionStore};
use dtickets_sui::SuiLedgerClient;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dtickets_indexer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dTickets indexer");

    // Fatal-misconfiguration aborts here, before any loop starts.
    let config = IndexerConfig::from_env()?;
    info!(
        package_id = %config.package_id,
        rpc_url = %config.rpc_url,
        poll_interval = ?config.poll_interval,
        "Configuration loaded"
    );

    if let Err(e) = PrometheusBuilder::new().install() {
        // Metrics are best-effort; the pipeline runs without them.
        error!(error = %e, "Failed to install Prometheus exporter, continuing without metrics");
    }
    metrics::register_indexer_metrics();

    info!("Connecting to projection database...");
    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    let projections = Arc::new(PostgresProjectionStore::new(pool.clone()));
    projections.migrate().await?;
    let cursors = Arc::new(PostgresCursorStore::new(pool));
    info!("Projection database connected");

    let ledger = Arc::new(SuiLedgerClient::new(&config.rpc_url));

    let (shutdown_tx, _) = broadcast::channel(1);
    let mut handles = Vec::new();
    for tracker in registry(&config) {
        info!(tracker = %tracker.id, "Spawning tracker");
        let handle = tokio::spawn(run_tracker(
            tracker,
            ledger.clone(),
            projections.clone(),
            cursors.clone(),
            config.poll_interval,
            shutdown_tx.subscribe(),
        ));
        handles.push(handle);
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping trackers");
    // Receivers may already be gone if a task panicked; nothing to do then.
    let _ = shutdown_tx.send(());

    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "Tracker task failed");
        }
    }

    info!("dTickets indexer stopped");
    Ok(())
}
