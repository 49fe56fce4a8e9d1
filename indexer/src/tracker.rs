//! Tracker registry.
//!
//! The sole extension point for adding new event families: each entry maps a
//! tracked module to its event filter and reconciliation function, and each
//! spawns its own independent poll loop. The set is fixed at startup; there
//! is no dynamic registration.

use crate::config::IndexerConfig;
use crate::reconcile::{PendingWrites, reconcile_page};
use dtickets_core::error::Result;
use dtickets_core::event::RawLedgerEvent;
use dtickets_core::ledger::EventFilter;

/// Reconciliation function for one event family: ordered page in, pending
/// writes out. Pure; persistence stays with the poll loop.
pub type ReconcilerFn = fn(&[RawLedgerEvent], &str) -> Result<PendingWrites>;

/// One tracked source: a module to poll and how to fold its events.
#[derive(Debug, Clone)]
pub struct EventTracker {
    /// Tracker identifier, also the cursor key. Format `{package}::{module}`.
    pub id: String,
    /// Filter handed to the ledger client.
    pub filter: EventFilter,
    /// Fold for this module's event family.
    pub reconciler: ReconcilerFn,
}

/// Build the static tracker set for a configuration.
///
/// Currently a single entry for the `dtickets` module. Adding an event family
/// means adding an entry here with its own filter and reconciler.
#[must_use]
pub fn registry(config: &IndexerConfig) -> Vec<EventTracker> {
    let filter = EventFilter::new(config.package_id.clone(), config.module.clone());
    vec![EventTracker {
        id: filter.type_prefix(),
        filter,
        reconciler: reconcile_page,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn registry_builds_one_dtickets_tracker() {
        let config = IndexerConfig {
            package_id: "0xabc".to_string(),
            module: "dtickets".to_string(),
            rpc_url: "http://localhost:9000".to_string(),
            database_url: String::new(),
            poll_interval: Duration::from_secs(1),
        };

        let trackers = registry(&config);
        assert_eq!(trackers.len(), 1);
        assert_eq!(trackers[0].id, "0xabc::dtickets");
        assert_eq!(trackers[0].filter.type_prefix(), "0xabc::dtickets");
    }
}
