//! Scripted ledger client.

use dtickets_core::error::{IndexerError, Result};
use dtickets_core::ledger::{EventCursor, EventFilter, EventPage, LedgerClient};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted fetch outcome.
type ScriptedFetch = std::result::Result<EventPage, String>;

/// A ledger client that replays pre-canned pages in order.
///
/// Each `fetch_page` call pops the next scripted outcome regardless of the
/// cursor passed in; once the script is exhausted, every further call returns
/// an empty page (the "caught up" steady state). `Err` entries simulate
/// transport failures.
///
/// # Example
///
/// ```
/// use dtickets_testing::ScriptedLedgerClient;
/// use dtickets_core::ledger::{EventCursor, EventPage};
///
/// let ledger = ScriptedLedgerClient::new(vec![
///     Ok(EventPage {
///         items: vec![],
///         next_cursor: Some(EventCursor::new("digest-1", "0")),
///         has_more: false,
///     }),
///     Err("connection reset".to_string()),
/// ]);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedLedgerClient {
    pages: Mutex<VecDeque<ScriptedFetch>>,
    fetch_count: Mutex<u64>,
}

impl ScriptedLedgerClient {
    /// Create a client that will serve the given outcomes in order.
    #[must_use]
    pub fn new(pages: Vec<ScriptedFetch>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            fetch_count: Mutex::new(0),
        }
    }

    /// Append another scripted outcome.
    pub fn push(&self, page: ScriptedFetch) {
        self.pages.lock().unwrap().push_back(page);
    }

    /// How many fetches have been served so far.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        *self.fetch_count.lock().unwrap()
    }
}

impl LedgerClient for ScriptedLedgerClient {
    async fn fetch_page(
        &self,
        _filter: &EventFilter,
        _cursor: Option<&EventCursor>,
    ) -> Result<EventPage> {
        *self.fetch_count.lock().unwrap() += 1;
        match self.pages.lock().unwrap().pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(IndexerError::Ledger(message)),
            None => Ok(EventPage::empty()),
        }
    }
}
