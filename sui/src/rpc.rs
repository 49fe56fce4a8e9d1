//! Wire types for the `suix_queryEvents` JSON-RPC method.
//!
//! Only the fields the indexer consumes are modelled; everything else in the
//! node's response (`sender`, `bcs`, `timestampMs`, ...) is ignored by serde.

use dtickets_core::ledger::EventCursor;
use serde::{Deserialize, Serialize};

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: serde_json::Value,
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// `MoveEventModule` event query.
#[derive(Debug, Serialize)]
pub struct EventQuery {
    #[serde(rename = "MoveEventModule")]
    pub move_event_module: MoveEventModule,
}

/// Package/module pair the node filters events by.
#[derive(Debug, Serialize)]
pub struct MoveEventModule {
    pub package: String,
    pub module: String,
}

/// Event id, doubling as the page cursor token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    pub event_seq: String,
}

impl From<EventId> for EventCursor {
    fn from(id: EventId) -> Self {
        Self::new(id.tx_digest, id.event_seq)
    }
}

impl From<&EventCursor> for EventId {
    fn from(cursor: &EventCursor) -> Self {
        Self {
            tx_digest: cursor.tx_digest.clone(),
            event_seq: cursor.event_seq.clone(),
        }
    }
}

/// One event as returned by the node.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: serde_json::Value,
}

/// Result payload of `suix_queryEvents`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEventsResult {
    pub data: Vec<SuiEvent>,
    pub next_cursor: Option<EventId>,
    pub has_next_page: bool,
}
