//! Sui fullnode client implementation.

use crate::error::SuiClientError;
use crate::rpc::{
    EventId, EventQuery, MoveEventModule, QueryEventsResult, RpcRequest, RpcResponse,
};
use dtickets_core::error::Result;
use dtickets_core::event::RawLedgerEvent;
use dtickets_core::ledger::{EventCursor, EventFilter, EventPage, LedgerClient};
use reqwest::{Client, StatusCode};
use serde_json::json;

/// [`LedgerClient`] backed by a Sui fullnode's `suix_queryEvents` method.
///
/// Queries events in ascending order, filtered by `MoveEventModule`, one page
/// per call. Page size is whatever the node's own limit is; passing `null`
/// for the limit keeps that an external constraint.
#[derive(Debug, Clone)]
pub struct SuiLedgerClient {
    client: Client,
    rpc_url: String,
}

impl SuiLedgerClient {
    /// Create a client for a fullnode RPC endpoint.
    #[must_use]
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            rpc_url: rpc_url.into(),
        }
    }

    /// The endpoint this client queries.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<&EventCursor>,
    ) -> std::result::Result<QueryEventsResult, SuiClientError> {
        let query = EventQuery {
            move_event_module: MoveEventModule {
                package: filter.package.clone(),
                module: filter.module.clone(),
            },
        };

        // params: [query, cursor, limit, descending_order]
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "suix_queryEvents",
            params: json!([query, cursor.map(EventId::from), null, false]),
        };

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SuiClientError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let envelope: RpcResponse<QueryEventsResult> = response
                    .json()
                    .await
                    .map_err(|e| SuiClientError::ResponseParseFailed(e.to_string()))?;

                if let Some(error) = envelope.error {
                    return Err(SuiClientError::Rpc {
                        code: error.code,
                        message: error.message,
                    });
                }

                envelope.result.ok_or_else(|| {
                    SuiClientError::ResponseParseFailed(
                        "response carried neither result nor error".to_string(),
                    )
                })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SuiClientError::HttpStatus {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

impl LedgerClient for SuiLedgerClient {
    async fn fetch_page(
        &self,
        filter: &EventFilter,
        cursor: Option<&EventCursor>,
    ) -> Result<EventPage> {
        let result = self.query_events(filter, cursor).await?;

        tracing::debug!(
            package = %filter.package,
            module = %filter.module,
            fetched = result.data.len(),
            has_next_page = result.has_next_page,
            "queryEvents page"
        );

        Ok(EventPage {
            items: result
                .data
                .into_iter()
                .map(|event| RawLedgerEvent::new(event.event_type, event.parsed_json))
                .collect(),
            next_cursor: result.next_cursor.map(EventCursor::from),
            has_more: result.has_next_page,
        })
    }
}
