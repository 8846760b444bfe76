//! Blocking GraphQL transport for subgraph endpoints.

use crate::paginator::PageSource;
use crate::queries::query_for;
use panel_core::config::FetchConfig;
use panel_core::{Error, Method, RawPage, Result, TimestampSecs, Venue};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::cell::Cell;
use std::time::Duration;
use tracing::debug;

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphResponse {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphError {
    pub message: String,
}

/// Extract the `data.<entity>` list from a response.
///
/// Any reported error, or a missing or non-list entity, is a transport error.
pub fn decode_page(response: GraphResponse, entity: &str) -> Result<RawPage> {
    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(Error::transport(format!("subgraph errors: {}", messages.join("; "))));
    }

    let mut data = response
        .data
        .ok_or_else(|| Error::transport("response without `data`"))?;

    let items = match data.remove(entity) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Error::transport(format!("`data.{entity}` is not a list"))),
        None => return Err(Error::transport(format!("response without `data.{entity}`"))),
    };

    let records = items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(Error::transport(format!("`{entity}` entry is not an object: {other}"))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawPage::new(records))
}

/// Page source backed by a subgraph endpoint, one client per (method, venue).
pub struct SubgraphClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    query: &'static str,
    entity: &'static str,
    page_size: usize,
    page_delay: Duration,
    requests: Cell<u64>,
}

impl SubgraphClient {
    /// Create a client for one (method, venue) pair.
    pub fn new(endpoint: impl Into<String>, method: Method, venue: Venue, fetch: &FetchConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            query: query_for(method, venue),
            entity: method.entity(),
            page_size: fetch.page_size,
            page_delay: Duration::from_millis(fetch.page_delay_ms),
            requests: Cell::new(0),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Number of requests sent so far.
    pub fn requests(&self) -> u64 {
        self.requests.get()
    }

    /// Request body for a cursor.
    pub fn request_body(&self, cursor: TimestampSecs) -> Value {
        json!({
            "query": self.query,
            "variables": {
                "start_timestamp_gt": cursor,
                "first": self.page_size,
            }
        })
    }
}

impl PageSource for SubgraphClient {
    fn fetch_page(&self, cursor: TimestampSecs) -> Result<RawPage> {
        if self.requests.get() > 0 && !self.page_delay.is_zero() {
            std::thread::sleep(self.page_delay);
        }
        self.requests.set(self.requests.get() + 1);

        debug!(endpoint = %self.endpoint, entity = self.entity, cursor, "requesting page");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&self.request_body(cursor))
            .send()
            .map_err(|e| Error::transport(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(format!("{} returned {status}", self.endpoint)));
        }

        let payload: GraphResponse = response
            .json()
            .map_err(|e| Error::transport(format!("{}: undecodable body: {e}", self.endpoint)))?;

        decode_page(payload, self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: Value) -> GraphResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_page() {
        let page = decode_page(
            response(json!({
                "data": {"swaps": [
                    {"id": "a", "timestamp": "10"},
                    {"id": "b", "timestamp": "20"}
                ]}
            })),
            "swaps",
        )
        .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.last_timestamp().unwrap(), Some(20));
    }

    #[test]
    fn test_decode_empty_list() {
        let page = decode_page(response(json!({"data": {"burns": []}})), "burns").unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_decode_errors_are_transport_errors() {
        let err = decode_page(
            response(json!({"errors": [{"message": "indexing_error"}]})),
            "swaps",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().contains("indexing_error"));

        let missing = decode_page(response(json!({"data": {"mints": []}})), "swaps");
        assert!(matches!(missing, Err(Error::Transport(_))));

        let not_list = decode_page(response(json!({"data": {"swaps": {}}})), "swaps");
        assert!(matches!(not_list, Err(Error::Transport(_))));

        let no_data = decode_page(response(json!({})), "swaps");
        assert!(matches!(no_data, Err(Error::Transport(_))));

        let bad_entry = decode_page(response(json!({"data": {"swaps": [1]}})), "swaps");
        assert!(matches!(bad_entry, Err(Error::Transport(_))));
    }

    #[test]
    fn test_request_body() {
        let fetch = FetchConfig {
            page_size: 500,
            ..FetchConfig::default()
        };
        let client = SubgraphClient::new("http://localhost:8000", Method::Mint, Venue::V3, &fetch).unwrap();
        let body = client.request_body(1651968000 - 1);

        assert_eq!(body["variables"]["start_timestamp_gt"], 1651967999);
        assert_eq!(body["variables"]["first"], 500);
        assert!(body["query"].as_str().unwrap().contains("mints("));
        assert_eq!(client.requests(), 0);
    }
}
