//! Soroban RPC client: polls `getEvents` and decodes supply chain events.
//!
//! Events are requested with `xdrFormat: "json"`, so topics and data arrive as
//! ScVal JSON (`{"symbol":"sold"}`, `{"u64":"42"}`, `{"map":[...]}`) in the
//! `topicJson` / `valueJson` fields instead of base64 XDR.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, LedgerEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Invalid request / unknown method: retrying will not help.
    fn is_fatal(&self) -> bool {
        matches!(self.code, -32600 | -32601)
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Unique event id, stable across re-polls.
    pub id: String,
    /// Topic list as ScVal JSON.
    #[serde(rename = "topicJson", default)]
    pub topic: Vec<Value>,
    /// Event data as ScVal JSON.
    #[serde(rename = "valueJson", default)]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

#[derive(Debug)]
pub struct EventsPage {
    pub events: Vec<RawEvent>,
    /// Opaque cursor to continue paginating from, if any.
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// Where the next `getEvents` call should start.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub start_ledger: u32,
    pub cursor: Option<&'a str>,
    pub limit: u32,
}

/// Doubling delay, capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of contract events from the RPC, retrying transient failures.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    page: PageRequest<'_>,
) -> Result<EventsPage> {
    let mut backoff = Backoff::new();
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, page),
    });

    loop {
        let resp = match client.post(rpc_url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(retry_in = backoff.secs, "RPC request failed: {e}");
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(retry_in = backoff.secs, "Rate-limited by RPC");
            backoff.wait().await;
            continue;
        }

        let response = parse_response(&resp.text().await?)?;

        if let Some(err) = response.error {
            if err.is_fatal() {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(retry_in = backoff.secs, code = err.code, "RPC soft error: {}", err.message);
            backoff.wait().await;
            continue;
        }

        let result = response.result.ok_or(IndexerError::EmptyResult)?;

        debug!(
            count = result.events.len(),
            latest_ledger = ?result.latest_ledger,
            "Fetched events"
        );

        return Ok(EventsPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn parse_response(body: &str) -> Result<RpcResponse> {
    Ok(serde_json::from_str(body)?)
}

/// Build `getEvents` params. A cursor takes precedence over the start ledger.
fn build_params(contract_id: &str, page: PageRequest<'_>) -> Value {
    let mut params = json!({
        "xdrFormat": "json",
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": page.limit
        }
    });

    match page.cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(page.start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`LedgerEvent`] structs.
///
/// Events from failed contract calls are dropped; the host rolled them back.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<LedgerEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<LedgerEvent> {
    let kind = EventKind::from_topic(&scval_to_string(raw.topic.first()?)?);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let upc = raw.topic.get(1).and_then(scval_to_string);
    let actor = map_lookup(&raw.value, kind.actor_keys());
    let amount = map_lookup(&raw.value, kind.amount_keys());

    Some(LedgerEvent {
        event_id: raw.id.clone(),
        event_type: kind.as_str().to_string(),
        upc,
        actor,
        amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// First of `keys` present in a `{"map":[{"key":..,"val":..}]}` ScVal,
/// rendered as a string.
fn map_lookup(value: &Value, keys: &[&str]) -> Option<String> {
    let entries = value.get("map")?.as_array()?;
    keys.iter().find_map(|key| {
        entries
            .iter()
            .find(|entry| {
                entry
                    .get("key")
                    .and_then(|k| k.get("symbol"))
                    .and_then(Value::as_str)
                    == Some(*key)
            })
            .and_then(|entry| scval_to_string(entry.get("val")?))
    })
}

/// Render a scalar ScVal (`{"symbol":"sold"}`, `{"u64":"42"}`,
/// `{"address":"G..."}`, ...) as a plain string. 64- and 128-bit integers may
/// come as numbers, decimal strings or `{"hi":..,"lo":..}` parts.
fn scval_to_string(value: &Value) -> Option<String> {
    let (tag, inner) = value.as_object()?.iter().next()?;
    match tag.as_str() {
        "symbol" | "string" | "address" => inner.as_str().map(String::from),
        "u32" | "i32" | "u64" | "i64" | "u128" | "i128" => match inner {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Object(parts) => {
                let hi = parts.get("hi")?.as_u64()? as u128;
                let lo = parts.get("lo")?.as_u64()? as u128;
                Some(((hi << 64) | lo).to_string())
            }
            _ => None,
        },
        _ => None,
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
