//! Wire types for transaction history responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /history/v2.0/history/{address}/events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEventsResponse {
    #[serde(default)]
    pub items: Vec<HistoryEventWire>,
    #[serde(default)]
    pub cache_counter: Option<u64>,
}

/// One history item. `GET .../transaction/{hash}` returns a single item in
/// the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEventWire {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(with = "crate::shared::serde_util::timestamp_ms")]
    pub time_ms: DateTime<Utc>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    pub details: EventDetailsWire,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsWire {
    pub tx_hash: String,
    pub chain_id: u64,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub to_address: Option<String>,
    #[serde(default)]
    pub fee_in_smallest_native: Option<String>,
    #[serde(default)]
    pub token_actions: Vec<TokenActionWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenActionWire {
    pub address: String,
    #[serde(default)]
    pub standard: Option<String>,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub to_address: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}
