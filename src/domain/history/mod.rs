//! History domain — wallet transaction events and single-transaction detail.

pub mod client;
pub mod convert;
pub mod wire;

use crate::shared::{ChainId, TxHash};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Flow direction relative to the queried wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    #[serde(rename = "self")]
    SelfTransfer,
    Unknown,
}

impl Direction {
    pub(crate) fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("in") => Direction::In,
            Some("out") => Direction::Out,
            Some("self") => Direction::SelfTransfer,
            _ => Direction::Unknown,
        }
    }
}

/// One wallet history entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    pub id: Option<String>,
    pub time: DateTime<Utc>,
    pub chain_id: ChainId,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub direction: Direction,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Fee in the chain's smallest native unit.
    pub fee: Option<String>,
    pub token_actions: Vec<TokenAction>,
}

impl TransactionEvent {
    pub fn is_failed(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("failed") || s.eq_ignore_ascii_case("reverted"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAction {
    pub token: String,
    pub standard: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Base units.
    pub amount: Option<String>,
    pub direction: Direction,
}

/// A page of history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistory {
    pub chain_id: ChainId,
    pub limit: u32,
    pub events: Vec<TransactionEvent>,
}

impl TransactionHistory {
    /// Fewer events than requested means the wallet has no older history.
    pub fn is_complete(&self) -> bool {
        (self.events.len() as u32) < self.limit
    }
}
