//! Portfolio domain — current holdings value and value history per wallet.

pub mod client;
pub mod convert;
pub mod wire;

use crate::shared::{ChainId, EvmAddress, TimeRange};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

// ─── Current value ───────────────────────────────────────────────────────────

/// USD value of one wallet's ERC-20 holdings on one chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentValue {
    pub address: EvmAddress,
    pub chain_id: ChainId,
    pub total_usd: Decimal,
    pub by_chain: Vec<ChainValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainValue {
    pub chain_id: ChainId,
    pub chain_name: Option<String>,
    pub value_usd: Decimal,
}

// ─── Value history ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueHistory {
    pub address: EvmAddress,
    pub chain_id: ChainId,
    pub range: TimeRange,
    /// Oldest first.
    pub points: Vec<ValuePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuePoint {
    pub time: DateTime<Utc>,
    pub value_usd: Decimal,
}

impl ValueHistory {
    pub fn latest(&self) -> Option<&ValuePoint> {
        self.points.last()
    }

    /// Change between the first and last point of the window.
    pub fn change_usd(&self) -> Option<Decimal> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some(last.value_usd - first.value_usd)
    }
}

// ─── Overview ────────────────────────────────────────────────────────────────

/// One wallet's current value across several chains.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioOverview {
    pub address: EvmAddress,
    pub per_chain: BTreeMap<ChainId, Arc<CurrentValue>>,
    pub is_loading: bool,
    pub is_refetching: bool,
    pub error: Option<crate::error::ErrorEnvelope>,
}

impl PortfolioOverview {
    /// Sum over the chains that have loaded.
    pub fn total_usd(&self) -> Decimal {
        self.per_chain.values().map(|v| v.total_usd).sum()
    }
}
