//! Wire types for portfolio responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `GET .../overview/erc20/current_value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentValueResponse {
    pub result: CurrentValueResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentValueResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub by_chain: Vec<ChainValueWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainValueWire {
    pub chain_id: u64,
    #[serde(default)]
    pub chain_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// `GET .../general/value_chart`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChartResponse {
    #[serde(default)]
    pub result: Vec<ValueChartPointWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChartPointWire {
    #[serde(with = "crate::shared::serde_util::timestamp_secs")]
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub value_usd: Decimal,
}
