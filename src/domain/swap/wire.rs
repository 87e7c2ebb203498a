//! Wire types for swap responses.

use serde::{Deserialize, Serialize};

/// `GET /swap/v6.0/{chain}/quote`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub dst_amount: String,
    #[serde(default)]
    pub src_token: Option<TokenInfoWire>,
    #[serde(default)]
    pub dst_token: Option<TokenInfoWire>,
    #[serde(default)]
    pub gas: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfoWire {
    pub address: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
}

/// `GET /swap/v6.0/{chain}/approve/allowance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub allowance: String,
}
