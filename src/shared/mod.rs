//! Shared newtypes used across the gateway, cache keys and domain modules.
//!
//! Every constructor validates its input and fails with a `VALIDATION`
//! envelope, so a value of one of these types is always safe to put on the
//! wire. They serialize transparently as the raw string/number the upstream
//! expects.

pub mod serde_util;

use crate::error::ErrorEnvelope;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ─── ChainId ─────────────────────────────────────────────────────────────────

/// Numeric chain identifier (EIP-155).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for ChainId {
    type Err = ErrorEnvelope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ChainId)
            .map_err(|_| ErrorEnvelope::validation(format!("invalid chain id: {:?}", s)))
    }
}

// ─── EvmAddress ──────────────────────────────────────────────────────────────

/// An EVM account or token address: `0x` followed by 40 hex characters.
///
/// Checksum-agnostic: the address is stored lowercased so two spellings of
/// the same account produce the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvmAddress(String);

impl EvmAddress {
    pub const HEX_LEN: usize = 40;

    pub fn parse(s: &str) -> Result<Self, ErrorEnvelope> {
        let hex_part = strip_hex_prefix(s)
            .ok_or_else(|| ErrorEnvelope::validation(format!("address must start with 0x: {:?}", s)))?;
        check_hex(hex_part, Self::HEX_LEN)
            .map_err(|reason| ErrorEnvelope::validation(format!("invalid address {:?}: {}", s, reason)))?;
        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EvmAddress {
    type Err = ErrorEnvelope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EvmAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EvmAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── TxHash ──────────────────────────────────────────────────────────────────

/// A transaction hash: `0x` followed by 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash(String);

impl TxHash {
    pub const HEX_LEN: usize = 64;

    pub fn parse(s: &str) -> Result<Self, ErrorEnvelope> {
        let hex_part = strip_hex_prefix(s)
            .ok_or_else(|| ErrorEnvelope::validation(format!("tx hash must start with 0x: {:?}", s)))?;
        check_hex(hex_part, Self::HEX_LEN)
            .map_err(|reason| ErrorEnvelope::validation(format!("invalid tx hash {:?}: {}", s, reason)))?;
        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TxHash {
    type Err = ErrorEnvelope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TxHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TxHash::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Only the lowercase `0x` prefix is accepted.
fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x")
}

fn check_hex(hex_part: &str, expected_len: usize) -> Result<(), String> {
    if hex_part.len() != expected_len {
        return Err(format!(
            "expected {} hex characters, got {}",
            expected_len,
            hex_part.len()
        ));
    }
    hex::decode(hex_part).map_err(|e| e.to_string())?;
    Ok(())
}

// ─── TokenSymbol ─────────────────────────────────────────────────────────────

/// Ticker symbol (e.g. `ETH`, `USDC.e`), normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TokenSymbol(String);

impl TokenSymbol {
    pub const MAX_LEN: usize = 16;

    pub fn parse(s: &str) -> Result<Self, ErrorEnvelope> {
        let trimmed = s.trim();
        let valid_chars = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
        if trimmed.is_empty() || trimmed.len() > Self::MAX_LEN || !valid_chars {
            return Err(ErrorEnvelope::validation(format!("invalid token symbol: {:?}", s)));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TokenSymbol {
    type Err = ErrorEnvelope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for TokenSymbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TokenSymbol::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── TokenAmount ─────────────────────────────────────────────────────────────

/// A positive token amount in base units (wei-style integer string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TokenAmount(String);

impl TokenAmount {
    /// Longest accepted decimal string; a uint256 has at most 78 digits.
    pub const MAX_DIGITS: usize = 78;

    pub fn parse(s: &str) -> Result<Self, ErrorEnvelope> {
        let digits = s.trim();
        if digits.is_empty()
            || digits.len() > Self::MAX_DIGITS
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ErrorEnvelope::validation(format!(
                "amount must be a base-unit integer: {:?}",
                s
            )));
        }
        let normalized = digits.trim_start_matches('0');
        if normalized.is_empty() {
            return Err(ErrorEnvelope::validation("amount must be greater than zero"));
        }
        Ok(Self(normalized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── TimeRange ───────────────────────────────────────────────────────────────

/// Chart window accepted by the value-history endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "1day")]
    Day1,
    #[serde(rename = "1week")]
    Week1,
    #[serde(rename = "1month")]
    Month1,
    #[serde(rename = "1year")]
    Year1,
    #[serde(rename = "3years")]
    Years3,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Day1,
        TimeRange::Week1,
        TimeRange::Month1,
        TimeRange::Year1,
        TimeRange::Years3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day1 => "1day",
            Self::Week1 => "1week",
            Self::Month1 => "1month",
            Self::Year1 => "1year",
            Self::Years3 => "3years",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ErrorEnvelope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ErrorEnvelope::validation(format!("unknown time range: {:?}", s)))
    }
}

// ─── HistoryLimit ────────────────────────────────────────────────────────────

/// Page size for transaction history, bounded to `1..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HistoryLimit(u32);

impl HistoryLimit {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 1000;

    pub fn new(limit: u32) -> Result<Self, ErrorEnvelope> {
        if !(Self::MIN..=Self::MAX).contains(&limit) {
            return Err(ErrorEnvelope::validation(format!(
                "limit must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                limit
            )));
        }
        Ok(Self(limit))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for HistoryLimit {
    fn default() -> Self {
        Self(100)
    }
}
