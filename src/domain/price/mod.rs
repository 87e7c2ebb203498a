//! Price domain — spot prices by token address, symbol lookup, ticker.

pub mod client;
pub mod convert;
pub mod wire;

use crate::error::ErrorEnvelope;
use crate::shared::{ChainId, EvmAddress, TokenSymbol};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// USD prices for a set of tokens on one chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrices {
    pub chain_id: ChainId,
    pub prices: BTreeMap<EvmAddress, Decimal>,
}

impl TokenPrices {
    pub fn get(&self, token: &EvmAddress) -> Option<Decimal> {
        self.prices.get(token).copied()
    }
}

/// Price of one ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerQuote {
    pub symbol: TokenSymbol,
    pub chain_id: ChainId,
    pub token: EvmAddress,
    pub price_usd: Decimal,
}

/// Current ticker contents.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSnapshot {
    pub chain_id: ChainId,
    pub quotes: BTreeMap<TokenSymbol, Arc<TickerQuote>>,
    pub is_loading: bool,
    pub is_refetching: bool,
    pub error: Option<ErrorEnvelope>,
}

// ─── Token directory ─────────────────────────────────────────────────────────

/// Symbol → contract address lookup supplied by the host application.
pub trait TokenDirectory: Send + Sync {
    fn resolve(&self, chain_id: ChainId, symbol: &TokenSymbol) -> Option<EvmAddress>;
}

/// In-memory [`TokenDirectory`] filled by the host.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenDirectory {
    entries: HashMap<(ChainId, TokenSymbol), EvmAddress>,
}

impl StaticTokenDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, chain_id: ChainId, symbol: TokenSymbol, token: EvmAddress) -> Self {
        self.insert(chain_id, symbol, token);
        self
    }

    pub fn insert(&mut self, chain_id: ChainId, symbol: TokenSymbol, token: EvmAddress) {
        self.entries.insert((chain_id, symbol), token);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TokenDirectory for StaticTokenDirectory {
    fn resolve(&self, chain_id: ChainId, symbol: &TokenSymbol) -> Option<EvmAddress> {
        self.entries.get(&(chain_id, symbol.clone())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_directory_is_per_chain() {
        let weth = EvmAddress::parse("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap();
        let dir = StaticTokenDirectory::new().with(ChainId(1), TokenSymbol::parse("weth").unwrap(), weth.clone());
        assert_eq!(dir.resolve(ChainId(1), &TokenSymbol::parse("WETH").unwrap()), Some(weth));
        assert_eq!(dir.resolve(ChainId(10), &TokenSymbol::parse("WETH").unwrap()), None);
    }
}
