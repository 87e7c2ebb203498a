//! Prices sub-client — address prices, symbol quotes, live ticker.

use super::wire::PriceMapResponse;
use super::{TickerQuote, TickerSnapshot, TokenDirectory, TokenPrices};
use crate::client::ChainfolioClient;
use crate::domain::{decode, Fetch};
use crate::error::{ErrorEnvelope, ErrorKind};
use crate::http::ProviderHttp;
use crate::query::{QueryAggregate, QueryKey};
use crate::resource::ResourceKind;
use crate::shared::{ChainId, EvmAddress, TokenSymbol};
use futures_util::FutureExt;
use std::sync::Arc;

pub struct Prices<'a> {
    pub(crate) client: &'a ChainfolioClient,
}

impl<'a> Prices<'a> {
    /// Order-insensitive over `tokens`.
    pub fn token_prices_key(chain_id: ChainId, tokens: &[EvmAddress]) -> QueryKey {
        QueryKey::new(ResourceKind::TokenPrice)
            .subject_set(tokens)
            .chain(chain_id)
    }

    pub fn symbol_key(chain_id: ChainId, symbol: &TokenSymbol) -> QueryKey {
        QueryKey::new(ResourceKind::TokenPrice)
            .subject(symbol)
            .chain(chain_id)
            .param("by", "symbol")
    }

    pub async fn token_prices(
        &self,
        chain_id: ChainId,
        tokens: &[EvmAddress],
    ) -> Result<Arc<TokenPrices>, ErrorEnvelope> {
        let http = self.client.http.clone();
        let owned = tokens.to_vec();
        let fetcher = move || -> Fetch<TokenPrices> {
            let http = http.clone();
            let tokens = owned.clone();
            async move {
                let resp = http.token_prices(chain_id, &tokens).await?;
                let wire: PriceMapResponse = decode(ResourceKind::TokenPrice, resp.data)?;
                TokenPrices::from_wire(chain_id, wire)
            }
            .boxed()
        };
        self.client
            .query
            .fetch(
                Self::token_prices_key(chain_id, tokens),
                self.client.options(ResourceKind::TokenPrice),
                fetcher,
            )
            .await
    }

    /// Price of a ticker symbol, resolved through the client's token directory.
    pub async fn quote(
        &self,
        chain_id: ChainId,
        symbol: &TokenSymbol,
    ) -> Result<Arc<TickerQuote>, ErrorEnvelope> {
        self.client
            .query
            .fetch(
                Self::symbol_key(chain_id, symbol),
                self.client.options(ResourceKind::TokenPrice),
                quote_fetcher(self.client, chain_id, symbol.clone()),
            )
            .await
    }

    /// Live ticker over `symbols` on `chain_id`.
    pub fn ticker<I>(&self, chain_id: ChainId, symbols: I) -> PriceTicker
    where
        I: IntoIterator<Item = TokenSymbol>,
    {
        let owner = self.client.clone();
        let aggregate = QueryAggregate::new(self.client.query.clone(), move |query, symbol: &TokenSymbol| {
            query.subscribe(
                Prices::symbol_key(chain_id, symbol),
                owner.options(ResourceKind::TokenPrice),
                quote_fetcher(&owner, chain_id, symbol.clone()),
            )
        });
        PriceTicker {
            chain_id,
            aggregate: aggregate.with_members(symbols),
        }
    }
}

fn quote_fetcher(
    client: &ChainfolioClient,
    chain_id: ChainId,
    symbol: TokenSymbol,
) -> impl Fn() -> Fetch<TickerQuote> + Send + Sync + 'static {
    let http = client.http.clone();
    let directory = client.tokens.clone();
    move || {
        let http = http.clone();
        let directory = directory.clone();
        let symbol = symbol.clone();
        async move { fetch_quote(&http, directory.as_ref(), chain_id, symbol).await }.boxed()
    }
}

async fn fetch_quote(
    http: &ProviderHttp,
    directory: &dyn TokenDirectory,
    chain_id: ChainId,
    symbol: TokenSymbol,
) -> Result<TickerQuote, ErrorEnvelope> {
    let token = directory.resolve(chain_id, &symbol).ok_or_else(|| {
        ErrorEnvelope::validation(format!("no token address for {} on chain {}", symbol, chain_id))
    })?;
    let resp = http.token_prices(chain_id, std::slice::from_ref(&token)).await?;
    let wire: PriceMapResponse = decode(ResourceKind::TokenPrice, resp.data)?;
    let prices = TokenPrices::from_wire(chain_id, wire)?;
    let price_usd = prices.get(&token).ok_or_else(|| {
        ErrorEnvelope::new(ErrorKind::NotFound, format!("no price returned for {}", symbol))
    })?;
    Ok(TickerQuote {
        symbol,
        chain_id,
        token,
        price_usd,
    })
}

/// Symbol-set price view; changing the set keeps prices for symbols that stay.
pub struct PriceTicker {
    chain_id: ChainId,
    aggregate: QueryAggregate<TokenSymbol, TickerQuote>,
}

impl PriceTicker {
    pub fn set_symbols<I: IntoIterator<Item = TokenSymbol>>(&mut self, symbols: I) {
        self.aggregate.set_members(symbols);
    }

    pub fn symbols(&self) -> Vec<TokenSymbol> {
        self.aggregate.members().cloned().collect()
    }

    pub fn snapshot(&self) -> TickerSnapshot {
        let result = self.aggregate.result();
        TickerSnapshot {
            chain_id: self.chain_id,
            quotes: result.data,
            is_loading: result.is_loading,
            is_refetching: result.is_refetching,
            error: result.error,
        }
    }

    pub async fn changed(&mut self) -> bool {
        self.aggregate.changed().await
    }

    pub async fn wait_settled(&mut self) -> TickerSnapshot {
        self.aggregate.wait_settled().await;
        self.snapshot()
    }

    pub fn refresh(&self) -> usize {
        self.aggregate.refresh()
    }
}
