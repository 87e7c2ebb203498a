//! High-level client — `ChainfolioClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the injected query cache, and accessor methods.

use crate::chain::{ChainRegistry, ChainSupport};
use crate::config::ProviderConfig;
use crate::domain::history::client::History;
use crate::domain::portfolio::client::Portfolio;
use crate::domain::price::client::Prices;
use crate::domain::price::{StaticTokenDirectory, TokenDirectory};
use crate::domain::swap::client::Swap;
use crate::error::ErrorEnvelope;
use crate::http::{ProviderHttp, Transport};
use crate::query::{QueryClient, QueryOptions, RetryPolicy};
use crate::resource::ResourceKind;
use crate::shared::ChainId;

use std::sync::Arc;
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::history::client::History as HistoryClient;
pub use crate::domain::portfolio::client::Portfolio as PortfolioClient;
pub use crate::domain::price::client::Prices as PricesClient;
pub use crate::domain::swap::client::Swap as SwapClient;

/// The primary entry point.
///
/// Provides nested sub-client accessors for each domain:
/// `client.portfolio()`, `client.prices()`, etc. Every read goes through the
/// shared [`QueryClient`], so two clones of this client (or two screens using
/// one) never issue the same upstream call twice.
pub struct ChainfolioClient {
    pub(crate) http: ProviderHttp,
    pub(crate) query: QueryClient,
    pub(crate) tokens: Arc<dyn TokenDirectory>,
    pub(crate) retry: RetryPolicy,
    /// Auto-refresh period for subscribed queries.
    pub(crate) refetch_interval: Option<Duration>,
}

impl ChainfolioClient {
    pub fn builder() -> ChainfolioClientBuilder {
        ChainfolioClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn portfolio(&self) -> Portfolio<'_> {
        Portfolio { client: self }
    }

    pub fn prices(&self) -> Prices<'_> {
        Prices { client: self }
    }

    pub fn history(&self) -> History<'_> {
        History { client: self }
    }

    pub fn swap(&self) -> Swap<'_> {
        Swap { client: self }
    }

    // ── Shared state ─────────────────────────────────────────────────────

    /// Raw gateway, for callers that want the pass-through JSON.
    pub fn gateway(&self) -> &ProviderHttp {
        &self.http
    }

    pub fn query(&self) -> &QueryClient {
        &self.query
    }

    pub fn chains(&self) -> &ChainRegistry {
        self.http.chains()
    }

    pub fn classify(&self, chain_id: ChainId) -> ChainSupport {
        self.chains().classify(chain_id)
    }

    pub fn can_use_provider(&self, chain_id: ChainId) -> bool {
        self.chains().can_use_provider(chain_id)
    }

    /// Replace (or clear) the upstream credential at runtime.
    pub async fn set_api_key(&self, key: Option<String>) {
        self.http.set_api_key(key).await;
    }

    /// Options for a resource: its staleness/eviction windows plus this
    /// client's retry policy and auto-refresh period.
    pub(crate) fn options(&self, resource: ResourceKind) -> QueryOptions {
        let refetch = match resource {
            ResourceKind::TransactionDetail => None,
            _ => self.refetch_interval,
        };
        QueryOptions::for_resource(resource)
            .retry(self.retry.clone())
            .refetch_interval(refetch)
    }

    /// Clear every cached query.
    pub fn clear_all_caches(&self) {
        self.query.clear();
    }
}

impl Clone for ChainfolioClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            query: self.query.clone(),
            tokens: self.tokens.clone(),
            retry: self.retry.clone(),
            refetch_interval: self.refetch_interval,
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct ChainfolioClientBuilder {
    base_url: String,
    api_key: Option<String>,
    quote_timeout: Duration,
    portfolio_timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
    chains: Option<Arc<ChainRegistry>>,
    query: Option<QueryClient>,
    tokens: Option<Arc<dyn TokenDirectory>>,
    retry: RetryPolicy,
    refetch_interval: Option<Duration>,
}

impl Default for ChainfolioClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            api_key: None,
            quote_timeout: crate::network::QUOTE_TIMEOUT,
            portfolio_timeout: crate::network::PORTFOLIO_TIMEOUT,
            transport: None,
            chains: None,
            query: None,
            tokens: None,
            retry: RetryPolicy::default(),
            refetch_interval: None,
        }
    }
}

impl ChainfolioClientBuilder {
    /// Start from a loaded [`ProviderConfig`].
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            quote_timeout: config.quote_timeout,
            portfolio_timeout: config.portfolio_timeout,
            ..Self::default()
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn timeouts(mut self, quote: Duration, portfolio: Duration) -> Self {
        self.quote_timeout = quote;
        self.portfolio_timeout = portfolio;
        self
    }

    /// Use a custom transport instead of the default `reqwest` one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn chains(mut self, chains: ChainRegistry) -> Self {
        self.chains = Some(Arc::new(chains));
        self
    }

    /// Share an existing cache instead of creating a fresh one.
    pub fn query_client(mut self, query: QueryClient) -> Self {
        self.query = Some(query);
        self
    }

    pub fn token_directory(mut self, tokens: Arc<dyn TokenDirectory>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Revalidate subscribed queries on this period (auto-refresh).
    pub fn refetch_interval(mut self, every: Option<Duration>) -> Self {
        self.refetch_interval = every;
        self
    }

    pub fn build(self) -> Result<ChainfolioClient, ErrorEnvelope> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };
        let chains = self.chains.unwrap_or_default();
        let http = ProviderHttp::new(&self.base_url, transport, chains, self.api_key)
            .with_timeouts(self.quote_timeout, self.portfolio_timeout);

        Ok(ChainfolioClient {
            http,
            query: self.query.unwrap_or_default(),
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(StaticTokenDirectory::new())),
            retry: self.retry,
            refetch_interval: self.refetch_interval,
        })
    }
}

#[cfg(feature = "http")]
fn default_transport() -> Result<Arc<dyn Transport>, ErrorEnvelope> {
    let transport = crate::http::ReqwestTransport::new()
        .map_err(|e| ErrorEnvelope::config(format!("failed to build HTTP client: {}", e)))?;
    Ok(Arc::new(transport))
}

#[cfg(not(feature = "http"))]
fn default_transport() -> Result<Arc<dyn Transport>, ErrorEnvelope> {
    Err(ErrorEnvelope::config(
        "no transport configured; enable the `http` feature or call `.transport(..)`",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::test_support::ScriptedTransport;
    use crate::shared::{EvmAddress, TokenSymbol};

    const WALLET: &str = "0x742d35cc6634c0532925a3b844bc454e4438f44e";

    fn client(transport: Arc<ScriptedTransport>) -> ChainfolioClient {
        ChainfolioClient::builder()
            .api_key("test-key")
            .transport(transport)
            .retry(RetryPolicy::none())
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_cache() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, r#"{"result":{"total":10.5,"by_chain":[]}}"#);
        let a = client(transport.clone());
        let b = a.clone();
        let wallet = EvmAddress::parse(WALLET).unwrap();

        let first = a.portfolio().current_value(&wallet, ChainId(1)).await.unwrap();
        let second = b.portfolio().current_value(&wallet, ChainId(1)).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_symbol_is_validation() {
        let transport = Arc::new(ScriptedTransport::new());
        let c = client(transport.clone());
        let err = c
            .prices()
            .quote(ChainId(1), &TokenSymbol::parse("NOPE").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_symbol_quote_resolves_through_directory() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, r#"{"0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2":"3500.10"}"#);
        let weth = EvmAddress::parse("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap();
        let directory = StaticTokenDirectory::new().with(
            ChainId(1),
            TokenSymbol::parse("WETH").unwrap(),
            weth.clone(),
        );
        let c = ChainfolioClient::builder()
            .api_key("k")
            .transport(transport.clone())
            .token_directory(Arc::new(directory))
            .build()
            .unwrap();

        let quote = c.prices().quote(ChainId(1), &TokenSymbol::parse("weth").unwrap()).await.unwrap();
        assert_eq!(quote.token, weth);
        assert_eq!(quote.price_usd.to_string(), "3500.10");
        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "https://api.1inch.dev/price/v1.1/1");
    }

    #[test]
    fn test_options_follow_resource_table() {
        let c = ChainfolioClient::builder()
            .transport(Arc::new(ScriptedTransport::new()))
            .refetch_interval(Some(Duration::from_secs(30)))
            .build()
            .unwrap();
        let quote = c.options(ResourceKind::SwapQuote);
        assert_eq!(quote.stale_after, Duration::from_secs(5));
        assert_eq!(quote.refetch_interval, Some(Duration::from_secs(30)));
        assert_eq!(c.options(ResourceKind::TransactionDetail).refetch_interval, None);
    }
}
