//! Request gateway — `ProviderHttp`.
//!
//! One method per upstream resource. Every call is validated, chain-gated,
//! credential-checked and timeout-bound before exactly one outbound request
//! is made; the JSON body is passed through untouched and tagged with the
//! resource's cache directive. Retries are the query cache's job, not ours.

use crate::chain::ChainRegistry;
use crate::error::ErrorEnvelope;
use crate::http::transport::{Method, Transport, TransportError, UpstreamRequest};
use crate::resource::{CacheDirective, ResourceKind};
use crate::shared::{ChainId, EvmAddress, HistoryLimit, TimeRange, TokenAmount, TxHash};

use async_lock::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Most token addresses accepted in a single price lookup.
pub const MAX_PRICE_TOKENS: usize = 100;

/// A successful gateway answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayResponse {
    pub resource: ResourceKind,
    pub data: serde_json::Value,
    #[serde(skip)]
    pub cache_control: CacheDirective,
}

/// Upstream gateway for the portfolio/price provider.
pub struct ProviderHttp {
    base_url: String,
    transport: Arc<dyn Transport>,
    chains: Arc<ChainRegistry>,
    /// Upstream bearer credential. NEVER exposed publicly.
    api_key: Arc<RwLock<Option<String>>>,
    quote_timeout: Duration,
    portfolio_timeout: Duration,
}

impl ProviderHttp {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        chains: Arc<ChainRegistry>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            chains,
            api_key: Arc::new(RwLock::new(api_key.filter(|k| !k.trim().is_empty()))),
            quote_timeout: ResourceKind::SwapQuote.default_timeout(),
            portfolio_timeout: ResourceKind::CurrentValue.default_timeout(),
        }
    }

    pub fn with_timeouts(mut self, quote: Duration, portfolio: Duration) -> Self {
        self.quote_timeout = quote;
        self.portfolio_timeout = portfolio;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    /// Replace (or clear) the upstream credential at runtime.
    pub async fn set_api_key(&self, key: Option<String>) {
        *self.api_key.write().await = key.filter(|k| !k.trim().is_empty());
    }

    pub async fn has_api_key(&self) -> bool {
        self.api_key.read().await.is_some()
    }

    pub fn timeout_for(&self, resource: ResourceKind) -> Duration {
        if resource.is_quote_class() {
            self.quote_timeout
        } else {
            self.portfolio_timeout
        }
    }

    // ── Portfolio ────────────────────────────────────────────────────────

    pub async fn current_value(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        let url = format!(
            "{}/portfolio/portfolio/v4/overview/erc20/current_value?addresses={}&chain_id={}",
            self.base_url, address, chain_id
        );
        self.get(ResourceKind::CurrentValue, chain_id, url).await
    }

    pub async fn value_history(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
        range: TimeRange,
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        let url = format!(
            "{}/portfolio/portfolio/v4/general/value_chart?addresses={}&chain_id={}&timerange={}",
            self.base_url, address, chain_id, range
        );
        self.get(ResourceKind::ValueHistory, chain_id, url).await
    }

    // ── Prices ───────────────────────────────────────────────────────────

    pub async fn token_prices(
        &self,
        chain_id: ChainId,
        tokens: &[EvmAddress],
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        if tokens.is_empty() {
            return Err(ErrorEnvelope::validation("at least one token is required"));
        }
        if tokens.len() > MAX_PRICE_TOKENS {
            return Err(ErrorEnvelope::validation(format!(
                "at most {} tokens per price lookup, got {}",
                MAX_PRICE_TOKENS,
                tokens.len()
            )));
        }
        let url = format!("{}/price/v1.1/{}", self.base_url, chain_id);
        let body = serde_json::json!({
            "tokens": tokens.iter().map(EvmAddress::as_str).collect::<Vec<_>>(),
            "currency": "USD",
        });
        self.execute(ResourceKind::TokenPrice, Some(chain_id), Method::Post, url, Some(body))
            .await
    }

    // ── History ──────────────────────────────────────────────────────────

    pub async fn transaction_events(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
        limit: u32,
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        let limit = HistoryLimit::new(limit)?;
        let url = format!(
            "{}/history/v2.0/history/{}/events?chainId={}&limit={}",
            self.base_url,
            address,
            chain_id,
            limit.get()
        );
        self.get(ResourceKind::TransactionEvents, chain_id, url).await
    }

    pub async fn transaction_detail(
        &self,
        chain_id: ChainId,
        tx_hash: &TxHash,
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        let url = format!(
            "{}/history/v2.0/history/{}/transaction/{}",
            self.base_url, chain_id, tx_hash
        );
        self.get(ResourceKind::TransactionDetail, chain_id, url).await
    }

    // ── Swap ─────────────────────────────────────────────────────────────

    pub async fn swap_quote(
        &self,
        chain_id: ChainId,
        src: &EvmAddress,
        dst: &EvmAddress,
        amount: &TokenAmount,
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        if src == dst {
            return Err(ErrorEnvelope::validation("source and destination tokens must differ"));
        }
        let url = format!(
            "{}/swap/v6.0/{}/quote?src={}&dst={}&amount={}",
            self.base_url,
            chain_id,
            src,
            dst,
            urlencoding::encode(amount.as_str())
        );
        self.get(ResourceKind::SwapQuote, chain_id, url).await
    }

    pub async fn allowance(
        &self,
        chain_id: ChainId,
        token: &EvmAddress,
        wallet: &EvmAddress,
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        let url = format!(
            "{}/swap/v6.0/{}/approve/allowance?tokenAddress={}&walletAddress={}",
            self.base_url, chain_id, token, wallet
        );
        self.get(ResourceKind::Allowance, chain_id, url).await
    }

    // ── Internal ─────────────────────────────────────────────────────────

    async fn get(
        &self,
        resource: ResourceKind,
        chain_id: ChainId,
        url: String,
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        self.execute(resource, Some(chain_id), Method::Get, url, None)
            .await
    }

    fn ensure_supported(&self, chain_id: ChainId) -> Result<(), ErrorEnvelope> {
        let support = self.chains.classify(chain_id);
        if support.is_supported() {
            Ok(())
        } else {
            Err(ErrorEnvelope::validation(format!(
                "chain {} is {} for portfolio data",
                chain_id, support
            )))
        }
    }

    async fn execute(
        &self,
        resource: ResourceKind,
        chain_id: Option<ChainId>,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<GatewayResponse, ErrorEnvelope> {
        if let Some(chain_id) = chain_id {
            self.ensure_supported(chain_id)?;
        }

        let api_key = self
            .api_key
            .read()
            .await
            .clone()
            .ok_or_else(|| ErrorEnvelope::config("upstream API key is not configured"))?;

        let timeout = self.timeout_for(resource);
        let request = UpstreamRequest {
            method,
            url,
            headers: vec![
                ("Authorization", format!("Bearer {}", api_key)),
                ("Accept", "application/json".to_string()),
            ],
            body,
            timeout,
        };

        tracing::debug!(resource = %resource, url = %request.url, "upstream request");

        // The transport enforces its own timeout too; this bound holds for any transport.
        let response = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Err(_) | Ok(Err(TransportError::Timeout)) => {
                tracing::warn!(resource = %resource, timeout_ms = timeout.as_millis() as u64, "upstream timed out");
                return Err(ErrorEnvelope::timeout(format!(
                    "{} timed out after {}ms",
                    resource,
                    timeout.as_millis()
                )));
            }
            Ok(Err(e)) => {
                tracing::warn!(resource = %resource, error = %e, "upstream unreachable");
                return Err(ErrorEnvelope::network(e.to_string()));
            }
            Ok(Ok(response)) => response,
        };

        if !(200..300).contains(&response.status) {
            let err = ErrorEnvelope::from_status(response.status, response.body);
            tracing::warn!(resource = %resource, status = response.status, kind = %err.kind, "upstream error");
            return Err(err);
        }

        let data = serde_json::from_str(&response.body).map_err(|e| {
            ErrorEnvelope::parse(format!("{} returned malformed JSON: {}", resource, e))
        })?;

        Ok(GatewayResponse {
            resource,
            data,
            cache_control: resource.cache_directive(),
        })
    }
}

impl Clone for ProviderHttp {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: self.transport.clone(),
            chains: self.chains.clone(),
            api_key: self.api_key.clone(),
            quote_timeout: self.quote_timeout,
            portfolio_timeout: self.portfolio_timeout,
        }
    }
}
