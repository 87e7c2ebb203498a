//! # Chainfolio SDK
//!
//! Data orchestration between a multi-chain wallet UI and an upstream
//! portfolio/price provider.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Newtypes, chain registry & compatibility resolver, error envelope
//! 2. **Request Gateway** — `ProviderHttp`: validation, chain gate, timeouts, error mapping
//! 3. **Query Cache** — `QueryClient`: dedup, stale-while-revalidate, retry, invalidation
//! 4. **High-Level Client** — `ChainfolioClient` with typed sub-clients and aggregators
//! 5. **Server** (feature `server`) — axum routes exposing the gateway over HTTP
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chainfolio_sdk::prelude::*;
//!
//! let client = ChainfolioClient::builder()
//!     .api_key(std::env::var("CHAINFOLIO_API_KEY")?)
//!     .build()?;
//!
//! let wallet = EvmAddress::parse("0x742d35cc6634c0532925a3b844bc454e4438f44e")?;
//! let value = client.portfolio().current_value(&wallet, ChainId(1)).await?;
//! let history = client.history().events(&wallet, ChainId(1), 50).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Known networks and provider compatibility.
pub mod chain;

/// Upstream resource kinds and their cache directives.
pub mod resource;

/// The `ErrorEnvelope` taxonomy.
pub mod error;

/// Upstream URL and timeout constants.
pub mod network;

/// Environment configuration.
pub mod config;

/// Wallet session → provider access.
pub mod wallet;

/// Persisted preference flags.
pub mod preferences;

// ── Layer 2: Request Gateway ─────────────────────────────────────────────────

/// Upstream gateway over a pluggable transport.
pub mod http;

// ── Layer 3: Query Cache ─────────────────────────────────────────────────────

/// Keyed cache, retry policy, subscriptions and aggregates.
pub mod query;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// Domain modules (vertical slices): types, wire types, conversions, sub-clients.
pub mod domain;

/// `ChainfolioClient` — the primary entry point.
pub mod client;

// ── Layer 5: Server ──────────────────────────────────────────────────────────

/// HTTP surface for the gateway.
#[cfg(feature = "server")]
pub mod server;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{
        ChainId, EvmAddress, HistoryLimit, TimeRange, TokenAmount, TokenSymbol, TxHash,
    };

    // Chains
    pub use crate::chain::{ChainDescriptor, ChainRegistry, ChainSupport};

    // Domain types
    pub use crate::domain::history::{Direction, TokenAction, TransactionEvent, TransactionHistory};
    pub use crate::domain::portfolio::client::OverviewHandle;
    pub use crate::domain::portfolio::{
        ChainValue, CurrentValue, PortfolioOverview, ValueHistory, ValuePoint,
    };
    pub use crate::domain::price::client::PriceTicker;
    pub use crate::domain::price::{
        StaticTokenDirectory, TickerQuote, TickerSnapshot, TokenDirectory, TokenPrices,
    };
    pub use crate::domain::swap::{Allowance, SwapQuote};

    // Errors
    pub use crate::error::{ErrorEnvelope, ErrorKind};

    // Config
    pub use crate::config::{ConfigError, ProviderConfig, ServerConfig};

    // Gateway + client
    pub use crate::client::{
        ChainfolioClient, ChainfolioClientBuilder, HistoryClient, PortfolioClient, PricesClient,
        SwapClient,
    };
    pub use crate::http::{GatewayResponse, ProviderHttp, Transport};
    #[cfg(feature = "http")]
    pub use crate::http::ReqwestTransport;

    // Query cache
    pub use crate::query::{
        AggregateResult, KeyPrefix, QueryAggregate, QueryClient, QueryKey, QueryOptions,
        QuerySnapshot, QueryStatus, QuerySubscription, RetryPolicy,
    };
    pub use crate::resource::{CacheDirective, ResourceKind};

    // Wallet + preferences
    pub use crate::preferences::{JsonFileStore, MemoryStore, PreferenceStore, Preferences};
    pub use crate::wallet::{watch_sessions, SessionState, WalletKind, WalletSession};
}
