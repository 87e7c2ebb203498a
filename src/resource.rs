//! Resource kinds and their per-kind policies.
//!
//! One table decides, for each upstream resource, which timeout class it
//! belongs to, what `Cache-Control` directive the gateway attaches, and the
//! default staleness/eviction windows the query cache applies.

use crate::network::{PORTFOLIO_TIMEOUT, QUOTE_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A logical upstream resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    CurrentValue,
    ValueHistory,
    TokenPrice,
    TransactionEvents,
    TransactionDetail,
    SwapQuote,
    Allowance,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::CurrentValue,
        ResourceKind::ValueHistory,
        ResourceKind::TokenPrice,
        ResourceKind::TransactionEvents,
        ResourceKind::TransactionDetail,
        ResourceKind::SwapQuote,
        ResourceKind::Allowance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentValue => "current_value",
            Self::ValueHistory => "value_history",
            Self::TokenPrice => "token_price",
            Self::TransactionEvents => "transaction_events",
            Self::TransactionDetail => "transaction_detail",
            Self::SwapQuote => "swap_quote",
            Self::Allowance => "allowance",
        }
    }

    /// Quote-class lookups get the short timeout.
    pub fn is_quote_class(&self) -> bool {
        matches!(self, Self::TokenPrice | Self::SwapQuote | Self::Allowance)
    }

    pub fn default_timeout(&self) -> Duration {
        if self.is_quote_class() {
            QUOTE_TIMEOUT
        } else {
            PORTFOLIO_TIMEOUT
        }
    }

    pub fn cache_directive(&self) -> CacheDirective {
        match self {
            Self::SwapQuote => CacheDirective::shared(5, Some(10)),
            Self::TokenPrice | Self::Allowance => CacheDirective::shared(30, Some(60)),
            Self::CurrentValue => CacheDirective::shared(60, Some(300)),
            Self::ValueHistory | Self::TransactionEvents => CacheDirective::shared(300, Some(600)),
            Self::TransactionDetail => CacheDirective::immutable(),
        }
    }

    /// How long a cached result counts as fresh.
    pub fn default_stale_after(&self) -> Duration {
        match self {
            Self::SwapQuote => Duration::from_secs(5),
            Self::TokenPrice | Self::Allowance => Duration::from_secs(30),
            Self::CurrentValue => Duration::from_secs(60),
            Self::ValueHistory | Self::TransactionEvents => Duration::from_secs(300),
            // settled transactions never change
            Self::TransactionDetail => Duration::from_secs(365 * 24 * 3600),
        }
    }

    /// How long an unobserved entry survives before garbage collection.
    pub fn default_evict_after(&self) -> Duration {
        match self {
            Self::TransactionDetail => Duration::from_secs(30 * 60),
            _ => Duration::from_secs(5 * 60),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── CacheDirective ──────────────────────────────────────────────────────────

/// A `Cache-Control` directive attached to gateway responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheDirective {
    pub max_age: Duration,
    pub stale_while_revalidate: Option<Duration>,
    pub immutable: bool,
}

impl CacheDirective {
    const ONE_YEAR_SECS: u64 = 31_536_000;

    pub const fn shared(max_age_secs: u64, swr_secs: Option<u64>) -> Self {
        Self {
            max_age: Duration::from_secs(max_age_secs),
            stale_while_revalidate: match swr_secs {
                Some(s) => Some(Duration::from_secs(s)),
                None => None,
            },
            immutable: false,
        }
    }

    pub const fn immutable() -> Self {
        Self {
            max_age: Duration::from_secs(Self::ONE_YEAR_SECS),
            stale_while_revalidate: None,
            immutable: true,
        }
    }

    pub fn header_value(&self) -> String {
        let mut value = format!(
            "public, max-age={}, s-maxage={}",
            self.max_age.as_secs(),
            self.max_age.as_secs()
        );
        if let Some(swr) = self.stale_while_revalidate {
            value.push_str(&format!(", stale-while-revalidate={}", swr.as_secs()));
        }
        if self.immutable {
            value.push_str(", immutable");
        }
        value
    }
}

impl fmt::Display for CacheDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classes() {
        assert_eq!(ResourceKind::SwapQuote.default_timeout(), Duration::from_secs(10));
        assert_eq!(ResourceKind::TokenPrice.default_timeout(), Duration::from_secs(10));
        assert_eq!(ResourceKind::Allowance.default_timeout(), Duration::from_secs(10));
        assert_eq!(ResourceKind::CurrentValue.default_timeout(), Duration::from_secs(30));
        assert_eq!(ResourceKind::TransactionEvents.default_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_directive_ordering() {
        let quote = ResourceKind::SwapQuote.cache_directive();
        let price = ResourceKind::TokenPrice.cache_directive();
        let chart = ResourceKind::ValueHistory.cache_directive();
        let detail = ResourceKind::TransactionDetail.cache_directive();
        assert!(quote.max_age < price.max_age);
        assert!(price.max_age < chart.max_age);
        assert!(chart.max_age < detail.max_age);
        assert!(detail.immutable);
    }

    #[test]
    fn test_header_values() {
        assert_eq!(
            ResourceKind::SwapQuote.cache_directive().header_value(),
            "public, max-age=5, s-maxage=5, stale-while-revalidate=10"
        );
        assert_eq!(
            ResourceKind::TransactionDetail.cache_directive().header_value(),
            "public, max-age=31536000, s-maxage=31536000, immutable"
        );
    }

    #[test]
    fn test_history_is_stale_after_minutes() {
        assert!(ResourceKind::TransactionEvents.default_stale_after() >= Duration::from_secs(120));
    }
}
