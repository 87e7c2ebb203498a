//! Upstream URL and timeout constants.

use std::time::Duration;

/// Default upstream provider base URL.
pub const DEFAULT_API_URL: &str = "https://api.1inch.dev";

/// Timeout for quote-class lookups (token price, swap quote, allowance).
pub const QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for portfolio/history-class lookups.
pub const PORTFOLIO_TIMEOUT: Duration = Duration::from_secs(30);
