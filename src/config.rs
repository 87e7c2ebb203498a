//! Environment configuration.
//!
//! `.env` is honoured via `dotenvy`. Malformed values are load errors; a
//! missing API key is not (every call then fails with `CONFIG_ERROR`).

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_API_URL: &str = "CHAINFOLIO_API_URL";
pub const ENV_API_KEY: &str = "CHAINFOLIO_API_KEY";
pub const ENV_QUOTE_TIMEOUT_MS: &str = "CHAINFOLIO_QUOTE_TIMEOUT_MS";
pub const ENV_PORTFOLIO_TIMEOUT_MS: &str = "CHAINFOLIO_PORTFOLIO_TIMEOUT_MS";
pub const ENV_LISTEN_ADDR: &str = "CHAINFOLIO_LISTEN_ADDR";
pub const ENV_CORS_ALLOW_ORIGINS: &str = "CHAINFOLIO_CORS_ALLOW_ORIGINS";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {value:?}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be a positive integer of milliseconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} is not a socket address: {value:?}")]
    InvalidListenAddr { var: &'static str, value: String },
}

/// Upstream provider settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub quote_timeout: Duration,
    pub portfolio_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            api_key: None,
            quote_timeout: crate::network::QUOTE_TIMEOUT,
            portfolio_timeout: crate::network::PORTFOLIO_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let base_url = match non_empty(lookup(ENV_API_URL)) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Some(url) => {
                return Err(ConfigError::InvalidUrl {
                    var: ENV_API_URL,
                    value: url,
                })
            }
            None => defaults.base_url,
        };
        Ok(Self {
            base_url,
            api_key: non_empty(lookup(ENV_API_KEY)),
            quote_timeout: timeout(ENV_QUOTE_TIMEOUT_MS, lookup(ENV_QUOTE_TIMEOUT_MS))?
                .unwrap_or(defaults.quote_timeout),
            portfolio_timeout: timeout(ENV_PORTFOLIO_TIMEOUT_MS, lookup(ENV_PORTFOLIO_TIMEOUT_MS))?
                .unwrap_or(defaults.portfolio_timeout),
        })
    }
}

/// HTTP surface settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// `*` allows any origin.
    pub cors_allow: Vec<String>,
    pub provider: ProviderConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = non_empty(lookup(ENV_LISTEN_ADDR)).unwrap_or_else(|| "0.0.0.0:8080".into());
        let listen_addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr {
                var: ENV_LISTEN_ADDR,
                value: raw_addr.clone(),
            })?;
        let cors_allow = non_empty(lookup(ENV_CORS_ALLOW_ORIGINS))
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(Self {
            listen_addr,
            cors_allow,
            provider: ProviderConfig::from_lookup(lookup)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn timeout(var: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
            _ => Err(ConfigError::InvalidTimeout { var, value: raw }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ProviderConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ProviderConfig::from_lookup(vars(&[
            (ENV_API_URL, "http://localhost:9000/"),
            (ENV_API_KEY, "  secret "),
            (ENV_QUOTE_TIMEOUT_MS, "2500"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.quote_timeout, Duration::from_millis(2500));
        assert_eq!(config.portfolio_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let config = ProviderConfig::from_lookup(vars(&[(ENV_API_KEY, "   ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_malformed_values_fail() {
        assert!(matches!(
            ProviderConfig::from_lookup(vars(&[(ENV_PORTFOLIO_TIMEOUT_MS, "soon")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            ProviderConfig::from_lookup(vars(&[(ENV_QUOTE_TIMEOUT_MS, "0")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            ProviderConfig::from_lookup(vars(&[(ENV_API_URL, "api.example.com")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(vars(&[(ENV_LISTEN_ADDR, "localhost")])),
            Err(ConfigError::InvalidListenAddr { .. })
        ));
    }

    #[test]
    fn test_server_cors_list() {
        let config = ServerConfig::from_lookup(vars(&[
            (ENV_CORS_ALLOW_ORIGINS, "https://a.example, https://b.example,"),
            (ENV_LISTEN_ADDR, "127.0.0.1:3000"),
        ]))
        .unwrap();
        assert_eq!(config.cors_allow, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.listen_addr.port(), 3000);
    }
}
