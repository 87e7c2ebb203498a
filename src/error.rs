//! Normalized error envelope shared by the gateway, cache and aggregators.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    ConfigError,
    AuthError,
    NotFound,
    RateLimited,
    UpstreamError,
    NetworkTimeout,
    NetworkError,
    ParseError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::ConfigError => "CONFIG_ERROR",
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::UpstreamError => "UPSTREAM_ERROR",
            ErrorKind::NetworkTimeout => "NETWORK_TIMEOUT",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::ParseError => "PARSE_ERROR",
        }
    }

    /// Transient kinds the retry engine may re-attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::NetworkTimeout | ErrorKind::NetworkError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only error representation past the gateway boundary.
///
/// `retryable` is derived from `kind` by the constructors; callers should
/// never need to set it by hand.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub message: String,
    pub retryable: bool,
    /// Raw upstream body, kept for diagnostics on `UPSTREAM_ERROR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            http_status: None,
            message: message.into(),
            retryable: kind.is_retryable(),
            body: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigError, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkTimeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    /// Map a non-2xx upstream status to its envelope.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Self::new(ErrorKind::AuthError, "upstream rejected the access credential")
                .with_status(status),
            404 => Self::new(ErrorKind::NotFound, "upstream resource not found")
                .with_status(status),
            429 => Self::new(ErrorKind::RateLimited, "upstream rate limit exceeded")
                .with_status(status),
            _ => Self::new(ErrorKind::UpstreamError, format!("upstream returned {}", status))
                .with_status(status)
                .with_body(body),
        }
    }
}

impl From<serde_json::Error> for ErrorEnvelope {
    fn from(err: serde_json::Error) -> Self {
        ErrorEnvelope::parse(err.to_string())
    }
}

pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;
