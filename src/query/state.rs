//! Read-only views of cache entries.

use super::key::QueryKey;
use super::retry::RetryPolicy;
use crate::error::ErrorEnvelope;
use crate::resource::ResourceKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Per-key lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No data and nothing in flight.
    Absent,
    /// No data yet; the first request is outstanding.
    Fetching,
    /// Data younger than `stale_after`.
    Fresh,
    /// Data older than `stale_after`; still served while revalidating.
    Stale,
}

/// Knobs applied to one cached query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub stale_after: Duration,
    pub evict_after: Duration,
    pub retry: RetryPolicy,
    /// Revalidate on this interval while subscribed.
    pub refetch_interval: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_after: Duration::ZERO,
            evict_after: Duration::from_secs(5 * 60),
            retry: RetryPolicy::default(),
            refetch_interval: None,
        }
    }
}

impl QueryOptions {
    /// Staleness and eviction windows from the resource policy table.
    pub fn for_resource(resource: ResourceKind) -> Self {
        Self {
            stale_after: resource.default_stale_after(),
            evict_after: resource.default_evict_after(),
            ..Self::default()
        }
    }

    pub fn stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn evict_after(mut self, evict_after: Duration) -> Self {
        self.evict_after = evict_after;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn refetch_interval(mut self, every: Option<Duration>) -> Self {
        self.refetch_interval = every;
        self
    }
}

/// Point-in-time copy of an entry, handed to consumers.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub key: QueryKey,
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    /// Last terminal failure. Kept alongside older good data.
    pub error: Option<ErrorEnvelope>,
    pub is_fetching: bool,
    pub updated_at: Option<Instant>,
    pub error_at: Option<Instant>,
}

impl<T> QuerySnapshot<T> {
    pub(crate) fn absent(key: QueryKey) -> Self {
        Self {
            key,
            status: QueryStatus::Absent,
            data: None,
            error: None,
            is_fetching: false,
            updated_at: None,
            error_at: None,
        }
    }

    /// Nothing to show yet and a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }

    /// Showing previous data while a revalidation runs.
    pub fn is_refetching(&self) -> bool {
        self.data.is_some() && self.is_fetching
    }
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            updated_at: self.updated_at,
            error_at: self.error_at,
        }
    }
}
