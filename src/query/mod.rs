//! Query cache & retry engine.
//!
//! - [`QueryClient`] — keyed cache with deduplication, stale-while-revalidate,
//!   retry, invalidation and eviction.
//! - [`QuerySubscription`] — observer handle for one key.
//! - [`QueryAggregate`] — one merged view over a changing set of keys.

pub mod aggregate;
pub mod client;
pub mod key;
pub mod retry;
pub mod state;
pub mod subscription;

pub use aggregate::{AggregateResult, QueryAggregate};
pub use client::QueryClient;
pub use key::{KeyPrefix, QueryKey};
pub use retry::RetryPolicy;
pub use state::{QueryOptions, QuerySnapshot, QueryStatus};
pub use subscription::QuerySubscription;
