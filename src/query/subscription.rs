//! Observer handle for one cached query.

use super::client::QueryClient;
use super::key::QueryKey;
use super::state::QuerySnapshot;
use std::marker::PhantomData;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Keeps a query alive and lets the holder await changes.
///
/// Dropping the handle unregisters the observer; the entry becomes eligible
/// for eviction once its last observer is gone.
pub struct QuerySubscription<T> {
    client: QueryClient,
    key: QueryKey,
    rx: watch::Receiver<u64>,
    ticker: Option<JoinHandle<()>>,
    _data: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> QuerySubscription<T> {
    pub(crate) fn new(
        client: QueryClient,
        key: QueryKey,
        rx: watch::Receiver<u64>,
        ticker: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            client,
            key,
            rx,
            ticker,
            _data: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn snapshot(&self) -> QuerySnapshot<T> {
        self.client.snapshot(&self.key)
    }

    /// Wait for the entry to change. Returns `false` once the entry was
    /// removed from the cache and can no longer change.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until no request is outstanding for the entry.
    pub async fn wait_settled(&mut self) -> QuerySnapshot<T> {
        loop {
            let snapshot = self.snapshot();
            if !snapshot.is_fetching || !self.changed().await {
                return snapshot;
            }
        }
    }

    /// Manual refresh.
    pub fn refresh(&self) -> bool {
        self.client.refetch(&self.key)
    }
}

impl<T> Drop for QuerySubscription<T> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.client.release(&self.key);
    }
}
