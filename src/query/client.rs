//! Query cache & retry engine — `QueryClient`.
//!
//! One entry per [`QueryKey`]. Reads either return cached data (fresh, or
//! stale while a background revalidation runs) or join the single shared
//! in-flight request for the key. Each request runs in its own task, so a
//! caller dropping interest never cancels work other callers still await.
//!
//! Every request carries the entry's generation at start. Invalidation bumps
//! the generation, so a response that lands afterwards is discarded instead
//! of reviving data the caller asked to throw away.

use super::key::{KeyPrefix, QueryKey};
use super::retry::RetryPolicy;
use super::state::{QueryOptions, QuerySnapshot, QueryStatus};
use super::subscription::QuerySubscription;
use crate::error::ErrorEnvelope;

use futures_util::future::{abortable, AbortHandle, BoxFuture, Shared};
use futures_util::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub(crate) type AnyData = Arc<dyn Any + Send + Sync>;
type FetchResult = Result<AnyData, ErrorEnvelope>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct InFlight {
    future: SharedFetch,
    abort: AbortHandle,
}

struct Entry {
    data: Option<AnyData>,
    fetched_at: Option<Instant>,
    error: Option<ErrorEnvelope>,
    error_at: Option<Instant>,
    options: QueryOptions,
    fetcher: Fetcher,
    in_flight: Option<InFlight>,
    generation: u64,
    subscribers: usize,
    last_access: Instant,
    version: watch::Sender<u64>,
}

impl Entry {
    fn new(options: QueryOptions, fetcher: Fetcher, now: Instant) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            data: None,
            fetched_at: None,
            error: None,
            error_at: None,
            options,
            fetcher,
            in_flight: None,
            generation: 0,
            subscribers: 0,
            last_access: now,
            version,
        }
    }

    fn status(&self, now: Instant) -> QueryStatus {
        match (&self.data, self.fetched_at) {
            (Some(_), Some(at)) if now.duration_since(at) < self.options.stale_after => {
                QueryStatus::Fresh
            }
            (Some(_), _) => QueryStatus::Stale,
            (None, _) if self.in_flight.is_some() => QueryStatus::Fetching,
            (None, _) => QueryStatus::Absent,
        }
    }

    /// Stale data is revalidated on read unless the last attempt failed;
    /// after a failure only an explicit refetch tries again.
    fn wants_background_refresh(&self, now: Instant) -> bool {
        self.status(now) == QueryStatus::Stale && self.error.is_none() && self.in_flight.is_none()
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey, now: Instant) -> QuerySnapshot<T> {
        QuerySnapshot {
            key: key.clone(),
            status: self.status(now),
            data: self.data.clone().and_then(|d| d.downcast::<T>().ok()),
            error: self.error.clone(),
            is_fetching: self.in_flight.is_some(),
            updated_at: self.fetched_at,
            error_at: self.error_at,
        }
    }
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `key` still exists at `generation`.
    fn is_current(&self, key: &QueryKey, generation: u64) -> bool {
        self.lock().get(key).is_some_and(|e| e.generation == generation)
    }

    /// Apply a finished request to its entry, unless the entry moved on.
    fn settle(&self, key: &QueryKey, generation: u64, result: &FetchResult) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            tracing::debug!(key = %key, "entry removed before response arrived");
            return;
        };
        if entry.generation != generation {
            tracing::warn!(
                key = %key,
                started = generation,
                current = entry.generation,
                "discarding response for invalidated query"
            );
            return;
        }

        let now = Instant::now();
        entry.in_flight = None;
        entry.last_access = now;
        match result {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.fetched_at = Some(now);
                entry.error = None;
                entry.error_at = None;
            }
            Err(err) => {
                tracing::warn!(key = %key, kind = %err.kind, "query failed: {}", err.message);
                entry.error = Some(err.clone());
                entry.error_at = Some(now);
            }
        }
        entry.notify();
    }
}

/// Keyed cache with in-flight deduplication, stale-while-revalidate and retry.
///
/// Cheap to clone; clones share the same cache. Construct one per process
/// (or per session) and pass it to whatever needs it.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// Read through the cache.
    ///
    /// Fresh data is returned as is. Stale data is returned immediately and a
    /// background revalidation is started. Without data, the caller waits on
    /// the shared in-flight request (starting it if needed).
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Arc<T>, ErrorEnvelope>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ErrorEnvelope>> + Send + 'static,
    {
        let fetcher = erase(fetcher);
        let pending = {
            let mut entries = self.inner.lock();
            let now = Instant::now();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(options.clone(), fetcher.clone(), now));
            entry.options = options;
            entry.fetcher = fetcher;
            entry.last_access = now;

            if let Some(data) = entry.data.clone() {
                if entry.wants_background_refresh(now) {
                    tracing::debug!(key = %key, "serving stale data, revalidating");
                    self.start_fetch(&key, entry);
                }
                return downcast(&key, data);
            }
            self.join_fetch(&key, entry)
        };

        let data = pending.await?;
        downcast(&key, data)
    }

    /// Warm the cache without waiting for the result.
    pub fn prefetch<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ErrorEnvelope>> + Send + 'static,
    {
        let fetcher = erase(fetcher);
        let mut entries = self.inner.lock();
        let now = Instant::now();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(options.clone(), fetcher.clone(), now));
        entry.options = options;
        entry.fetcher = fetcher;
        if entry.data.is_none() || entry.wants_background_refresh(now) {
            self.start_fetch(&key, entry);
        }
    }

    /// Current state of `key` without triggering any request.
    pub fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QuerySnapshot<T> {
        let entries = self.inner.lock();
        match entries.get(key) {
            Some(entry) => entry.snapshot(key, Instant::now()),
            None => QuerySnapshot::absent(key.clone()),
        }
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        let entries = self.inner.lock();
        entries
            .get(key)
            .map_or(QueryStatus::Absent, |e| e.status(Instant::now()))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Subscriptions ────────────────────────────────────────────────────

    /// Register an observer for `key`. Absent or stale data is fetched; the
    /// returned handle keeps the entry alive and can await changes.
    pub fn subscribe<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> QuerySubscription<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ErrorEnvelope>> + Send + 'static,
    {
        let fetcher = erase(fetcher);
        let refetch_interval = options.refetch_interval;
        let receiver = {
            let mut entries = self.inner.lock();
            let now = Instant::now();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(options.clone(), fetcher.clone(), now));
            entry.options = options;
            entry.fetcher = fetcher;
            entry.subscribers += 1;
            entry.last_access = now;
            if (entry.data.is_none() && entry.in_flight.is_none()) || entry.wants_background_refresh(now) {
                self.start_fetch(&key, entry);
            }
            entry.version.subscribe()
        };

        let ticker = refetch_interval.map(|every| self.spawn_interval_refetch(key.clone(), every));
        QuerySubscription::new(self.clone(), key, receiver, ticker)
    }

    pub(crate) fn release(&self, key: &QueryKey) {
        let mut entries = self.inner.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            entry.last_access = Instant::now();
        }
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.inner.lock().get(key).map_or(0, |e| e.subscribers)
    }

    fn spawn_interval_refetch(&self, key: QueryKey, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                QueryClient { inner }.refetch(&key);
            }
        })
    }

    // ── Revalidation triggers ────────────────────────────────────────────

    /// Manual refresh. Keeps displayed data; returns whether the key exists.
    pub fn refetch(&self, key: &QueryKey) -> bool {
        let mut entries = self.inner.lock();
        match entries.get_mut(key) {
            Some(entry) => {
                self.start_fetch(key, entry);
                true
            }
            None => false,
        }
    }

    /// Revalidate every subscribed entry matching `prefix`.
    pub fn refetch_matching(&self, prefix: &KeyPrefix) -> usize {
        let mut entries = self.inner.lock();
        let mut started = 0;
        for (key, entry) in entries.iter_mut() {
            if entry.subscribers > 0 && prefix.matches(key) {
                self.start_fetch(key, entry);
                started += 1;
            }
        }
        started
    }

    /// The UI regained focus.
    pub fn on_focus(&self) -> usize {
        tracing::debug!("focus regained, revalidating subscribed queries");
        self.refetch_matching(&KeyPrefix::all())
    }

    /// Connectivity came back.
    pub fn on_reconnect(&self) -> usize {
        tracing::debug!("reconnected, revalidating subscribed queries");
        self.refetch_matching(&KeyPrefix::all())
    }

    // ── Invalidation & eviction ──────────────────────────────────────────

    /// Force one key back to `Absent`; re-fetch if it is subscribed.
    pub fn invalidate_key(&self, key: &QueryKey) -> bool {
        let mut entries = self.inner.lock();
        match entries.get_mut(key) {
            Some(entry) => {
                self.reset(key, entry);
                true
            }
            None => false,
        }
    }

    /// Force every key matching `prefix` back to `Absent`.
    pub fn invalidate(&self, prefix: &KeyPrefix) -> usize {
        let mut entries = self.inner.lock();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if prefix.matches(key) {
                self.reset(key, entry);
                count += 1;
            }
        }
        tracing::debug!(count, "invalidated queries");
        count
    }

    fn reset(&self, key: &QueryKey, entry: &mut Entry) {
        entry.generation += 1;
        // The detached request still answers whoever already awaits it but
        // stops retrying, and `settle` drops its result.
        entry.in_flight = None;
        entry.data = None;
        entry.fetched_at = None;
        entry.error = None;
        entry.error_at = None;
        entry.notify();
        if entry.subscribers > 0 {
            self.start_fetch(key, entry);
        }
    }

    /// Drop entries idle past their `evict_after` with no subscribers and
    /// nothing in flight.
    pub fn collect_garbage(&self) -> usize {
        let mut entries = self.inner.lock();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, e| {
            e.subscribers > 0
                || e.in_flight.is_some()
                || now.duration_since(e.last_access) < e.options.evict_after
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = entries.len(), "evicted idle queries");
        }
        evicted
    }

    /// Run [`collect_garbage`](Self::collect_garbage) on an interval until
    /// the client is dropped.
    pub fn spawn_gc(&self, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                QueryClient { inner }.collect_garbage();
            }
        })
    }

    /// Abort outstanding requests nobody is waiting for.
    ///
    /// An unsubscribed entry whose shared request is held only by the cache
    /// and its driver task has no audience; aborting it surfaces nothing to
    /// anyone. Returns how many requests were aborted.
    pub fn cancel_idle(&self) -> usize {
        let mut entries = self.inner.lock();
        let mut aborted = 0;
        for (key, entry) in entries.iter_mut() {
            if entry.subscribers > 0 {
                continue;
            }
            let idle = entry
                .in_flight
                .as_ref()
                .and_then(|f| f.future.strong_count())
                .is_some_and(|holders| holders <= 2);
            if idle {
                if let Some(in_flight) = entry.in_flight.take() {
                    tracing::debug!(key = %key, "aborting unobserved request");
                    in_flight.abort.abort();
                    entry.notify();
                    aborted += 1;
                }
            }
        }
        aborted
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.inner.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    // ── Internal ─────────────────────────────────────────────────────────

    /// Start a request for `entry` unless one is already running.
    fn start_fetch(&self, key: &QueryKey, entry: &mut Entry) {
        if entry.in_flight.is_none() {
            entry.in_flight = Some(self.spawn_fetch(key, entry));
            entry.notify();
        }
    }

    /// Join the in-flight request for `entry`, or start one.
    fn join_fetch(&self, key: &QueryKey, entry: &mut Entry) -> SharedFetch {
        if let Some(in_flight) = &entry.in_flight {
            tracing::debug!(key = %key, "joining in-flight request");
            return in_flight.future.clone();
        }
        let in_flight = self.spawn_fetch(key, entry);
        let future = in_flight.future.clone();
        entry.in_flight = Some(in_flight);
        entry.notify();
        future
    }

    fn spawn_fetch(&self, key: &QueryKey, entry: &Entry) -> InFlight {
        let generation = entry.generation;
        let run = run_fetch(
            Arc::downgrade(&self.inner),
            key.clone(),
            generation,
            entry.fetcher.clone(),
            entry.options.retry.clone(),
        );
        let (run, abort) = abortable(run);
        let future = run
            .map(|outcome| {
                outcome.unwrap_or_else(|_| Err(ErrorEnvelope::network("request cancelled")))
            })
            .boxed()
            .shared();

        tokio::spawn(future.clone());
        InFlight { future, abort }
    }
}

async fn run_fetch(
    inner: Weak<Inner>,
    key: QueryKey,
    generation: u64,
    fetcher: Fetcher,
    retry: RetryPolicy,
) -> FetchResult {
    let mut attempt = 0;
    let result = loop {
        match fetcher().await {
            Ok(data) => break Ok(data),
            Err(err) if retry.should_retry(attempt, &err) => {
                let delay = retry.delay_for_attempt(attempt);
                tracing::debug!(
                    key = %key,
                    attempt = attempt + 1,
                    max = retry.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    kind = %err.kind,
                    "retrying query"
                );
                tokio::time::sleep(delay).await;
                let current = inner
                    .upgrade()
                    .is_some_and(|inner| inner.is_current(&key, generation));
                if !current {
                    tracing::debug!(key = %key, "query invalidated during backoff, giving up");
                    break Err(err);
                }
                attempt += 1;
            }
            Err(err) => break Err(err),
        }
    };

    if let Some(inner) = inner.upgrade() {
        inner.settle(&key, generation, &result);
    }
    result
}

fn erase<T, F, Fut>(fetcher: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ErrorEnvelope>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        async move { fut.await.map(|value| Arc::new(value) as AnyData) }.boxed()
    })
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, data: AnyData) -> Result<Arc<T>, ErrorEnvelope> {
    data.downcast::<T>().map_err(|_| {
        ErrorEnvelope::parse(format!("cached value for {} has an unexpected type", key))
    })
}
