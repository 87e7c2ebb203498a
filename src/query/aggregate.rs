//! Aggregator hooks — a changing set of queries viewed as one result.
//!
//! A multi-chain portfolio is one query per chain; a price ticker is one query
//! per symbol. [`QueryAggregate`] owns one subscription per member and merges
//! their snapshots. Changing the member set only subscribes the new members,
//! so overlapping members keep their data on screen.

use super::client::QueryClient;
use super::subscription::QuerySubscription;
use crate::error::ErrorEnvelope;
use futures_util::future::select_all;
use std::collections::BTreeMap;
use std::sync::Arc;

type MemberFactory<K, T> = Arc<dyn Fn(&QueryClient, &K) -> QuerySubscription<T> + Send + Sync>;

/// Merged view over every member.
#[derive(Debug)]
pub struct AggregateResult<K, T> {
    /// Members that currently have data.
    pub data: BTreeMap<K, Arc<T>>,
    /// Nothing to show yet and some member is fetching.
    pub is_loading: bool,
    /// Some member is fetching while data is already on screen, including a
    /// newly added member's first request.
    pub is_refetching: bool,
    /// Most recent failure, unless a member succeeded after it.
    pub error: Option<ErrorEnvelope>,
}

impl<K, T> AggregateResult<K, T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub struct QueryAggregate<K: Ord, T> {
    client: QueryClient,
    factory: MemberFactory<K, T>,
    members: BTreeMap<K, QuerySubscription<T>>,
}

impl<K, T> QueryAggregate<K, T>
where
    K: Ord + Clone,
    T: Send + Sync + 'static,
{
    /// `factory` subscribes the query for one member.
    pub fn new<F>(client: QueryClient, factory: F) -> Self
    where
        F: Fn(&QueryClient, &K) -> QuerySubscription<T> + Send + Sync + 'static,
    {
        Self {
            client,
            factory: Arc::new(factory),
            members: BTreeMap::new(),
        }
    }

    pub fn with_members<I: IntoIterator<Item = K>>(mut self, members: I) -> Self {
        self.set_members(members);
        self
    }

    /// Replace the member set. Dropped members release their subscription;
    /// members present before and after are left untouched.
    pub fn set_members<I: IntoIterator<Item = K>>(&mut self, members: I) {
        let mut next = BTreeMap::new();
        for member in members {
            if next.contains_key(&member) {
                continue;
            }
            let subscription = match self.members.remove(&member) {
                Some(existing) => existing,
                None => (self.factory)(&self.client, &member),
            };
            next.insert(member, subscription);
        }
        let removed = self.members.len();
        self.members = next;
        if removed > 0 {
            tracing::debug!(removed, kept = self.members.len(), "aggregate members changed");
        }
    }

    pub fn members(&self) -> impl Iterator<Item = &K> {
        self.members.keys()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn result(&self) -> AggregateResult<K, T> {
        let mut data = BTreeMap::new();
        let mut is_fetching = false;
        let mut latest_error = None;
        let mut latest_success = None;

        for (member, subscription) in &self.members {
            let snapshot = subscription.snapshot();
            is_fetching |= snapshot.is_fetching;
            if let (Some(err), Some(at)) = (snapshot.error, snapshot.error_at) {
                if latest_error.as_ref().map_or(true, |(prev, _)| at > *prev) {
                    latest_error = Some((at, err));
                }
            }
            if let Some(at) = snapshot.updated_at {
                latest_success = latest_success.max(Some(at));
            }
            if let Some(value) = snapshot.data {
                data.insert(member.clone(), value);
            }
        }

        let error = match (latest_error, latest_success) {
            (Some((failed_at, _)), Some(ok_at)) if ok_at > failed_at => None,
            (error, _) => error.map(|(_, err)| err),
        };

        AggregateResult {
            is_loading: is_fetching && data.is_empty(),
            is_refetching: is_fetching && !data.is_empty(),
            data,
            error,
        }
    }

    /// Wait for any member to change. Returns `false` with no members.
    pub async fn changed(&mut self) -> bool {
        if self.members.is_empty() {
            return false;
        }
        let waits = self
            .members
            .values_mut()
            .map(|subscription| Box::pin(subscription.changed()));
        let (changed, _, _) = select_all(waits).await;
        changed
    }

    /// Wait until no member has a request outstanding.
    pub async fn wait_settled(&mut self) -> AggregateResult<K, T> {
        loop {
            let result = self.result();
            let busy = result.is_loading || result.is_refetching;
            if !busy || !self.changed().await {
                return result;
            }
        }
    }

    /// Manual refresh of every member.
    pub fn refresh(&self) -> usize {
        self.members.values().filter(|s| s.refresh()).count()
    }
}
