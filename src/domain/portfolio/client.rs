//! Portfolio sub-client — cached current value, value history, multi-chain overview.

use super::wire::{CurrentValueResponse, ValueChartResponse};
use super::{CurrentValue, PortfolioOverview, ValueHistory};
use crate::client::ChainfolioClient;
use crate::domain::{decode, Fetch};
use crate::error::ErrorEnvelope;
use crate::query::{KeyPrefix, QueryAggregate, QueryKey, QuerySubscription};
use crate::resource::ResourceKind;
use crate::shared::{ChainId, EvmAddress, TimeRange};
use futures_util::FutureExt;
use std::sync::Arc;

pub struct Portfolio<'a> {
    pub(crate) client: &'a ChainfolioClient,
}

impl<'a> Portfolio<'a> {
    pub fn current_value_key(address: &EvmAddress, chain_id: ChainId) -> QueryKey {
        QueryKey::new(ResourceKind::CurrentValue)
            .subject(address)
            .chain(chain_id)
    }

    pub fn value_history_key(address: &EvmAddress, chain_id: ChainId, range: TimeRange) -> QueryKey {
        QueryKey::new(ResourceKind::ValueHistory)
            .subject(address)
            .chain(chain_id)
            .param("range", range)
    }

    /// Current holdings value, served from cache when fresh.
    pub async fn current_value(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
    ) -> Result<Arc<CurrentValue>, ErrorEnvelope> {
        self.client.query.fetch(
            Self::current_value_key(address, chain_id),
            self.client.options(ResourceKind::CurrentValue),
            current_value_fetcher(self.client, address.clone(), chain_id),
        )
        .await
    }

    pub fn watch_current_value(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
    ) -> QuerySubscription<CurrentValue> {
        self.client.query.subscribe(
            Self::current_value_key(address, chain_id),
            self.client.options(ResourceKind::CurrentValue),
            current_value_fetcher(self.client, address.clone(), chain_id),
        )
    }

    pub async fn value_history(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
        range: TimeRange,
    ) -> Result<Arc<ValueHistory>, ErrorEnvelope> {
        self.client.query.fetch(
            Self::value_history_key(address, chain_id, range),
            self.client.options(ResourceKind::ValueHistory),
            value_history_fetcher(self.client, address.clone(), chain_id, range),
        )
        .await
    }

    pub fn watch_value_history(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
        range: TimeRange,
    ) -> QuerySubscription<ValueHistory> {
        self.client.query.subscribe(
            Self::value_history_key(address, chain_id, range),
            self.client.options(ResourceKind::ValueHistory),
            value_history_fetcher(self.client, address.clone(), chain_id, range),
        )
    }

    /// One wallet's current value across `chains`. Chains the provider
    /// cannot serve are skipped rather than reported as errors.
    pub fn overview<I>(&self, address: &EvmAddress, chains: I) -> OverviewHandle
    where
        I: IntoIterator<Item = ChainId>,
    {
        let owner = self.client.clone();
        let subject = address.clone();
        let aggregate = QueryAggregate::new(self.client.query.clone(), move |query, chain_id: &ChainId| {
            query.subscribe(
                Portfolio::current_value_key(&subject, *chain_id),
                owner.options(ResourceKind::CurrentValue),
                current_value_fetcher(&owner, subject.clone(), *chain_id),
            )
        });
        let mut handle = OverviewHandle {
            client: self.client.clone(),
            address: address.clone(),
            aggregate,
        };
        handle.set_chains(chains);
        handle
    }

    /// Drop every cached portfolio query for `address`.
    pub fn invalidate(&self, address: &EvmAddress) -> usize {
        self.client
            .query
            .invalidate(&KeyPrefix::resource(ResourceKind::CurrentValue).subject(address))
            + self
                .client
                .query
                .invalidate(&KeyPrefix::resource(ResourceKind::ValueHistory).subject(address))
    }
}

fn current_value_fetcher(
    client: &ChainfolioClient,
    address: EvmAddress,
    chain_id: ChainId,
) -> impl Fn() -> Fetch<CurrentValue> + Send + Sync + 'static {
    let http = client.http.clone();
    move || {
        let http = http.clone();
        let address = address.clone();
        async move {
            let resp = http.current_value(&address, chain_id).await?;
            let wire: CurrentValueResponse = decode(ResourceKind::CurrentValue, resp.data)?;
            Ok::<_, ErrorEnvelope>(CurrentValue::from_wire(address, chain_id, wire))
        }
        .boxed()
    }
}

fn value_history_fetcher(
    client: &ChainfolioClient,
    address: EvmAddress,
    chain_id: ChainId,
    range: TimeRange,
) -> impl Fn() -> Fetch<ValueHistory> + Send + Sync + 'static {
    let http = client.http.clone();
    move || {
        let http = http.clone();
        let address = address.clone();
        async move {
            let resp = http.value_history(&address, chain_id, range).await?;
            let wire: ValueChartResponse = decode(ResourceKind::ValueHistory, resp.data)?;
            Ok::<_, ErrorEnvelope>(ValueHistory::from_wire(address, chain_id, range, wire))
        }
        .boxed()
    }
}

/// Live multi-chain view for one wallet.
pub struct OverviewHandle {
    client: ChainfolioClient,
    address: EvmAddress,
    aggregate: QueryAggregate<ChainId, CurrentValue>,
}

impl OverviewHandle {
    /// Replace the chain set; unsupported chains are filtered out.
    pub fn set_chains<I: IntoIterator<Item = ChainId>>(&mut self, chains: I) {
        let registry = self.client.chains();
        let supported: Vec<ChainId> = chains
            .into_iter()
            .filter(|c| registry.can_use_provider(*c))
            .collect();
        self.aggregate.set_members(supported);
    }

    pub fn chains(&self) -> Vec<ChainId> {
        self.aggregate.members().copied().collect()
    }

    pub fn snapshot(&self) -> PortfolioOverview {
        let result = self.aggregate.result();
        PortfolioOverview {
            address: self.address.clone(),
            per_chain: result.data,
            is_loading: result.is_loading,
            is_refetching: result.is_refetching,
            error: result.error,
        }
    }

    pub async fn changed(&mut self) -> bool {
        self.aggregate.changed().await
    }

    pub async fn wait_settled(&mut self) -> PortfolioOverview {
        self.aggregate.wait_settled().await;
        self.snapshot()
    }

    pub fn refresh(&self) -> usize {
        self.aggregate.refresh()
    }
}
