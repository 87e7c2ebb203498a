//! History sub-client — wallet events and transaction detail.

use super::wire::{HistoryEventWire, HistoryEventsResponse};
use super::{TransactionEvent, TransactionHistory};
use crate::client::ChainfolioClient;
use crate::domain::{decode, Fetch};
use crate::error::ErrorEnvelope;
use crate::query::{KeyPrefix, QueryKey, QuerySubscription};
use crate::resource::ResourceKind;
use crate::shared::{ChainId, EvmAddress, HistoryLimit, TxHash};
use futures_util::FutureExt;
use std::sync::Arc;

pub struct History<'a> {
    pub(crate) client: &'a ChainfolioClient,
}

impl<'a> History<'a> {
    pub fn events_key(address: &EvmAddress, chain_id: ChainId, limit: HistoryLimit) -> QueryKey {
        QueryKey::new(ResourceKind::TransactionEvents)
            .subject(address)
            .chain(chain_id)
            .param("limit", limit.get())
    }

    pub fn detail_key(chain_id: ChainId, tx_hash: &TxHash) -> QueryKey {
        QueryKey::new(ResourceKind::TransactionDetail)
            .subject(tx_hash)
            .chain(chain_id)
    }

    /// Most recent `limit` events (1–1000). An out-of-range limit fails
    /// before touching the cache.
    pub async fn events(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
        limit: u32,
    ) -> Result<Arc<TransactionHistory>, ErrorEnvelope> {
        let limit = HistoryLimit::new(limit)?;
        self.client
            .query
            .fetch(
                Self::events_key(address, chain_id, limit),
                self.client.options(ResourceKind::TransactionEvents),
                events_fetcher(self.client, address.clone(), chain_id, limit),
            )
            .await
    }

    pub fn watch_events(
        &self,
        address: &EvmAddress,
        chain_id: ChainId,
        limit: u32,
    ) -> Result<QuerySubscription<TransactionHistory>, ErrorEnvelope> {
        let limit = HistoryLimit::new(limit)?;
        Ok(self.client.query.subscribe(
            Self::events_key(address, chain_id, limit),
            self.client.options(ResourceKind::TransactionEvents),
            events_fetcher(self.client, address.clone(), chain_id, limit),
        ))
    }

    /// A settled transaction; cached as immutable.
    pub async fn transaction(
        &self,
        chain_id: ChainId,
        tx_hash: &TxHash,
    ) -> Result<Arc<TransactionEvent>, ErrorEnvelope> {
        let http = self.client.http.clone();
        let hash = tx_hash.clone();
        let fetcher = move || -> Fetch<TransactionEvent> {
            let http = http.clone();
            let hash = hash.clone();
            async move {
                let resp = http.transaction_detail(chain_id, &hash).await?;
                let wire: HistoryEventWire = decode(ResourceKind::TransactionDetail, resp.data)?;
                TransactionEvent::try_from(wire)
            }
            .boxed()
        };
        self.client
            .query
            .fetch(
                Self::detail_key(chain_id, tx_hash),
                self.client.options(ResourceKind::TransactionDetail),
                fetcher,
            )
            .await
    }

    /// Drop cached event pages for `address` on every chain and limit.
    pub fn invalidate(&self, address: &EvmAddress) -> usize {
        self.client
            .query
            .invalidate(&KeyPrefix::resource(ResourceKind::TransactionEvents).subject(address))
    }
}

fn events_fetcher(
    client: &ChainfolioClient,
    address: EvmAddress,
    chain_id: ChainId,
    limit: HistoryLimit,
) -> impl Fn() -> Fetch<TransactionHistory> + Send + Sync + 'static {
    let http = client.http.clone();
    move || {
        let http = http.clone();
        let address = address.clone();
        async move {
            let resp = http.transaction_events(&address, chain_id, limit.get()).await?;
            let wire: HistoryEventsResponse = decode(ResourceKind::TransactionEvents, resp.data)?;
            TransactionHistory::from_wire(chain_id, limit.get(), wire)
        }
        .boxed()
    }
}
