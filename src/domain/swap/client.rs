//! Swap sub-client — cached quotes and allowances.

use super::wire::{AllowanceResponse, QuoteResponse};
use super::{Allowance, SwapQuote};
use crate::client::ChainfolioClient;
use crate::domain::{decode, Fetch};
use crate::error::ErrorEnvelope;
use crate::query::{KeyPrefix, QueryKey};
use crate::resource::ResourceKind;
use crate::shared::{ChainId, EvmAddress, TokenAmount};
use futures_util::FutureExt;
use std::sync::Arc;

pub struct Swap<'a> {
    pub(crate) client: &'a ChainfolioClient,
}

impl<'a> Swap<'a> {
    pub fn quote_key(chain_id: ChainId, src: &EvmAddress, dst: &EvmAddress, amount: &TokenAmount) -> QueryKey {
        QueryKey::new(ResourceKind::SwapQuote)
            .subject(format!("{}>{}", src, dst))
            .chain(chain_id)
            .param("amount", amount)
    }

    pub fn allowance_key(chain_id: ChainId, token: &EvmAddress, wallet: &EvmAddress) -> QueryKey {
        QueryKey::new(ResourceKind::Allowance)
            .subject(wallet)
            .chain(chain_id)
            .param("token", token)
    }

    pub async fn quote(
        &self,
        chain_id: ChainId,
        src: &EvmAddress,
        dst: &EvmAddress,
        amount: &TokenAmount,
    ) -> Result<Arc<SwapQuote>, ErrorEnvelope> {
        if src == dst {
            return Err(ErrorEnvelope::validation("source and destination tokens must differ"));
        }
        let http = self.client.http.clone();
        let (src_owned, dst_owned, amount_owned) = (src.clone(), dst.clone(), amount.clone());
        let fetcher = move || -> Fetch<SwapQuote> {
            let http = http.clone();
            let (src, dst, amount) = (src_owned.clone(), dst_owned.clone(), amount_owned.clone());
            async move {
                let resp = http.swap_quote(chain_id, &src, &dst, &amount).await?;
                let wire: QuoteResponse = decode(ResourceKind::SwapQuote, resp.data)?;
                SwapQuote::from_wire(chain_id, src, dst, amount, wire)
            }
            .boxed()
        };
        self.client
            .query
            .fetch(
                Self::quote_key(chain_id, src, dst, amount),
                self.client.options(ResourceKind::SwapQuote),
                fetcher,
            )
            .await
    }

    pub async fn allowance(
        &self,
        chain_id: ChainId,
        token: &EvmAddress,
        wallet: &EvmAddress,
    ) -> Result<Arc<Allowance>, ErrorEnvelope> {
        let http = self.client.http.clone();
        let (token_owned, wallet_owned) = (token.clone(), wallet.clone());
        let fetcher = move || -> Fetch<Allowance> {
            let http = http.clone();
            let (token, wallet) = (token_owned.clone(), wallet_owned.clone());
            async move {
                let resp = http.allowance(chain_id, &token, &wallet).await?;
                let wire: AllowanceResponse = decode(ResourceKind::Allowance, resp.data)?;
                Allowance::from_wire(chain_id, token, wallet, wire)
            }
            .boxed()
        };
        self.client
            .query
            .fetch(
                Self::allowance_key(chain_id, token, wallet),
                self.client.options(ResourceKind::Allowance),
                fetcher,
            )
            .await
    }

    /// Drop cached allowances for `wallet`, e.g. after it sent an approval.
    pub fn invalidate_allowances(&self, wallet: &EvmAddress) -> usize {
        self.client
            .query
            .invalidate(&KeyPrefix::resource(ResourceKind::Allowance).subject(wallet))
    }
}
