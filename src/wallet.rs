//! Wallet sessions — what the connected wallet means for provider access.
//!
//! The wallet integration publishes the current session on a
//! `tokio::sync::watch` channel; [`watch_sessions`] turns that into a stream
//! of [`SessionState`] values the UI can render directly.

use crate::chain::{ChainRegistry, ChainSupport};
use crate::shared::{ChainId, EvmAddress};
use futures_util::Stream;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Kind of account the wallet connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    Evm,
    /// Non-EVM accounts cannot use the provider at all.
    Other,
}

/// The connected account as the wallet reports it.
///
/// `address` is kept verbatim; only an EVM session whose address parses
/// yields an [`EvmAddress`] for provider calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub address: String,
    pub chain_id: ChainId,
    pub wallet_kind: WalletKind,
}

impl WalletSession {
    pub fn evm(address: EvmAddress, chain_id: ChainId) -> Self {
        Self {
            address: address.to_string(),
            chain_id,
            wallet_kind: WalletKind::Evm,
        }
    }

    pub fn other(address: impl Into<String>, chain_id: ChainId) -> Self {
        Self {
            address: address.into(),
            chain_id,
            wallet_kind: WalletKind::Other,
        }
    }

    pub fn evm_address(&self) -> Option<EvmAddress> {
        match self.wallet_kind {
            WalletKind::Evm => EvmAddress::parse(&self.address).ok(),
            WalletKind::Other => None,
        }
    }
}

/// Derived view of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// `None` while disconnected.
    pub session: Option<WalletSession>,
    pub support: ChainSupport,
    pub can_use_provider: bool,
}

impl SessionState {
    pub fn disconnected() -> Self {
        Self {
            session: None,
            support: ChainSupport::Unsupported,
            can_use_provider: false,
        }
    }

    pub fn derive(session: Option<&WalletSession>, registry: &ChainRegistry) -> Self {
        let Some(session) = session else {
            return Self::disconnected();
        };
        let support = registry.classify(session.chain_id);
        Self {
            session: Some(session.clone()),
            support,
            can_use_provider: session.evm_address().is_some() && support.is_supported(),
        }
    }

    /// Address to query the provider with, when the session has one.
    pub fn address(&self) -> Option<EvmAddress> {
        self.session.as_ref().and_then(WalletSession::evm_address)
    }
}

/// Yield the derived state now and after every change on `sessions`.
/// Ends when the sender is dropped.
pub fn watch_sessions(
    mut sessions: watch::Receiver<Option<WalletSession>>,
    registry: Arc<ChainRegistry>,
) -> impl Stream<Item = SessionState> {
    async_stream::stream! {
        let mut last: Option<SessionState> = None;
        loop {
            let state = {
                let current = sessions.borrow_and_update();
                SessionState::derive(current.as_ref(), &registry)
            };
            if last.as_ref() != Some(&state) {
                if let Some(session) = &state.session {
                    tracing::debug!(
                        chain_id = %session.chain_id,
                        support = %state.support,
                        can_use_provider = state.can_use_provider,
                        "wallet session changed"
                    );
                }
                last = Some(state.clone());
                yield state;
            }
            if sessions.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn wallet() -> EvmAddress {
        EvmAddress::parse("0x742d35Cc6634C0532925a3b844Bc454e4438f44e").unwrap()
    }

    #[test]
    fn test_derive() {
        let registry = ChainRegistry::default();
        let mainnet = SessionState::derive(Some(&WalletSession::evm(wallet(), ChainId(1))), &registry);
        assert_eq!(mainnet.support, ChainSupport::Supported);
        assert!(mainnet.can_use_provider);
        assert_eq!(mainnet.address(), Some(wallet()));

        let sepolia = SessionState::derive(Some(&WalletSession::evm(wallet(), ChainId(11155111))), &registry);
        assert_eq!(sepolia.support, ChainSupport::Testnet);
        assert!(!sepolia.can_use_provider);

        let other = WalletSession::other("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq", ChainId(1));
        let state = SessionState::derive(Some(&other), &registry);
        assert!(!state.can_use_provider);
        assert_eq!(state.address(), None);
        assert_eq!(state.session.map(|s| s.address).as_deref(), Some("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"));

        let garbled = WalletSession {
            address: "not-an-address".into(),
            ..WalletSession::evm(wallet(), ChainId(1))
        };
        assert!(!SessionState::derive(Some(&garbled), &registry).can_use_provider);
        assert_eq!(SessionState::derive(None, &registry), SessionState::disconnected());
    }

    #[tokio::test]
    async fn test_stream_follows_channel() {
        let (tx, rx) = watch::channel(None);
        let stream = watch_sessions(rx, Arc::new(ChainRegistry::default()));
        tokio::pin!(stream);

        assert_eq!(stream.next().await, Some(SessionState::disconnected()));

        tx.send(Some(WalletSession::evm(wallet(), ChainId(1)))).unwrap();
        let state = stream.next().await.unwrap();
        assert!(state.can_use_provider);

        tx.send(Some(WalletSession::evm(wallet(), ChainId(11155111)))).unwrap();
        let state = stream.next().await.unwrap();
        assert_eq!(state.support, ChainSupport::Testnet);
        assert!(!state.can_use_provider);

        drop(tx);
        assert_eq!(stream.next().await, None);
    }
}
