//! Chain registry and provider-compatibility resolver.
//!
//! Classification is a pure function over the static table: every chain id
//! maps to exactly one [`ChainSupport`], and unknown ids are `Unsupported`
//! rather than an error.

pub mod registry;

use crate::shared::ChainId;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub use registry::DEFAULT_CHAINS;

/// Static description of a known network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub id: u64,
    pub short_name: &'static str,
    pub is_testnet: bool,
    pub provider_supported: bool,
}

impl ChainDescriptor {
    pub fn chain_id(&self) -> ChainId {
        ChainId(self.id)
    }
}

/// Whether a chain can be served by the upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainSupport {
    Unsupported,
    Testnet,
    Supported,
}

impl ChainSupport {
    pub fn is_supported(&self) -> bool {
        matches!(self, ChainSupport::Supported)
    }
}

impl fmt::Display for ChainSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSupport::Unsupported => write!(f, "unsupported"),
            ChainSupport::Testnet => write!(f, "testnet"),
            ChainSupport::Supported => write!(f, "supported"),
        }
    }
}

/// Immutable table of known chains, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainDescriptor>,
    index: HashMap<u64, usize>,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::with_chains(DEFAULT_CHAINS.iter().copied())
    }
}

impl ChainRegistry {
    /// Build a registry from a host-provided table. Later duplicates of an id
    /// are ignored; table order is kept for suggestions.
    pub fn with_chains(chains: impl IntoIterator<Item = ChainDescriptor>) -> Self {
        let mut table = Vec::new();
        let mut index = HashMap::new();
        for chain in chains {
            if index.contains_key(&chain.id) {
                tracing::warn!(chain_id = chain.id, "duplicate chain descriptor ignored");
                continue;
            }
            index.insert(chain.id, table.len());
            table.push(chain);
        }
        Self {
            chains: table,
            index,
        }
    }

    pub fn lookup(&self, chain_id: ChainId) -> Option<&ChainDescriptor> {
        self.index.get(&chain_id.0).map(|&i| &self.chains[i])
    }

    pub fn classify(&self, chain_id: ChainId) -> ChainSupport {
        match self.lookup(chain_id) {
            None => ChainSupport::Unsupported,
            Some(chain) if chain.is_testnet => ChainSupport::Testnet,
            Some(chain) if !chain.provider_supported => ChainSupport::Unsupported,
            Some(_) => ChainSupport::Supported,
        }
    }

    pub fn can_use_provider(&self, chain_id: ChainId) -> bool {
        self.classify(chain_id).is_supported()
    }

    /// Mainnets the provider serves, for "switch network" suggestions.
    pub fn list_supported_mainnets(&self) -> Vec<&ChainDescriptor> {
        self.chains
            .iter()
            .filter(|c| !c.is_testnet && c.provider_supported)
            .collect()
    }

    pub fn all(&self) -> &[ChainDescriptor] {
        &self.chains
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_chains() {
        let registry = ChainRegistry::default();
        assert_eq!(registry.classify(ChainId(1)), ChainSupport::Supported);
        assert_eq!(registry.classify(ChainId(137)), ChainSupport::Supported);
        assert_eq!(registry.classify(ChainId(11155111)), ChainSupport::Testnet);
        assert_eq!(registry.classify(ChainId(5000)), ChainSupport::Unsupported);
    }

    #[test]
    fn test_unknown_chain_is_unsupported() {
        let registry = ChainRegistry::default();
        assert_eq!(registry.classify(ChainId(0)), ChainSupport::Unsupported);
        assert_eq!(registry.classify(ChainId(u64::MAX)), ChainSupport::Unsupported);
        assert!(!registry.can_use_provider(ChainId(987654321)));
    }

    #[test]
    fn test_testnet_wins_over_provider_flag() {
        let registry = ChainRegistry::with_chains([ChainDescriptor {
            id: 31337,
            short_name: "anvil",
            is_testnet: true,
            provider_supported: true,
        }]);
        assert_eq!(registry.classify(ChainId(31337)), ChainSupport::Testnet);
        assert!(!registry.can_use_provider(ChainId(31337)));
    }

    #[test]
    fn test_classification_is_total_over_sample() {
        let registry = ChainRegistry::default();
        for id in (0..200_000u64).step_by(7).chain(DEFAULT_CHAINS.iter().map(|c| c.id)) {
            let support = registry.classify(ChainId(id));
            match registry.lookup(ChainId(id)) {
                None => assert_eq!(support, ChainSupport::Unsupported),
                Some(c) if c.is_testnet => assert_eq!(support, ChainSupport::Testnet),
                Some(c) => assert_eq!(support.is_supported(), c.provider_supported),
            }
        }
    }

    #[test]
    fn test_supported_mainnets_excludes_testnets() {
        let registry = ChainRegistry::default();
        let mainnets = registry.list_supported_mainnets();
        assert_eq!(mainnets[0].id, 1);
        assert!(mainnets.iter().all(|c| !c.is_testnet && c.provider_supported));
        assert!(!mainnets.iter().any(|c| c.id == 11155111));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let registry = ChainRegistry::with_chains([
            ChainDescriptor { id: 7, short_name: "a", is_testnet: false, provider_supported: true },
            ChainDescriptor { id: 7, short_name: "b", is_testnet: true, provider_supported: false },
        ]);
        assert_eq!(registry.lookup(ChainId(7)).unwrap().short_name, "a");
        assert_eq!(registry.all().len(), 1);
    }
}
