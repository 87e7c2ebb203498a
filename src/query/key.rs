//! Cache identity — `QueryKey` and prefix matching.

use crate::resource::ResourceKind;
use crate::shared::ChainId;
use serde::Serialize;
use std::fmt;

/// Ordered tuple `(resource, subject, chain?, params)`.
///
/// Structurally equal keys are the same logical request. A multi-valued
/// subject (a symbol set) is sorted and deduplicated on construction so the
/// order callers list it in does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QueryKey {
    pub resource: ResourceKind,
    pub subject: Vec<String>,
    pub chain_id: Option<ChainId>,
    pub params: Vec<(String, String)>,
}

impl QueryKey {
    pub fn new(resource: ResourceKind) -> Self {
        Self {
            resource,
            subject: Vec::new(),
            chain_id: None,
            params: Vec::new(),
        }
    }

    /// Single-valued subject (usually a wallet address).
    pub fn subject(mut self, subject: impl fmt::Display) -> Self {
        self.subject = vec![subject.to_string()];
        self
    }

    /// Set-valued subject; order-insensitive.
    pub fn subject_set<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        let mut subject: Vec<String> = items.into_iter().map(|s| s.to_string()).collect();
        subject.sort();
        subject.dedup();
        self.subject = subject;
        self
    }

    pub fn chain(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn param(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.resource, self.subject.join(","))?;
        if let Some(chain) = self.chain_id {
            write!(f, "@{}", chain)?;
        }
        for (name, value) in &self.params {
            write!(f, "?{}={}", name, value)?;
        }
        Ok(())
    }
}

// ─── KeyPrefix ───────────────────────────────────────────────────────────────

/// Leading components of a [`QueryKey`], used for bulk invalidation.
///
/// `KeyPrefix::resource(TransactionEvents).subject(addr)` matches every
/// events query for that wallet, on any chain and with any limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPrefix {
    resource: Option<ResourceKind>,
    subject: Option<Vec<String>>,
    chain_id: Option<ChainId>,
}

impl KeyPrefix {
    /// Matches every key.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn resource(resource: ResourceKind) -> Self {
        Self {
            resource: Some(resource),
            ..Self::default()
        }
    }

    pub fn subject(mut self, subject: impl fmt::Display) -> Self {
        self.subject = Some(vec![subject.to_string()]);
        self
    }

    pub fn chain(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        self.resource.map_or(true, |r| r == key.resource)
            && self.subject.as_ref().map_or(true, |s| *s == key.subject)
            && self.chain_id.map_or(true, |c| Some(c) == key.chain_id)
    }
}

impl From<&QueryKey> for KeyPrefix {
    fn from(key: &QueryKey) -> Self {
        Self {
            resource: Some(key.resource),
            subject: Some(key.subject.clone()),
            chain_id: key.chain_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_set_is_order_insensitive() {
        let a = QueryKey::new(ResourceKind::TokenPrice).subject_set(["ETH", "BTC", "ETH"]);
        let b = QueryKey::new(ResourceKind::TokenPrice).subject_set(["BTC", "ETH"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_params_distinguish_keys() {
        let base = QueryKey::new(ResourceKind::TransactionEvents)
            .subject("0xabc")
            .chain(ChainId(1));
        assert_ne!(base.clone().param("limit", 50), base.param("limit", 100));
    }

    #[test]
    fn test_prefix_matching() {
        let key = QueryKey::new(ResourceKind::TransactionEvents)
            .subject("0xabc")
            .chain(ChainId(1))
            .param("limit", 50);
        assert!(KeyPrefix::all().matches(&key));
        assert!(KeyPrefix::resource(ResourceKind::TransactionEvents).matches(&key));
        assert!(KeyPrefix::resource(ResourceKind::TransactionEvents)
            .subject("0xabc")
            .matches(&key));
        assert!(!KeyPrefix::resource(ResourceKind::TransactionEvents)
            .subject("0xdef")
            .matches(&key));
        assert!(!KeyPrefix::resource(ResourceKind::CurrentValue).matches(&key));
        assert!(KeyPrefix::all().chain(ChainId(1)).matches(&key));
        assert!(!KeyPrefix::all().chain(ChainId(10)).matches(&key));
    }

    #[test]
    fn test_display() {
        let key = QueryKey::new(ResourceKind::ValueHistory)
            .subject("0xabc")
            .chain(ChainId(137))
            .param("range", "1week");
        assert_eq!(key.to_string(), "value_history[0xabc]@137?range=1week");
    }
}
