//! User preference flags persisted under `chainfolio.prefs.*`.
//!
//! Values are stored as strings in a key/value [`PreferenceStore`] (browser
//! local storage, a JSON file, memory). Loading never fails on bad data: an
//! absent or unparsable field falls back to its default and is logged.

use crate::error::ErrorEnvelope;
use crate::shared::TokenSymbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub const KEY_AUTO_REFRESH: &str = "chainfolio.prefs.autoRefresh";
pub const KEY_REFRESH_INTERVAL: &str = "chainfolio.prefs.refreshInterval";
pub const KEY_SHOW_TICKER: &str = "chainfolio.prefs.showTicker";
pub const KEY_TICKER_SYMBOLS: &str = "chainfolio.prefs.tickerSymbols";

pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Error, Debug)]
pub enum PreferenceStoreError {
    #[error("preference file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference file is not a JSON object: {0}")]
    Format(#[from] serde_json::Error),
}

/// String key/value persistence.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceStoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError>;
}

// ─── Preferences ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
    pub show_ticker: bool,
    pub ticker_symbols: Vec<TokenSymbol>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_interval: Duration::from_secs(60),
            show_ticker: true,
            ticker_symbols: ["ETH", "BTC", "USDC"]
                .into_iter()
                .filter_map(|s| TokenSymbol::parse(s).ok())
                .collect(),
        }
    }
}

impl Preferences {
    /// Load every field, defaulting the ones that are missing or invalid.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();
        Self {
            auto_refresh: read(store, KEY_AUTO_REFRESH, parse_bool).unwrap_or(defaults.auto_refresh),
            refresh_interval: read(store, KEY_REFRESH_INTERVAL, parse_interval)
                .unwrap_or(defaults.refresh_interval),
            show_ticker: read(store, KEY_SHOW_TICKER, parse_bool).unwrap_or(defaults.show_ticker),
            ticker_symbols: read(store, KEY_TICKER_SYMBOLS, parse_symbols)
                .unwrap_or(defaults.ticker_symbols),
        }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), PreferenceStoreError> {
        store.set(KEY_AUTO_REFRESH, &self.auto_refresh.to_string())?;
        store.set(KEY_REFRESH_INTERVAL, &self.refresh_interval.as_secs().to_string())?;
        store.set(KEY_SHOW_TICKER, &self.show_ticker.to_string())?;
        let symbols: Vec<&str> = self.ticker_symbols.iter().map(TokenSymbol::as_str).collect();
        store.set(KEY_TICKER_SYMBOLS, &serde_json::to_string(&symbols)?)?;
        Ok(())
    }

    /// Refetch period to hand to the query cache; `None` when auto-refresh is off.
    pub fn refetch_interval(&self) -> Option<Duration> {
        self.auto_refresh.then_some(self.refresh_interval)
    }

    /// Set the interval, rejecting values outside the allowed window.
    pub fn set_refresh_interval(&mut self, interval: Duration) -> Result<(), ErrorEnvelope> {
        if !(MIN_REFRESH_INTERVAL..=MAX_REFRESH_INTERVAL).contains(&interval) {
            return Err(ErrorEnvelope::validation(format!(
                "refresh interval must be between {}s and {}s",
                MIN_REFRESH_INTERVAL.as_secs(),
                MAX_REFRESH_INTERVAL.as_secs()
            )));
        }
        self.refresh_interval = interval;
        Ok(())
    }
}

fn read<T>(store: &dyn PreferenceStore, key: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "preference store read failed, using default");
            return None;
        }
    };
    let parsed = parse(&raw);
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "ignoring unparsable preference");
    }
    parsed
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_interval(raw: &str) -> Option<Duration> {
    let secs: u64 = raw.trim().parse().ok()?;
    let interval = Duration::from_secs(secs);
    (MIN_REFRESH_INTERVAL..=MAX_REFRESH_INTERVAL)
        .contains(&interval)
        .then_some(interval)
}

fn parse_symbols(raw: &str) -> Option<Vec<TokenSymbol>> {
    let symbols: Vec<TokenSymbol> = serde_json::from_str(raw).ok()?;
    let mut deduped: Vec<TokenSymbol> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        if !deduped.contains(&symbol) {
            deduped.push(symbol);
        }
    }
    Some(deduped)
}

// ─── Stores ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceStoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(transparent)]
struct FileContents(BTreeMap<String, String>);

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<FileContents, PreferenceStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(FileContents::default()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileContents::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.0.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut contents = self.read_all()?;
        contents.0.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&contents)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let prefs = Preferences::load(&MemoryStore::new());
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.refetch_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_round_trip_through_memory() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::default();
        prefs.auto_refresh = false;
        prefs.show_ticker = false;
        prefs.set_refresh_interval(Duration::from_secs(120)).unwrap();
        prefs.ticker_symbols = vec![TokenSymbol::parse("arb").unwrap()];
        prefs.save(&store).unwrap();

        let loaded = Preferences::load(&store);
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.refetch_interval(), None);
        assert_eq!(store.get(KEY_TICKER_SYMBOLS).unwrap().as_deref(), Some(r#"["ARB"]"#));
    }

    #[test]
    fn test_bad_fields_fall_back_individually() {
        let store = MemoryStore::new();
        store.set(KEY_AUTO_REFRESH, "false").unwrap();
        store.set(KEY_REFRESH_INTERVAL, "2").unwrap();
        store.set(KEY_SHOW_TICKER, "maybe").unwrap();
        store.set(KEY_TICKER_SYMBOLS, r#"["eth","ETH","btc"]"#).unwrap();

        let prefs = Preferences::load(&store);
        assert!(!prefs.auto_refresh);
        assert_eq!(prefs.refresh_interval, Duration::from_secs(60));
        assert!(prefs.show_ticker);
        let symbols: Vec<&str> = prefs.ticker_symbols.iter().map(|s| s.as_str()).collect();
        assert_eq!(symbols, vec!["ETH", "BTC"]);
    }

    #[test]
    fn test_interval_bounds() {
        let mut prefs = Preferences::default();
        assert!(prefs.set_refresh_interval(Duration::from_secs(5)).is_err());
        assert!(prefs.set_refresh_interval(Duration::from_secs(7200)).is_err());
        assert!(prefs.set_refresh_interval(Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut prefs = Preferences::default();
        prefs.show_ticker = false;
        prefs.save(&JsonFileStore::new(&path)).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(Preferences::load(&reopened), prefs);
        assert_eq!(reopened.get(KEY_SHOW_TICKER).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get(KEY_SHOW_TICKER), Err(PreferenceStoreError::Format(_))));
        assert_eq!(Preferences::load(&store), Preferences::default());
    }
}
