//! In-memory caching of fetch results.
//!
//! Entries are keyed by the normalized ticker list and live only as long as
//! the process; nothing is written to disk.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::fetcher::FetchReport;
use crate::Symbol;

/// Defines how a fetch interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if an entry is present; otherwise fetch and store
    /// the report. (Default)
    #[default]
    Use,
    /// Always fetch and neither read nor write the cache.
    Bypass,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, FetchReport>,
    enabled: bool,
}

/// Thread-safe in-memory cache of [`FetchReport`]s. Clones share entries.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<RwLock<CacheInner>>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::for_session()
    }
}

impl CacheStore {
    /// Cache whose entries live until the process exits.
    pub fn for_session() -> Self {
        Self::build(true)
    }

    /// Cache that never stores anything.
    pub fn disabled() -> Self {
        Self::build(false)
    }

    fn build(enabled: bool) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                map: HashMap::new(),
                enabled,
            })),
        }
    }

    /// Cached report for exactly this ticker list.
    pub async fn get(&self, symbols: &[Symbol]) -> Option<FetchReport> {
        self.inner.read().await.map.get(&cache_key(symbols)).cloned()
    }

    pub async fn put(&self, symbols: &[Symbol], report: FetchReport) {
        let mut store = self.inner.write().await;
        if store.enabled {
            store.map.insert(cache_key(symbols), report);
        }
    }
}

fn cache_key(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
