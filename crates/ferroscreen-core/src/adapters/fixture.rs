use std::collections::BTreeMap;
use std::path::Path;

use crate::data_source::{DataSource, LookupFuture, SourceError, SourceId};
use crate::{CoreError, Symbol, TickerInfo};

/// In-memory data source for offline runs and tests.
///
/// A fixture file is a JSON object keyed by ticker whose values use the
/// provider's field names:
///
/// ```json
/// { "TCS.NS": { "shortName": "TCS", "sector": "Technology", "trailingPE": 29.8 } }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    entries: BTreeMap<Symbol, TickerInfo>,
    unavailable: BTreeMap<Symbol, String>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, symbol: Symbol, info: TickerInfo) -> Self {
        self.entries.insert(symbol, info);
        self
    }

    /// Make lookups of `symbol` fail as if the provider were unreachable.
    pub fn with_unavailable(mut self, symbol: Symbol, message: impl Into<String>) -> Self {
        self.unavailable.insert(symbol, message.into());
        self
    }

    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        let entries: BTreeMap<Symbol, TickerInfo> = serde_json::from_str(body)?;
        Ok(Self {
            entries,
            unavailable: BTreeMap::new(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let body = std::fs::read_to_string(path)?;
        Self::from_json(&body)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve(&self, symbol: &Symbol) -> Result<TickerInfo, SourceError> {
        if let Some(message) = self.unavailable.get(symbol) {
            return Err(SourceError::unavailable(message.clone()));
        }
        self.entries
            .get(symbol)
            .cloned()
            .ok_or_else(|| SourceError::not_found(symbol))
    }
}

impl DataSource for FixtureSource {
    fn id(&self) -> SourceId {
        SourceId::Fixture
    }

    fn lookup<'a>(&'a self, symbol: &'a Symbol) -> LookupFuture<'a> {
        let result = self.resolve(symbol);
        Box::pin(async move { result })
    }
}
