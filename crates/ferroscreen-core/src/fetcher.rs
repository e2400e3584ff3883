//! Sequential ticker fetching.
//!
//! One lookup per ticker, awaited one at a time. A failed lookup becomes a
//! [`FetchFailure`] plus a warning and the run moves on; nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::{CacheMode, CacheStore};
use crate::data_source::{DataSource, SourceError};
use crate::domain::{RejectedTicker, TickerSelection};
use crate::{StockRecord, Symbol};

/// Failure code for ticker entries that never reached the source.
pub const INVALID_TICKER_CODE: &str = "ticker.invalid";

/// A ticker whose lookup failed, or an entry that was not a valid ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub ticker: String,
    pub code: String,
    pub message: String,
}

impl FetchFailure {
    fn new(ticker: &Symbol, error: &SourceError) -> Self {
        Self {
            ticker: ticker.to_string(),
            code: error.code().to_owned(),
            message: error.message().to_owned(),
        }
    }

    fn rejected(rejected: &RejectedTicker) -> Self {
        Self {
            ticker: rejected.input.clone(),
            code: INVALID_TICKER_CODE.to_owned(),
            message: rejected.reason.to_string(),
        }
    }

    /// User-facing warning line.
    pub fn warning(&self) -> String {
        format!("error loading {}: {}", self.ticker, self.message)
    }
}

/// Result of fetching a ticker list: resolved records in input order plus
/// the tickers that failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchReport {
    pub records: Vec<StockRecord>,
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn warnings(&self) -> Vec<String> {
        self.failures.iter().map(FetchFailure::warning).collect()
    }
}

/// Fetches [`StockRecord`]s from a [`DataSource`].
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn DataSource>,
    pause: Option<Duration>,
    cache: CacheStore,
}

impl Fetcher {
    /// Fetcher without pacing or caching.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            pause: None,
            cache: CacheStore::disabled(),
        }
    }

    /// Sleep for `delay` after each completed lookup except the last. A
    /// zero delay disables pacing.
    pub fn with_pacing(mut self, delay: Duration) -> Self {
        self.pause = (!delay.is_zero()).then_some(delay);
        self
    }

    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = cache;
        self
    }

    /// Look up every ticker in order.
    ///
    /// Never fails as a whole: a lookup error is logged, recorded in
    /// [`FetchReport::failures`] and the remaining tickers are still fetched.
    pub async fn fetch(&self, symbols: &[Symbol], mode: CacheMode) -> FetchReport {
        if mode == CacheMode::Use {
            if let Some(report) = self.cache.get(symbols).await {
                tracing::info!(tickers = symbols.len(), "serving fetch from memory cache");
                return report;
            }
        }

        let mut report = FetchReport::default();
        for (position, symbol) in symbols.iter().enumerate() {
            if position > 0 {
                if let Some(pause) = self.pause {
                    tokio::time::sleep(pause).await;
                }
            }

            tracing::debug!(ticker = %symbol, source = %self.source.id(), "looking up ticker");
            match self.source.lookup(symbol).await {
                Ok(info) => report
                    .records
                    .push(StockRecord::from_info(symbol.clone(), info)),
                Err(error) => {
                    tracing::warn!(
                        ticker = %symbol,
                        code = error.code(),
                        "error loading {symbol}: {}",
                        error.message()
                    );
                    report.failures.push(FetchFailure::new(symbol, &error));
                }
            }
        }

        tracing::info!(
            resolved = report.records.len(),
            failed = report.failures.len(),
            "fetch complete"
        );

        if mode == CacheMode::Use {
            self.cache.put(symbols, report.clone()).await;
        }
        report
    }

    /// Fetch the valid part of `selection`, then report each malformed entry
    /// as a failure alongside the lookup failures.
    pub async fn fetch_selection(
        &self,
        selection: &TickerSelection,
        mode: CacheMode,
    ) -> FetchReport {
        let mut report = self.fetch(&selection.symbols, mode).await;
        for rejected in &selection.rejected {
            tracing::warn!(
                input = %rejected.input,
                code = INVALID_TICKER_CODE,
                "skipping ticker '{}': {}",
                rejected.input,
                rejected.reason
            );
            report.failures.push(FetchFailure::rejected(rejected));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use super::*;
    use crate::data_source::{LookupFuture, SourceId};
    use crate::{FixtureSource, TickerInfo};

    struct CountingSource {
        inner: FixtureSource,
        calls: AtomicUsize,
    }

    impl DataSource for CountingSource {
        fn id(&self) -> SourceId {
            SourceId::Fixture
        }

        fn lookup<'a>(&'a self, symbol: &'a Symbol) -> LookupFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(symbol)
        }
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    fn counting_source() -> Arc<CountingSource> {
        let info = TickerInfo {
            short_name: Some(String::from("Infosys")),
            trailing_pe: Some(24.0),
            return_on_equity: Some(0.3),
            market_cap: Some(6e12),
            ..TickerInfo::default()
        };
        Arc::new(CountingSource {
            inner: FixtureSource::new().with_entry(symbol("INFY.NS"), info),
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn failures_do_not_abort_remaining_tickers() {
        let source = counting_source();
        let fetcher = Fetcher::new(source.clone());
        let symbols = vec![symbol("NOPE.NS"), symbol("INFY.NS")];

        let report = fetcher.fetch(&symbols, CacheMode::Use).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].ticker.as_str(), "INFY.NS");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].code, "source.not_found");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cached_fetch_skips_the_source() {
        let source = counting_source();
        let fetcher = Fetcher::new(source.clone()).with_cache(CacheStore::for_session());
        let symbols = vec![symbol("INFY.NS")];

        let first = fetcher.fetch(&symbols, CacheMode::Use).await;
        let second = fetcher.fetch(&symbols, CacheMode::Use).await;

        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bypass_neither_reads_nor_writes_cache() {
        let source = counting_source();
        let cache = CacheStore::for_session();
        let fetcher = Fetcher::new(source.clone()).with_cache(cache.clone());
        let symbols = vec![symbol("INFY.NS")];

        fetcher.fetch(&symbols, CacheMode::Bypass).await;
        fetcher.fetch(&symbols, CacheMode::Bypass).await;
        assert!(cache.get(&symbols).await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    /// Takes `latency` to answer every lookup.
    struct SlowSource {
        latency: Duration,
    }

    impl DataSource for SlowSource {
        fn id(&self) -> SourceId {
            SourceId::Yahoo
        }

        fn lookup<'a>(&'a self, _symbol: &'a Symbol) -> LookupFuture<'a> {
            Box::pin(async move {
                tokio::time::sleep(self.latency).await;
                Ok(TickerInfo::default())
            })
        }
    }

    #[tokio::test]
    async fn pacing_pauses_after_each_lookup_even_when_lookups_are_slow() {
        let step = Duration::from_millis(100);
        let fetcher = Fetcher::new(Arc::new(SlowSource { latency: step })).with_pacing(step);
        let symbols = vec![symbol("INFY.NS"), symbol("TCS.NS"), symbol("LT.NS")];

        let started = Instant::now();
        let report = fetcher.fetch(&symbols, CacheMode::Bypass).await;
        let elapsed = started.elapsed();

        assert_eq!(report.records.len(), 3);
        // Three lookups plus two pauses; none after the last lookup.
        assert!(elapsed >= step * 5, "elapsed {elapsed:?}");
        assert!(elapsed < step * 6 + Duration::from_millis(90), "elapsed {elapsed:?}");
    }

    #[test]
    fn zero_pacing_disables_the_pause() {
        let fetcher = Fetcher::new(counting_source()).with_pacing(Duration::ZERO);
        assert!(fetcher.pause.is_none());
    }

    #[tokio::test]
    async fn malformed_entries_become_failures_and_valid_tickers_are_fetched() {
        let source = counting_source();
        let fetcher = Fetcher::new(source.clone());
        let selection = crate::select_ticker_list("INFY.NS, BRK B");

        let report = fetcher.fetch_selection(&selection, CacheMode::Use).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticker, "BRK B");
        assert_eq!(report.failures[0].code, INVALID_TICKER_CODE);
        assert_eq!(
            report.warnings(),
            vec![String::from(
                "error loading BRK B: symbol contains invalid character ' ' at index 3"
            )]
        );
        // Only the valid ticker reached the source.
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
