//! Shared helpers for the integration suites.

use std::sync::Arc;

pub use ferroscreen_core::{parse_tickers, CacheMode, FetchReport, Fetcher, FixtureSource};

/// Fetch `tickers` from an in-memory fixture body, bypassing the cache.
pub async fn fetch_fixture(body: &str, tickers: &[&str]) -> FetchReport {
    let source = FixtureSource::from_json(body).expect("fixture parses");
    let fetcher = Fetcher::new(Arc::new(source));
    let symbols = parse_tickers(tickers).expect("valid tickers");
    fetcher.fetch(&symbols, CacheMode::Bypass).await
}
