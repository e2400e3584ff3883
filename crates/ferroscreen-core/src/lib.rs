//! # Ferroscreen Core
//!
//! Fundamentals screening for exchange-listed equities.
//!
//! ## Overview
//!
//! - **Domain models** for tickers and per-ticker fundamentals
//! - **Data source trait** with a Yahoo Finance adapter and an offline fixture source
//! - **Fetcher** that resolves a ticker list sequentially, with optional pacing and caching
//! - **Screening strategies** over a market-cap-filtered universe
//! - **Sector insights** and plot filtering for broad-universe runs
//! - **Configuration** from TOML and environment variables
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo Finance and fixture data sources |
//! | [`cache`] | In-memory fetch cache |
//! | [`config`] | `ScreenerConfig` loading and validation |
//! | [`data_source`] | Data source trait and lookup errors |
//! | [`domain`] | `Symbol`, `TickerInfo`, `StockRecord`, `ScreenCandidate` |
//! | [`error`] | Core error types |
//! | [`fetcher`] | Sequential, paced fetching with per-ticker failures |
//! | [`http_client`] | HTTP client abstraction |
//! | [`insights`] | Sector summaries and plot filters |
//! | [`screen`] | Strategies, thresholds and top picks |
//! | [`universe`] | Built-in ticker lists |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ferroscreen_core::{parse_tickers, screen, CacheMode, Fetcher, Strategy, Thresholds, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Fetcher::new(Arc::new(YahooAdapter::default()));
//!     let symbols = parse_tickers(["TCS.NS", "INFY.NS"])?;
//!
//!     let report = fetcher.fetch(&symbols, CacheMode::Use).await;
//!     let outcome = screen(&report.records, Strategy::LowPeHighRoe, &Thresholds::default());
//!
//!     for pick in &outcome.top_picks {
//!         println!("{} -> {}", pick.sector_label(), pick.record.display_name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! A failed lookup never aborts a fetch; it is reported per ticker:
//!
//! ```rust
//! use ferroscreen_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::NotFound => "unknown ticker",
//!         SourceErrorKind::RateLimited => "slow down",
//!         SourceErrorKind::Unavailable | SourceErrorKind::InvalidResponse => "provider problem",
//!     }
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod insights;
pub mod screen;
pub mod universe;

// Adapter implementations
pub use adapters::{parse_quote_summary, FixtureSource, YahooAdapter, YahooAuthManager};

// Caching
pub use cache::{CacheMode, CacheStore};

// Configuration
pub use config::{ConsoleConfig, ScreenerConfig};

// Data source trait and types
pub use data_source::{DataSource, LookupFuture, SourceError, SourceErrorKind, SourceId};

// Domain models
pub use domain::{
    derive_peg, parse_tickers, round2, select_ticker_list, select_tickers, RejectedTicker,
    ScreenCandidate, StockRecord, Symbol, TickerInfo, TickerSelection, CRORE, UNKNOWN_SECTOR,
};

// Error types
pub use error::{CoreError, ValidationError};

// Fetching
pub use fetcher::{FetchFailure, FetchReport, Fetcher, INVALID_TICKER_CODE};

// HTTP client types
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Insights
pub use insights::{summarize, summarize_with_factor, PlotFilter, SectorInsight, UniverseFilter};

// Screening
pub use screen::{
    apply_strategy, prefilter, screen, sector_median_pe, top_picks, ScreenOutcome, Strategy,
    Thresholds,
};

// Built-in ticker lists
pub use universe::{DEFAULT_WATCHLIST, NIFTY_50};
