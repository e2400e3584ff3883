//! # Domain Models
//!
//! Canonical domain types for ferroscreen.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, upper-cased ticker |
//! | [`TickerInfo`] | Raw lookup result, every field optional |
//! | [`StockRecord`] | Flat per-ticker record with derived ROE % and PEG |
//! | [`ScreenCandidate`] | Record with PE, ROE and market cap present |
//!
//! Records are immutable once fetched; numeric fields that the provider
//! omits (or reports as non-finite) stay `None` rather than failing.

mod models;
mod symbol;

pub use models::{
    derive_peg, round2, ScreenCandidate, StockRecord, TickerInfo, CRORE, UNKNOWN_SECTOR,
};
pub use symbol::{
    parse_tickers, select_ticker_list, select_tickers, RejectedTicker, Symbol, TickerSelection,
};
