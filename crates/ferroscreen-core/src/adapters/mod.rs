//! Bundled [`DataSource`](crate::DataSource) implementations.

mod fixture;
mod yahoo;

pub use fixture::FixtureSource;
pub use yahoo::{parse_quote_summary, YahooAdapter, YahooAuthManager};
