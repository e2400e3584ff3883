//! Data source trait and lookup error types.
//!
//! A [`DataSource`] maps one ticker to one [`TickerInfo`]. It is the only
//! seam to the outside world: the fetcher, the screens and the CLI never talk
//! to a provider directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use ferroscreen_core::{DataSource, FixtureSource, Symbol};
//!
//! async fn show(source: &FixtureSource) -> Result<(), ferroscreen_core::SourceError> {
//!     let info = source.lookup(&Symbol::parse("TCS.NS")?).await?;
//!     println!("{:?}", info.trailing_pe);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{Symbol, TickerInfo};

/// Identifiers of the bundled data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Yahoo,
    Fixture,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Fixture => "fixture",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    /// The provider does not know the ticker.
    NotFound,
    /// Network failure or unexpected upstream status.
    Unavailable,
    /// The provider throttled the request.
    RateLimited,
    /// The provider answered with a payload we could not read.
    InvalidResponse,
}

/// Structured lookup error. A failed lookup skips the ticker; it never aborts
/// the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn not_found(symbol: &Symbol) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: format!("no data for ticker '{symbol}'"),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidResponse => "source.invalid_response",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Future returned by [`DataSource::lookup`].
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<TickerInfo, SourceError>> + Send + 'a>>;

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the fetcher only ever awaits one
/// lookup at a time.
pub trait DataSource: Send + Sync {
    /// Returns the source identifier.
    fn id(&self) -> SourceId;

    /// Looks up one ticker.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the ticker is unknown, the provider is
    /// unreachable or throttling, or the payload cannot be read. Missing
    /// individual fields are *not* errors.
    fn lookup<'a>(&'a self, symbol: &'a Symbol) -> LookupFuture<'a>;
}
