//! Runtime configuration.
//!
//! Precedence, lowest first: built-in defaults, an optional TOML file,
//! environment variables, then command-line flags applied by the caller.
//!
//! ```toml
//! request_timeout_ms = 8000
//! default_watchlist = ["TCS.NS", "INFY.NS"]
//!
//! [thresholds]
//! min_roe = 18.0
//!
//! [console]
//! pacing_ms = 1000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::insights::{UniverseFilter, DEFAULT_OUTLIER_FACTOR};
use crate::screen::{validate_non_negative, Thresholds};
use crate::universe::{to_owned_list, DEFAULT_WATCHLIST, NIFTY_50};
use crate::{parse_tickers, CoreError, Symbol, ValidationError};

pub const ENV_TIMEOUT_MS: &str = "FERROSCREEN_TIMEOUT_MS";
pub const ENV_PACING_MS: &str = "FERROSCREEN_PACING_MS";

/// Settings for the broad-universe `insights` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Delay between consecutive lookups.
    pub pacing_ms: u64,
    pub universe_max_pe: f64,
    pub universe_min_market_cap_cr: f64,
    pub outlier_factor: f64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let universe = UniverseFilter::default();
        Self {
            pacing_ms: 1_500,
            universe_max_pe: universe.max_pe,
            universe_min_market_cap_cr: universe.min_market_cap_cr,
            outlier_factor: DEFAULT_OUTLIER_FACTOR,
        }
    }
}

impl ConsoleConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn universe_filter(&self) -> UniverseFilter {
        UniverseFilter {
            max_pe: self.universe_max_pe,
            min_market_cap_cr: self.universe_min_market_cap_cr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    pub default_watchlist: Vec<String>,
    pub universe: Vec<String>,
    pub thresholds: Thresholds,
    pub console: ConsoleConfig,
    pub request_timeout_ms: u64,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            default_watchlist: to_owned_list(&DEFAULT_WATCHLIST),
            universe: to_owned_list(&NIFTY_50),
            thresholds: Thresholds::default(),
            console: ConsoleConfig::default(),
            request_timeout_ms: 10_000,
        }
    }
}

impl ScreenerConfig {
    pub fn from_toml_str(body: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(body)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let body = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loaded config file");
        Self::from_toml_str(&body)
    }

    /// Defaults, or the file at `path` when given, with environment
    /// overrides applied and the result validated.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ValidationError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`; empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = non_empty(lookup(ENV_TIMEOUT_MS)) {
            self.request_timeout_ms = parse_millis(ENV_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = non_empty(lookup(ENV_PACING_MS)) {
            self.console.pacing_ms = parse_millis(ENV_PACING_MS, &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.thresholds.validate()?;
        validate_non_negative("console.universe_max_pe", self.console.universe_max_pe)?;
        validate_non_negative(
            "console.universe_min_market_cap_cr",
            self.console.universe_min_market_cap_cr,
        )?;

        let factor = self.console.outlier_factor;
        if !factor.is_finite() || factor < 1.0 {
            return Err(ValidationError::InvalidOutlierFactor { value: factor });
        }
        if self.request_timeout_ms == 0 {
            return Err(ValidationError::InvalidConfigValue {
                key: "request_timeout_ms",
                reason: String::from("must be greater than zero"),
            });
        }

        self.watchlist_symbols()?;
        self.universe_symbols()?;
        Ok(())
    }

    pub fn watchlist_symbols(&self) -> Result<Vec<Symbol>, ValidationError> {
        non_empty_list(parse_tickers(&self.default_watchlist)?)
    }

    pub fn universe_symbols(&self) -> Result<Vec<Symbol>, ValidationError> {
        non_empty_list(parse_tickers(&self.universe)?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_millis(key: &'static str, value: &str) -> Result<u64, ValidationError> {
    value
        .parse::<u64>()
        .map_err(|err| ValidationError::InvalidConfigValue {
            key,
            reason: format!("'{value}' is not a millisecond count: {err}"),
        })
}

fn non_empty_list(symbols: Vec<Symbol>) -> Result<Vec<Symbol>, ValidationError> {
    if symbols.is_empty() {
        Err(ValidationError::EmptyTickerList)
    } else {
        Ok(symbols)
    }
}
