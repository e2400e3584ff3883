use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Base currency units in one crore.
pub const CRORE: f64 = 1e7;

/// Sector label used when the source omits a sector.
pub const UNKNOWN_SECTOR: &str = "N/A";

/// Raw lookup result for one ticker, as reported by the data source.
///
/// Every field may be absent. Keys follow the provider's camelCase naming so
/// fixture files can be copied straight from a `quoteSummary` dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(rename = "trailingPE", default)]
    pub trailing_pe: Option<f64>,
    /// Fractional, e.g. `0.42` for 42%.
    #[serde(rename = "returnOnEquity", default)]
    pub return_on_equity: Option<f64>,
    /// Fractional year-over-year quarterly earnings growth.
    #[serde(rename = "earningsQuarterlyGrowth", default)]
    pub earnings_quarterly_growth: Option<f64>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<f64>,
    #[serde(rename = "currentPrice", default)]
    pub current_price: Option<f64>,
}

/// Flat per-ticker record produced by the fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub ticker: Symbol,
    pub company_name: String,
    pub sector: Option<String>,
    pub price: Option<f64>,
    pub pe_ratio: Option<f64>,
    /// Percentage.
    pub roe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub market_cap: Option<f64>,
}

impl StockRecord {
    /// Build a record from a raw lookup, deriving ROE percentage and PEG.
    pub fn from_info(ticker: Symbol, info: TickerInfo) -> Self {
        let pe_ratio = finite(info.trailing_pe);
        let roe = finite(info.return_on_equity)
            .filter(|value| *value != 0.0)
            .map(|value| value * 100.0);
        let peg_ratio = derive_peg(pe_ratio, finite(info.earnings_quarterly_growth));

        Self {
            ticker,
            company_name: info.short_name.unwrap_or_default(),
            sector: info
                .sector
                .map(|sector| sector.trim().to_owned())
                .filter(|sector| !sector.is_empty()),
            price: finite(info.current_price),
            pe_ratio,
            roe,
            peg_ratio,
            market_cap: finite(info.market_cap),
        }
    }

    pub fn sector_label(&self) -> &str {
        self.sector.as_deref().unwrap_or(UNKNOWN_SECTOR)
    }

    pub fn market_cap_crore(&self) -> Option<f64> {
        self.market_cap.map(|value| value / CRORE)
    }

    /// Name used in printouts; falls back to the ticker when the source
    /// had no short name.
    pub fn display_name(&self) -> &str {
        if self.company_name.is_empty() {
            self.ticker.as_str()
        } else {
            &self.company_name
        }
    }
}

/// A record with PE, ROE and market cap all present.
///
/// Only candidates take part in screening; use [`ScreenCandidate::from_record`]
/// to drop records missing a required field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenCandidate {
    #[serde(flatten)]
    pub record: StockRecord,
    #[serde(skip)]
    pe: f64,
    #[serde(skip)]
    roe: f64,
    market_cap_cr: f64,
}

impl ScreenCandidate {
    pub fn from_record(record: StockRecord) -> Option<Self> {
        let pe = record.pe_ratio?;
        let roe = record.roe?;
        let market_cap_cr = record.market_cap_crore()?;
        Some(Self {
            record,
            pe,
            roe,
            market_cap_cr,
        })
    }

    pub fn pe(&self) -> f64 {
        self.pe
    }

    pub fn roe(&self) -> f64 {
        self.roe
    }

    pub fn market_cap_cr(&self) -> f64 {
        self.market_cap_cr
    }

    pub fn peg(&self) -> Option<f64> {
        self.record.peg_ratio
    }

    pub fn ticker(&self) -> &Symbol {
        &self.record.ticker
    }

    pub fn sector_label(&self) -> &str {
        self.record.sector_label()
    }
}

/// PEG = PE / (growth * 100), rounded to 2 decimals; only for positive growth.
pub fn derive_peg(pe_ratio: Option<f64>, quarterly_growth: Option<f64>) -> Option<f64> {
    let pe = pe_ratio.filter(|pe| *pe != 0.0)?;
    let growth = quarterly_growth.filter(|growth| *growth > 0.0)?;
    Some(round2(pe / (growth * 100.0)))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
