//! Per-sector insights and plot filtering for the broad-universe console run.

use serde::{Deserialize, Serialize};

use crate::screen::{validate_finite, validate_non_negative};
use crate::{StockRecord, ValidationError};

pub const DEFAULT_OUTLIER_FACTOR: f64 = 1.5;

/// Admission rule for the insights universe.
///
/// A record is admitted when price, PE, sector and market cap are all present
/// and non-zero, `PE < max_pe` and market cap (crore) `> min_market_cap_cr`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniverseFilter {
    pub max_pe: f64,
    pub min_market_cap_cr: f64,
}

impl Default for UniverseFilter {
    fn default() -> Self {
        Self {
            max_pe: 30.0,
            min_market_cap_cr: 5_000.0,
        }
    }
}

impl UniverseFilter {
    pub fn admits(&self, record: &StockRecord) -> bool {
        let present = |value: Option<f64>| value.is_some_and(|v| v != 0.0);
        if !present(record.price) || !present(record.market_cap) {
            return false;
        }
        if record.sector.as_deref().map_or(true, str::is_empty) {
            return false;
        }
        let Some(pe) = record.pe_ratio.filter(|pe| *pe != 0.0) else {
            return false;
        };
        let market_cap_cr = record.market_cap_crore().unwrap_or_default();
        pe < self.max_pe && market_cap_cr > self.min_market_cap_cr
    }

    pub fn apply(&self, records: &[StockRecord]) -> Vec<StockRecord> {
        records
            .iter()
            .filter(|record| self.admits(record))
            .cloned()
            .collect()
    }
}

/// Summary of one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorInsight {
    pub sector: String,
    pub mean_pe: f64,
    /// Lowest PE in the sector.
    pub best_value: StockRecord,
    /// Highest ROE in the sector; `None` when no member reports ROE.
    pub high_growth: Option<StockRecord>,
    /// Members whose PE exceeds `outlier_factor` times the sector mean.
    pub outliers: Vec<StockRecord>,
}

/// Summarize `universe` per sector using [`DEFAULT_OUTLIER_FACTOR`].
pub fn summarize(universe: &[StockRecord]) -> Vec<SectorInsight> {
    summarize_with_factor(universe, DEFAULT_OUTLIER_FACTOR)
}

/// Summarize `universe` per sector, sectors in order of first appearance.
///
/// Records without a PE are ignored; [`UniverseFilter`] never admits them.
pub fn summarize_with_factor(universe: &[StockRecord], outlier_factor: f64) -> Vec<SectorInsight> {
    let mut sectors: Vec<&str> = Vec::new();
    for record in universe {
        let sector = record.sector_label();
        if !sectors.contains(&sector) {
            sectors.push(sector);
        }
    }

    sectors
        .into_iter()
        .filter_map(|sector| {
            let members: Vec<(&StockRecord, f64)> = universe
                .iter()
                .filter(|record| record.sector_label() == sector)
                .filter_map(|record| record.pe_ratio.map(|pe| (record, pe)))
                .collect();
            sector_insight(sector, &members, outlier_factor)
        })
        .collect()
}

fn sector_insight(
    sector: &str,
    members: &[(&StockRecord, f64)],
    outlier_factor: f64,
) -> Option<SectorInsight> {
    let (first, _) = members.first()?;
    let mean_pe = members.iter().map(|(_, pe)| pe).sum::<f64>() / members.len() as f64;

    let best_value = members
        .iter()
        .fold((*first, f64::INFINITY), |best, (record, pe)| {
            if *pe < best.1 {
                (*record, *pe)
            } else {
                best
            }
        })
        .0
        .clone();

    let high_growth = members
        .iter()
        .filter_map(|(record, _)| record.roe.map(|roe| (*record, roe)))
        .fold(None::<(&StockRecord, f64)>, |best, (record, roe)| match best {
            Some((_, best_roe)) if roe <= best_roe => best,
            _ => Some((record, roe)),
        })
        .map(|(record, _)| record.clone());

    let threshold = outlier_factor * mean_pe;
    let outliers = members
        .iter()
        .filter(|(_, pe)| *pe > threshold)
        .map(|(record, _)| (*record).clone())
        .collect();

    Some(SectorInsight {
        sector: sector.to_owned(),
        mean_pe,
        best_value,
        high_growth,
        outliers,
    })
}

/// Filters applied to the universe before plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotFilter {
    pub min_roe: f64,
    pub max_pe: f64,
    pub min_market_cap_cr: f64,
    /// Matched case-insensitively when set.
    pub sector: Option<String>,
}

impl Default for PlotFilter {
    fn default() -> Self {
        Self {
            min_roe: 0.0,
            max_pe: 100.0,
            min_market_cap_cr: 0.0,
            sector: None,
        }
    }
}

impl PlotFilter {
    /// Bounds must be finite. Only `min_roe` may be negative, since loss
    /// makers report negative ROE.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_finite("min_roe", self.min_roe)?;
        validate_non_negative("max_pe", self.max_pe)?;
        validate_non_negative("min_market_cap_cr", self.min_market_cap_cr)
    }

    pub fn matches(&self, record: &StockRecord) -> bool {
        let Some(roe) = record.roe else {
            return false;
        };
        let pe_ok = record.pe_ratio.is_some_and(|pe| pe <= self.max_pe);
        let cap_ok = record
            .market_cap_crore()
            .is_some_and(|cap| cap >= self.min_market_cap_cr);
        let sector_ok = match self.sector.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) => record
                .sector
                .as_deref()
                .is_some_and(|sector| sector.eq_ignore_ascii_case(wanted)),
        };
        roe >= self.min_roe && pe_ok && cap_ok && sector_ok
    }

    pub fn apply(&self, records: &[StockRecord]) -> Vec<StockRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}
