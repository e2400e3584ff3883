//! Threshold screening strategies.
//!
//! Every strategy runs on the same pre-filtered universe: records with PE,
//! ROE and market cap present whose market cap (in crore) meets the floor.
//!
//! | Strategy | Keeps |
//! |----------|-------|
//! | [`Strategy::LowPeHighRoe`] (plan 1) | `PE <= max_pe` and `ROE >= min_roe` |
//! | [`Strategy::BelowSectorMedian`] (plan 2) | PE strictly below the sector median PE, then `ROE >= min_roe` |
//! | [`Strategy::GrowthAtReasonablePrice`] (plan 3) | `0 < PEG < 1` and `ROE > 15` |

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ScreenCandidate, StockRecord, ValidationError};

/// Plan 3 ROE floor (percent). Fixed; independent of [`Thresholds::min_roe`].
pub const GARP_MIN_ROE: f64 = 15.0;

/// Selectable screening strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    LowPeHighRoe,
    BelowSectorMedian,
    GrowthAtReasonablePrice,
}

impl Strategy {
    pub const ALL: [Self; 3] = [
        Self::LowPeHighRoe,
        Self::BelowSectorMedian,
        Self::GrowthAtReasonablePrice,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowPeHighRoe => "plan1",
            Self::BelowSectorMedian => "plan2",
            Self::GrowthAtReasonablePrice => "plan3",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LowPeHighRoe => "High ROE and Low PE (Plan 1)",
            Self::BelowSectorMedian => "PE < Sector Median (Plan 2)",
            Self::GrowthAtReasonablePrice => "PEG < 1 and ROE > 15% (Plan 3)",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "plan1" | "low_pe_high_roe" => Ok(Self::LowPeHighRoe),
            "2" | "plan2" | "below_sector_median" => Ok(Self::BelowSectorMedian),
            "3" | "plan3" | "growth_at_reasonable_price" | "peg" => {
                Ok(Self::GrowthAtReasonablePrice)
            }
            other => Err(ValidationError::InvalidStrategy {
                value: other.to_owned(),
            }),
        }
    }
}

/// User-tunable screening thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum ROE, percent.
    pub min_roe: f64,
    pub max_pe: f64,
    /// Minimum market capitalisation, crore.
    pub min_market_cap_cr: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_roe: 15.0,
            max_pe: 25.0,
            min_market_cap_cr: 5_000.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_negative("min_roe", self.min_roe)?;
        validate_non_negative("max_pe", self.max_pe)?;
        validate_non_negative("min_market_cap_cr", self.min_market_cap_cr)?;
        if self.max_pe == 0.0 {
            return Err(ValidationError::NonPositiveMaxPe { value: self.max_pe });
        }
        Ok(())
    }
}

pub(crate) fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteThreshold { field })
    }
}

pub(crate) fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeThreshold { field, value });
    }
    Ok(())
}

/// Screening result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenOutcome {
    pub strategy: Strategy,
    pub thresholds: Thresholds,
    /// Candidates that passed the common pre-filter.
    pub universe_size: usize,
    /// Matches sorted by ROE, highest first.
    pub matches: Vec<ScreenCandidate>,
    /// Highest-ROE match per sector.
    pub top_picks: Vec<ScreenCandidate>,
}

/// Run the pre-filter and `strategy` over `records`.
pub fn screen(records: &[StockRecord], strategy: Strategy, thresholds: &Thresholds) -> ScreenOutcome {
    let universe = prefilter(records, thresholds);
    let mut matches = apply_strategy(&universe, strategy, thresholds);
    sort_by_roe_desc(&mut matches);
    let top_picks = top_picks(&matches);

    tracing::debug!(
        strategy = %strategy,
        universe = universe.len(),
        matches = matches.len(),
        "screen complete"
    );

    ScreenOutcome {
        strategy,
        thresholds: *thresholds,
        universe_size: universe.len(),
        matches,
        top_picks,
    }
}

/// Drop records missing PE, ROE or market cap, then apply the market-cap floor.
pub fn prefilter(records: &[StockRecord], thresholds: &Thresholds) -> Vec<ScreenCandidate> {
    records
        .iter()
        .cloned()
        .filter_map(ScreenCandidate::from_record)
        .filter(|candidate| candidate.market_cap_cr() >= thresholds.min_market_cap_cr)
        .collect()
}

/// Apply one strategy to an already pre-filtered universe, preserving order.
///
/// For [`Strategy::BelowSectorMedian`] the sector medians are computed over
/// `universe` itself, so the result depends on which tickers were loaded.
pub fn apply_strategy(
    universe: &[ScreenCandidate],
    strategy: Strategy,
    thresholds: &Thresholds,
) -> Vec<ScreenCandidate> {
    match strategy {
        Strategy::LowPeHighRoe => universe
            .iter()
            .filter(|c| c.pe() <= thresholds.max_pe && c.roe() >= thresholds.min_roe)
            .cloned()
            .collect(),
        Strategy::BelowSectorMedian => {
            let medians = sector_median_pe(universe);
            let mut selected = Vec::new();
            for sector in sectors_in_order(universe) {
                let Some(median) = medians.get(sector) else {
                    continue;
                };
                selected.extend(
                    universe
                        .iter()
                        .filter(|c| c.sector_label() == sector && c.pe() < *median)
                        .cloned(),
                );
            }
            selected.retain(|c| c.roe() >= thresholds.min_roe);
            selected
        }
        Strategy::GrowthAtReasonablePrice => universe
            .iter()
            .filter(|c| {
                c.peg().is_some_and(|peg| peg > 0.0 && peg < 1.0) && c.roe() > GARP_MIN_ROE
            })
            .cloned()
            .collect(),
    }
}

/// Median PE per sector label over `universe`.
pub fn sector_median_pe(universe: &[ScreenCandidate]) -> BTreeMap<String, f64> {
    let mut by_sector: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for candidate in universe {
        by_sector
            .entry(candidate.sector_label().to_owned())
            .or_default()
            .push(candidate.pe());
    }

    by_sector
        .into_iter()
        .filter_map(|(sector, mut values)| median(&mut values).map(|m| (sector, m)))
        .collect()
}

/// Median of `values`; mean of the two middle values for even lengths.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Stable sort, highest ROE first.
pub fn sort_by_roe_desc(candidates: &mut [ScreenCandidate]) {
    candidates.sort_by(|a, b| b.roe().total_cmp(&a.roe()));
}

/// Highest-ROE candidate per sector, sectors in order of first appearance.
pub fn top_picks(matches: &[ScreenCandidate]) -> Vec<ScreenCandidate> {
    sectors_in_order(matches)
        .into_iter()
        .filter_map(|sector| {
            matches
                .iter()
                .filter(|c| c.sector_label() == sector)
                .reduce(|best, c| if c.roe() > best.roe() { c } else { best })
                .cloned()
        })
        .collect()
}

fn sectors_in_order(candidates: &[ScreenCandidate]) -> Vec<&str> {
    let mut sectors: Vec<&str> = Vec::new();
    for candidate in candidates {
        let sector = candidate.sector_label();
        if !sectors.contains(&sector) {
            sectors.push(sector);
        }
    }
    sectors
}
