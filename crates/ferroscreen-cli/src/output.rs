use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use ferroscreen_core::{FetchReport, ScreenCandidate, ScreenOutcome, SectorInsight, StockRecord};
use serde::Serialize;

use crate::chart::PlotPoint;
use crate::cli::OutputFormat;
use crate::error::CliError;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Serialize)]
struct ScreenPayload<'a> {
    #[serde(flatten)]
    outcome: &'a ScreenOutcome,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct InsightsPayload<'a> {
    universe_size: usize,
    sectors: &'a [SectorInsight],
    plot: &'a [StockRecord],
    warnings: Vec<String>,
}

pub fn print_json<T: Serialize>(payload: &T, pretty: bool) -> Result<(), CliError> {
    let body = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    println!("{body}");
    Ok(())
}

pub fn render_screen(
    outcome: &ScreenOutcome,
    report: &FetchReport,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(
            &ScreenPayload {
                outcome,
                warnings: report.warnings(),
            },
            pretty,
        ),
        OutputFormat::Table => {
            println!("{}", screen_text(outcome));
            print_warnings(&report.warnings());
            Ok(())
        }
    }
}

pub fn screen_text(outcome: &ScreenOutcome) -> String {
    let mut lines = vec![format!(
        "Strategy: {}  ({} of {} stocks matched)",
        outcome.strategy.label(),
        outcome.matches.len(),
        outcome.universe_size
    )];

    if outcome.matches.is_empty() {
        lines.push(String::from("No stocks match the selected criteria."));
        return lines.join("\n");
    }

    lines.push(matches_table(&outcome.matches).to_string());
    lines.push(String::new());
    lines.push(String::from("Sector-wise best picks"));
    lines.extend(outcome.top_picks.iter().map(pick_line));
    lines.join("\n")
}

pub fn matches_table(matches: &[ScreenCandidate]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Ticker", "Company", "Sector", "PE", "ROE %", "PEG", "MCap ₹ Cr",
        ]);

    for candidate in matches {
        let record = &candidate.record;
        table.add_row(vec![
            Cell::new(record.ticker.as_str()),
            Cell::new(record.display_name()),
            Cell::new(record.sector_label()),
            numeric(format!("{:.2}", candidate.pe())),
            numeric(format!("{:.2}", candidate.roe())),
            numeric(optional(candidate.peg())),
            numeric(format!("{:.0}", candidate.market_cap_cr())),
        ]);
    }
    table
}

/// `<sector> → <company> | PE: x | ROE: y% | PEG: z | MCap: ₹w Cr`
pub fn pick_line(pick: &ScreenCandidate) -> String {
    format!(
        "{} → {} | PE: {:.2} | ROE: {:.2}% | PEG: {} | MCap: ₹{:.0} Cr",
        pick.sector_label(),
        pick.record.display_name(),
        pick.pe(),
        pick.roe(),
        optional(pick.peg()),
        pick.market_cap_cr()
    )
}

pub fn render_insights_json(
    universe_size: usize,
    sectors: &[SectorInsight],
    plot: &[StockRecord],
    report: &FetchReport,
    pretty: bool,
) -> Result<(), CliError> {
    print_json(
        &InsightsPayload {
            universe_size,
            sectors,
            plot,
            warnings: report.warnings(),
        },
        pretty,
    )
}

pub fn insights_text(sectors: &[SectorInsight]) -> String {
    if sectors.is_empty() {
        return String::from("No stocks passed the universe filter.");
    }

    let rule = "-".repeat(50);
    let mut lines = vec![String::from("Sector-wise insights"), String::new()];
    for insight in sectors {
        lines.push(format!("Sector: {}", insight.sector));
        lines.push(format!(
            "Best Value: {} | PE: {}",
            insight.best_value.display_name(),
            optional(insight.best_value.pe_ratio)
        ));
        match &insight.high_growth {
            Some(record) => lines.push(format!(
                "High Growth: {} | ROE: {}%",
                record.display_name(),
                optional(record.roe)
            )),
            None => lines.push(String::from("High Growth: Data not available")),
        }
        if insight.outliers.is_empty() {
            lines.push(String::from("No extreme outliers."));
        } else {
            lines.push(String::from("Outliers (PE too high):"));
            for outlier in &insight.outliers {
                lines.push(format!(
                    "   - {} | PE: {}",
                    outlier.display_name(),
                    optional(outlier.pe_ratio)
                ));
            }
        }
        lines.push(rule.clone());
    }
    lines.join("\n")
}

pub fn no_plot_matches() -> &'static str {
    "No stocks match your filters."
}

pub fn plot_summary(points: &[PlotPoint]) -> String {
    format!("{} stock(s) plotted", points.len())
}

pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("warnings:");
    for warning in warnings {
        println!("  - {warning}");
    }
}

fn numeric(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| String::from(NOT_AVAILABLE), |v| format!("{v:.2}"))
}
