//! CLI argument definitions for ferroscreen.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `screen` | Screen a watchlist with one of three strategies |
//! | `insights` | Sector insights and a PE vs ROE plot for a broad universe |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Exit with code 5 when any ticker failed to load |
//! | `--fixtures` | | Read fundamentals from a JSON file instead of Yahoo |
//! | `--config` | | TOML config file |
//! | `--timeout-ms` | config | Per-request timeout in ms |
//! | `-v` | | Raise log verbosity (repeatable) |
//!
//! # Examples
//!
//! ```bash
//! # Screen the default watchlist with plan 1
//! ferroscreen screen
//!
//! # PEG screen over two tickers, JSON output
//! ferroscreen screen TCS.NS,INFY.NS --strategy plan3 --format json --pretty
//!
//! # Nifty 50 insights without prompts
//! ferroscreen insights --no-prompt --min-roe 15
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use ferroscreen_core::screen::Strategy;
use ferroscreen_core::ValidationError;

/// Fundamentals screener for NSE equities.
#[derive(Debug, Parser)]
#[command(
    name = "ferroscreen",
    author,
    version,
    about = "Fundamentals screener for NSE equities",
    long_about = "ferroscreen fetches per-ticker fundamentals (PE, ROE, PEG, market cap, sector) \
and filters them with value and growth screens.\n\
\n\
  • screen: plan1 (low PE, high ROE), plan2 (PE below sector median), plan3 (PEG < 1)\n\
  • insights: best value, high growth and PE outliers per sector, plus a PE vs ROE plot\n\
\n\
Use 'ferroscreen <command> --help' for command-specific help."
)]
pub struct Cli {
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat tickers that failed to load as a failure (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Read fundamentals from a JSON fixture file instead of Yahoo Finance.
    #[arg(long, global = true, value_name = "FILE")]
    pub fixtures: Option<PathBuf>,

    /// TOML config file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in milliseconds; overrides config and environment.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log more (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and text.
    Table,
    /// Single JSON object.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Screen a watchlist with a value or growth strategy.
    Screen(ScreenArgs),
    /// Summarize sectors and plot PE against ROE.
    Insights(InsightsArgs),
}

/// Threshold overrides shared by both commands.
#[derive(Debug, Clone, Default, Args)]
pub struct ThresholdArgs {
    /// Minimum ROE in percent.
    #[arg(long, allow_negative_numbers = true)]
    pub min_roe: Option<f64>,

    /// Maximum trailing PE.
    #[arg(long, allow_negative_numbers = true)]
    pub max_pe: Option<f64>,

    /// Minimum market cap in crore.
    #[arg(long = "min-market-cap-cr", allow_negative_numbers = true)]
    pub min_market_cap_cr: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    /// Tickers, space or comma separated. Defaults to the configured watchlist.
    pub tickers: Vec<String>,

    /// plan1, plan2 or plan3.
    #[arg(long, default_value = "plan1", value_parser = parse_strategy)]
    pub strategy: Strategy,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Prompt for tickers, strategy and thresholds in a loop.
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,
}

#[derive(Debug, Args)]
pub struct InsightsArgs {
    /// Tickers, space or comma separated. Defaults to the Nifty 50.
    pub tickers: Vec<String>,

    #[command(flatten)]
    pub filter: ThresholdArgs,

    /// Only plot this sector (case-insensitive).
    #[arg(long)]
    pub sector: Option<String>,

    /// Use flag values and defaults instead of prompting.
    #[arg(long, default_value_t = false)]
    pub no_prompt: bool,

    /// Plot width in characters.
    #[arg(long, default_value_t = 120)]
    pub width: u32,

    /// Plot height in characters.
    #[arg(long, default_value_t = 40)]
    pub height: u32,
}

fn parse_strategy(value: &str) -> Result<Strategy, ValidationError> {
    value.parse()
}
