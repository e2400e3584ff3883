mod insights;
mod screen;

use std::sync::Arc;

use ferroscreen_core::screen::Thresholds;
use ferroscreen_core::{
    select_tickers, DataSource, FixtureSource, ScreenerConfig, Symbol, TickerSelection, YahooAdapter,
};

use crate::cli::{Cli, Command, ThresholdArgs};
use crate::error::CliError;

/// Run the selected command. Returns once output has been written.
pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let source = build_source(cli, &config)?;

    let failure_count = match &cli.command {
        Command::Screen(args) => screen::run(args, cli, &config, source).await?,
        Command::Insights(args) => insights::run(args, cli, &config, source).await?,
    };

    if cli.strict && failure_count > 0 {
        return Err(CliError::StrictModeViolation { failure_count });
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ScreenerConfig, CliError> {
    let mut config = ScreenerConfig::load(cli.config.as_deref())?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = timeout_ms;
        config.validate()?;
    }
    Ok(config)
}

fn build_source(cli: &Cli, config: &ScreenerConfig) -> Result<Arc<dyn DataSource>, CliError> {
    match &cli.fixtures {
        Some(path) => {
            let fixtures = FixtureSource::from_path(path)?;
            tracing::info!(path = %path.display(), tickers = fixtures.len(), "using fixture source");
            Ok(Arc::new(fixtures))
        }
        None => Ok(Arc::new(
            YahooAdapter::default().with_timeout_ms(config.request_timeout_ms),
        )),
    }
}

/// Split user tickers into valid symbols and malformed entries, falling
/// back to `default` when nothing was given.
fn resolve_tickers<S: AsRef<str>>(raw: &[S], default: Vec<Symbol>) -> TickerSelection {
    let selection = select_tickers(raw);
    if selection.is_empty() {
        TickerSelection::from(default)
    } else {
        selection
    }
}

/// Apply flag overrides on top of `base` and validate the result.
fn apply_thresholds(args: &ThresholdArgs, base: Thresholds) -> Result<Thresholds, CliError> {
    let thresholds = Thresholds {
        min_roe: args.min_roe.unwrap_or(base.min_roe),
        max_pe: args.max_pe.unwrap_or(base.max_pe),
        min_market_cap_cr: args.min_market_cap_cr.unwrap_or(base.min_market_cap_cr),
    };
    thresholds.validate()?;
    Ok(thresholds)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use ferroscreen_core::parse_tickers;
    use tempfile::NamedTempFile;

    use super::*;

    const FIXTURES: &str = r#"{
        "INFY.NS": {"shortName": "Infosys", "sector": "Technology", "trailingPE": 22.0,
                    "returnOnEquity": 0.31, "earningsQuarterlyGrowth": 0.30,
                    "marketCap": 6.1e12, "currentPrice": 1480.0}
    }"#;

    fn temp_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(body.as_bytes()).expect("write temp file");
        file
    }

    fn cli(fixtures: &NamedTempFile, config: &NamedTempFile, rest: &[&str]) -> Cli {
        let fixtures = fixtures.path().to_str().expect("utf8 path");
        let config = config.path().to_str().expect("utf8 path");
        let mut argv = vec![
            "ferroscreen",
            "--fixtures",
            fixtures,
            "--config",
            config,
            "--format",
            "json",
        ];
        argv.extend_from_slice(rest);
        Cli::try_parse_from(argv).expect("valid args")
    }

    #[tokio::test]
    async fn malformed_ticker_is_a_warning_unless_strict() {
        let fixtures = temp_file(FIXTURES);
        let config = temp_file("[thresholds]\nmin_roe = 20.0\n");

        let relaxed = cli(&fixtures, &config, &["screen", "INFY.NS, BRK B"]);
        assert!(run(&relaxed).await.is_ok());

        let strict = cli(&fixtures, &config, &["--strict", "screen", "INFY.NS, BRK B"]);
        assert!(matches!(
            run(&strict).await,
            Err(CliError::StrictModeViolation { failure_count: 1 })
        ));
    }

    #[tokio::test]
    async fn invalid_config_file_fails_before_any_fetch() {
        let fixtures = temp_file(FIXTURES);
        let config = temp_file("[thresholds]\nmax_pe = 0.0\n");

        let error = run(&cli(&fixtures, &config, &["screen", "INFY.NS"]))
            .await
            .expect_err("max_pe must be positive");
        assert_eq!(error.exit_code(), 2);
    }

    #[tokio::test]
    async fn insights_rejects_bad_plot_flags_and_accepts_negative_roe() {
        let fixtures = temp_file(FIXTURES);
        let config = temp_file("");

        let bad = cli(&fixtures, &config, &["insights", "INFY.NS", "--max-pe", "-1"]);
        assert!(matches!(run(&bad).await, Err(CliError::Validation(_))));

        let loss_makers = cli(&fixtures, &config, &["insights", "INFY.NS", "--min-roe", "-5"]);
        assert!(run(&loss_makers).await.is_ok());
    }

    #[test]
    fn empty_ticker_args_use_default_list() {
        let default = parse_tickers(["TCS.NS"]).expect("valid default");
        let resolved = resolve_tickers::<String>(&[], default.clone());
        assert_eq!(resolved.symbols, default);

        let given = vec![String::from("infy.ns, lt.ns")];
        let resolved = resolve_tickers(&given, default);
        let names: Vec<&str> = resolved.symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["INFY.NS", "LT.NS"]);
    }

    #[test]
    fn malformed_ticker_args_keep_the_valid_ones() {
        let default = parse_tickers(["TCS.NS"]).expect("valid default");
        let given = vec![String::from("INFY.NS"), String::from("BRK B,LT.NS")];

        let resolved = resolve_tickers(&given, default);

        let names: Vec<&str> = resolved.symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["INFY.NS", "LT.NS"]);
        assert_eq!(resolved.rejected.len(), 1);
        assert_eq!(resolved.rejected[0].input, "BRK B");

        // Only malformed input still counts as an explicit list.
        let only_bad = resolve_tickers(&["BRK B"], parse_tickers(["TCS.NS"]).expect("valid"));
        assert!(only_bad.symbols.is_empty());
        assert_eq!(only_bad.rejected.len(), 1);
    }

    #[test]
    fn threshold_flags_override_config_values() {
        let args = ThresholdArgs {
            max_pe: Some(40.0),
            ..ThresholdArgs::default()
        };
        let thresholds = apply_thresholds(&args, Thresholds::default()).expect("valid");
        assert_eq!(thresholds.max_pe, 40.0);
        assert_eq!(thresholds.min_roe, 15.0);

        let negative = ThresholdArgs {
            min_roe: Some(-3.0),
            ..ThresholdArgs::default()
        };
        assert!(matches!(
            apply_thresholds(&negative, Thresholds::default()),
            Err(CliError::Validation(_))
        ));
    }
}
