use std::io::{BufRead, Write};
use std::sync::Arc;

use ferroscreen_core::insights::{summarize_with_factor, PlotFilter};
use ferroscreen_core::{
    select_ticker_list, CacheMode, DataSource, Fetcher, ScreenerConfig, SourceId, Symbol,
    TickerSelection,
};

use super::resolve_tickers;
use crate::chart;
use crate::cli::{Cli, InsightsArgs, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::prompt::Prompter;

/// Returns the number of tickers that failed to load.
pub async fn run(
    args: &InsightsArgs,
    cli: &Cli,
    config: &ScreenerConfig,
    source: Arc<dyn DataSource>,
) -> Result<usize, CliError> {
    let prompting = !args.no_prompt && cli.format == OutputFormat::Table;
    let mut prompt = Prompter::stdio();

    // Flag bounds are checked before the paced fetch starts.
    let flags = flag_filter(args);
    flags.validate()?;

    let default = config.universe_symbols()?;
    let selection = if prompting && args.tickers.is_empty() {
        ask_tickers(&mut prompt, default)?
    } else {
        resolve_tickers(&args.tickers, default)
    };

    let remote = source.id() == SourceId::Yahoo;
    let mut fetcher = Fetcher::new(source);
    if remote {
        fetcher = fetcher.with_pacing(config.console.pacing());
    }
    let report = fetcher.fetch_selection(&selection, CacheMode::Bypass).await;

    let universe = config.console.universe_filter().apply(&report.records);
    let sectors = summarize_with_factor(&universe, config.console.outlier_factor);
    tracing::info!(
        fetched = report.records.len(),
        universe = universe.len(),
        sectors = sectors.len(),
        "insights universe built"
    );

    if cli.format == OutputFormat::Json {
        let plotted = flags.apply(&universe);
        output::render_insights_json(universe.len(), &sectors, &plotted, &report, cli.pretty)?;
        return Ok(report.failures.len());
    }

    println!("{}", output::insights_text(&sectors));

    let filter = if prompting {
        prompt.say("")?;
        prompt.say("Apply custom filters (blank keeps the default):")?;
        prompt_filter(args, &mut prompt)?
    } else {
        flags
    };

    let points = chart::plot_points(&filter.apply(&universe));
    println!();
    if points.is_empty() {
        println!("{}", output::no_plot_matches());
    } else {
        chart::render(&points, args.width, args.height);
        println!("{}", output::plot_summary(&points));
    }

    output::print_warnings(&report.warnings());
    Ok(report.failures.len())
}

fn ask_tickers<R: BufRead, W: Write>(
    prompt: &mut Prompter<R, W>,
    default: Vec<Symbol>,
) -> Result<TickerSelection, CliError> {
    let answer = prompt
        .ask("Enter tickers (comma-separated) or press enter to use Nifty 50")?
        .unwrap_or_default();
    let selection = select_ticker_list(&answer);
    Ok(if selection.is_empty() {
        TickerSelection::from(default)
    } else {
        selection
    })
}

fn flag_filter(args: &InsightsArgs) -> PlotFilter {
    let defaults = PlotFilter::default();
    PlotFilter {
        min_roe: args.filter.min_roe.unwrap_or(defaults.min_roe),
        max_pe: args.filter.max_pe.unwrap_or(defaults.max_pe),
        min_market_cap_cr: args
            .filter
            .min_market_cap_cr
            .unwrap_or(defaults.min_market_cap_cr),
        sector: args.sector.clone(),
    }
}

/// Flags win; anything not given on the command line is asked for. A
/// combination that fails validation is reported and asked again.
fn prompt_filter<R: BufRead, W: Write>(
    args: &InsightsArgs,
    prompt: &mut Prompter<R, W>,
) -> Result<PlotFilter, CliError> {
    let defaults = PlotFilter::default();
    flag_filter(args).validate()?;

    loop {
        let min_roe = match args.filter.min_roe {
            Some(value) => value,
            None => prompt.ask_parsed("Minimum ROE % (e.g. 10)", defaults.min_roe)?,
        };
        let max_pe = match args.filter.max_pe {
            Some(value) => value,
            None => prompt.ask_parsed("Maximum PE ratio (e.g. 30)", defaults.max_pe)?,
        };
        let min_market_cap_cr = match args.filter.min_market_cap_cr {
            Some(value) => value,
            None => prompt.ask_parsed(
                "Minimum market cap in Cr (e.g. 50000)",
                defaults.min_market_cap_cr,
            )?,
        };
        let sector = match &args.sector {
            Some(sector) => Some(sector.clone()),
            None => prompt.ask_optional("Filter by sector (optional, e.g. Technology)")?,
        };

        let filter = PlotFilter {
            min_roe,
            max_pe,
            min_market_cap_cr,
            sector,
        };
        match filter.validate() {
            Ok(()) => return Ok(filter),
            Err(error) => prompt.say(&format!("  {error}"))?,
        }
    }
}
