use std::io::{BufRead, Write};
use std::sync::Arc;

use ferroscreen_core::screen::{screen, Strategy, Thresholds};
use ferroscreen_core::{
    select_ticker_list, CacheMode, CacheStore, DataSource, FetchReport, Fetcher, ScreenerConfig,
    Symbol, TickerSelection,
};

use super::{apply_thresholds, resolve_tickers};
use crate::cli::{Cli, OutputFormat, ScreenArgs};
use crate::error::CliError;
use crate::output;
use crate::prompt::Prompter;

const QUIT_WORDS: [&str; 3] = ["q", "quit", "exit"];

/// Returns the number of tickers that failed to load in the last run.
pub async fn run(
    args: &ScreenArgs,
    cli: &Cli,
    config: &ScreenerConfig,
    source: Arc<dyn DataSource>,
) -> Result<usize, CliError> {
    let thresholds = apply_thresholds(&args.thresholds, config.thresholds)?;
    let fetcher = Fetcher::new(source).with_cache(CacheStore::for_session());
    let default = config.watchlist_symbols()?;
    let render = Render {
        format: cli.format,
        pretty: cli.pretty,
    };

    if args.interactive {
        let mut prompt = Prompter::stdio();
        let session = Session {
            fetcher: &fetcher,
            default,
            render,
        };
        return session.run(&mut prompt, args.strategy, thresholds).await;
    }

    let selection = resolve_tickers(&args.tickers, default);
    let report = screen_once(&fetcher, &selection, args.strategy, &thresholds, render).await?;
    Ok(report.failures.len())
}

#[derive(Debug, Clone, Copy)]
struct Render {
    format: OutputFormat,
    pretty: bool,
}

async fn screen_once(
    fetcher: &Fetcher,
    selection: &TickerSelection,
    strategy: Strategy,
    thresholds: &Thresholds,
    render: Render,
) -> Result<FetchReport, CliError> {
    let report = fetcher.fetch_selection(selection, CacheMode::Use).await;
    let outcome = screen(&report.records, strategy, thresholds);
    output::render_screen(&outcome, &report, render.format, render.pretty)?;
    Ok(report)
}

/// Interactive loop. Fetches go through the session cache, so re-screening
/// an unchanged ticker list never hits the source again.
struct Session<'a> {
    fetcher: &'a Fetcher,
    default: Vec<Symbol>,
    render: Render,
}

impl Session<'_> {
    async fn run<R: BufRead, W: Write>(
        &self,
        prompt: &mut Prompter<R, W>,
        mut strategy: Strategy,
        mut thresholds: Thresholds,
    ) -> Result<usize, CliError> {
        prompt.say("Interactive screening. Blank answers keep the value shown; 'q' quits.")?;
        let mut failure_count = 0;

        loop {
            let Some(answer) = prompt.ask("Tickers (comma separated, blank for watchlist)")? else {
                break;
            };
            if QUIT_WORDS.contains(&answer.to_ascii_lowercase().as_str()) {
                break;
            }
            let mut selection = select_ticker_list(&answer);
            if selection.is_empty() {
                selection = TickerSelection::from(self.default.clone());
            }

            strategy = ask_strategy(prompt, strategy)?;
            thresholds = ask_thresholds(prompt, thresholds)?;

            let report =
                screen_once(self.fetcher, &selection, strategy, &thresholds, self.render).await?;
            failure_count = report.failures.len();
            prompt.say("")?;
        }

        Ok(failure_count)
    }
}

fn ask_strategy<R: BufRead, W: Write>(
    prompt: &mut Prompter<R, W>,
    current: Strategy,
) -> Result<Strategy, CliError> {
    loop {
        let label = format!("Strategy plan1/plan2/plan3 [{current}]");
        let Some(answer) = prompt.ask_optional(&label)? else {
            return Ok(current);
        };
        match answer.parse::<Strategy>() {
            Ok(strategy) => return Ok(strategy),
            Err(error) => prompt.say(&format!("  {error}"))?,
        }
    }
}

fn ask_thresholds<R: BufRead, W: Write>(
    prompt: &mut Prompter<R, W>,
    current: Thresholds,
) -> Result<Thresholds, CliError> {
    loop {
        let min_roe = prompt.ask_parsed(
            &format!("Minimum ROE % [{}]", current.min_roe),
            current.min_roe,
        )?;
        let max_pe =
            prompt.ask_parsed(&format!("Maximum PE [{}]", current.max_pe), current.max_pe)?;
        let min_market_cap_cr = prompt.ask_parsed(
            &format!("Minimum market cap, Cr [{}]", current.min_market_cap_cr),
            current.min_market_cap_cr,
        )?;

        let candidate = Thresholds {
            min_roe,
            max_pe,
            min_market_cap_cr,
        };
        match candidate.validate() {
            Ok(()) => return Ok(candidate),
            Err(error) => prompt.say(&format!("  {error}"))?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ferroscreen_core::{FixtureSource, LookupFuture, SourceId, TickerInfo, CRORE};

    use super::*;

    struct CountingSource {
        inner: FixtureSource,
        calls: AtomicUsize,
    }

    impl DataSource for CountingSource {
        fn id(&self) -> SourceId {
            SourceId::Fixture
        }

        fn lookup<'a>(&'a self, symbol: &'a Symbol) -> LookupFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(symbol)
        }
    }

    fn source() -> Arc<CountingSource> {
        let info = TickerInfo {
            short_name: Some(String::from("Infosys")),
            sector: Some(String::from("Technology")),
            trailing_pe: Some(22.0),
            return_on_equity: Some(0.31),
            market_cap: Some(60_000.0 * CRORE),
            ..TickerInfo::default()
        };
        Arc::new(CountingSource {
            inner: FixtureSource::new()
                .with_entry(Symbol::parse("INFY.NS").expect("valid symbol"), info),
            calls: AtomicUsize::new(0),
        })
    }

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[tokio::test]
    async fn repeated_ticker_list_is_served_from_cache() {
        let source = source();
        let fetcher = Fetcher::new(source.clone()).with_cache(CacheStore::for_session());
        let session = Session {
            fetcher: &fetcher,
            default: Vec::new(),
            render: Render {
                format: OutputFormat::Json,
                pretty: false,
            },
        };
        // Two rounds over the same list with different strategies, then quit.
        let mut prompt = prompter("INFY.NS,MISSING.NS\n\n\n\n\nINFY.NS,MISSING.NS\nplan2\n\n\n\nq\n");

        let failures = session
            .run(&mut prompt, Strategy::LowPeHighRoe, Thresholds::default())
            .await
            .expect("session runs");

        assert_eq!(failures, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn blank_tickers_use_the_default_list_and_eof_ends_session() {
        let source = source();
        let fetcher = Fetcher::new(source.clone()).with_cache(CacheStore::for_session());
        let session = Session {
            fetcher: &fetcher,
            default: vec![Symbol::parse("INFY.NS").expect("valid symbol")],
            render: Render {
                format: OutputFormat::Json,
                pretty: false,
            },
        };
        let mut prompt = prompter("\n");

        let failures = session
            .run(&mut prompt, Strategy::LowPeHighRoe, Thresholds::default())
            .await
            .expect("session runs");

        assert_eq!(failures, 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_ticker_in_session_is_reported_not_fatal() {
        let source = source();
        let fetcher = Fetcher::new(source.clone()).with_cache(CacheStore::for_session());
        let session = Session {
            fetcher: &fetcher,
            default: Vec::new(),
            render: Render {
                format: OutputFormat::Json,
                pretty: false,
            },
        };
        let mut prompt = prompter("INFY.NS, BRK B\n\n\n\n\nq\n");

        let failures = session
            .run(&mut prompt, Strategy::LowPeHighRoe, Thresholds::default())
            .await
            .expect("session runs");

        assert_eq!(failures, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_strategy_answer_is_asked_again() {
        let mut prompt = prompter("plan9\nplan3\n");
        let strategy = ask_strategy(&mut prompt, Strategy::LowPeHighRoe).expect("io");
        assert_eq!(strategy, Strategy::GrowthAtReasonablePrice);
    }

    #[test]
    fn invalid_thresholds_are_asked_again() {
        let mut prompt = prompter("\n0\n\n20\n30\n1000\n");
        let thresholds = ask_thresholds(&mut prompt, Thresholds::default()).expect("io");
        assert_eq!(thresholds.min_roe, 20.0);
        assert_eq!(thresholds.max_pe, 30.0);
        assert_eq!(thresholds.min_market_cap_cr, 1_000.0);
    }
}
