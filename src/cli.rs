//! CLI definition and dispatch.
//!
//! Every command loads one ticker's store from CSV files and prints its result
//! as tab-separated lines on stdout. Diagnostics go to stderr.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analytics::{
    self, AtrMethod, AverageKind, BandParams, CoverageBy, EnvelopeQuery, ParabolicParams, Side,
    Span, StopRequest,
};
use crate::domain::error::{QuotelabError, check_range};
use crate::domain::indicator::IndicatorType;
use crate::domain::loader::load_store;
use crate::domain::quote_store::{QuoteStore, StoreConfig, Window};
use crate::domain::series::Field;
use crate::domain::store_config::{DataConfig, build_data_config, build_store_config};
use crate::logging;

#[derive(Parser, Debug)]
#[command(name = "quotelab", about = "Daily quote store, indicators and trading analytics")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

/// Where the quotes of one ticker come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory holding `{ticker}.csv` files (overrides [data] dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Ticker to load (overrides [store] ticker)
    #[arg(long)]
    pub ticker: Option<String>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Back-adjust prices for dividends
    #[arg(long)]
    pub apply_dividend: bool,
    /// Resample the daily store before querying
    #[arg(long, value_enum)]
    pub resample: Option<Resample>,
}

/// Date window of a query; `--last` selects the most recent bars up to `--end`.
#[derive(Args, Debug, Clone, Copy)]
pub struct WindowArgs {
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long, conflicts_with = "start")]
    pub last: Option<usize>,
}

impl WindowArgs {
    fn window(&self) -> Result<Window, QuotelabError> {
        match self.last {
            Some(count) => Ok(Window::last(count, self.end)),
            None => {
                check_range(self.start, self.end)?;
                Ok(Window::range(self.start, self.end))
            }
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resample {
    Weekly,
    Monthly,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Wma,
    Hull,
    Macd,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    Parabolic,
    SafeZone,
    Chandelier,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the data range of a ticker
    Info {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print one price field
    Series {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long, default_value = "close")]
        field: Field,
        /// Newest first
        #[arg(long)]
        reverse: bool,
    },
    /// Print a moving-average indicator over closes
    Indicator {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long, value_enum)]
        kind: IndicatorKind,
        #[arg(long, default_value_t = 20)]
        period: usize,
        /// Seed EMA warm-up with a simple average
        #[arg(long)]
        sma_seed: bool,
        #[arg(long, default_value_t = 12)]
        fast: usize,
        #[arg(long, default_value_t = 26)]
        slow: usize,
        #[arg(long, default_value_t = 9)]
        signal: usize,
        #[arg(long)]
        reverse: bool,
    },
    /// Find the channel width that covers a share of the price action
    Envelope {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        count: usize,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 20)]
        period: usize,
        #[arg(long, default_value = "simple")]
        average: AverageKind,
        #[arg(long, default_value = "price")]
        by: CoverageBy,
        #[arg(long, default_value_t = 0.9)]
        coverage: f64,
        #[arg(long, default_value_t = 0.0001)]
        delta: f64,
    },
    /// Opening gap statistics
    Gap {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long, default_value_t = 0.9)]
        coverage: f64,
    },
    /// Average true range
    Atr {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        count: usize,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 14)]
        period: usize,
        #[arg(long, default_value = "windowed")]
        method: AtrMethod,
    },
    /// Trailing stop series and exit
    Stop {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum)]
        kind: StopKind,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        stop_loss: f64,
        #[arg(long, default_value = "long")]
        side: Side,
        /// Parabolic acceleration step
        #[arg(long, default_value_t = 0.02)]
        factor: f64,
        /// Parabolic acceleration cap
        #[arg(long, default_value_t = 0.2)]
        limit: f64,
        /// Band multiplier for safe-zone and chandelier
        #[arg(long, default_value_t = 2.5)]
        coefficient: f64,
        #[arg(long, default_value_t = 10)]
        period: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    logging::init(&cli.log_level);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match execute(cli.command, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Runs one command, writing its result to `out`.
pub fn execute(command: Command, out: &mut dyn Write) -> Result<(), QuotelabError> {
    match command {
        Command::Info { source } => {
            let store = open_store(&source)?;
            write_info(out, &store)
        }
        Command::Series {
            source,
            window,
            field,
            reverse,
        } => {
            let store = open_store(&source)?;
            let window = window.window()?;
            let dates = store.dates(window, reverse);
            let values = store.series(field, window, reverse);
            writeln!(out, "date\t{field}")?;
            for (date, value) in dates.iter().zip(values.iter()) {
                writeln!(out, "{date}\t{value}")?;
            }
            Ok(())
        }
        Command::Indicator {
            source,
            window,
            kind,
            period,
            sma_seed,
            fast,
            slow,
            signal,
            reverse,
        } => {
            let store = open_store(&source)?;
            let window = window.window()?;
            let indicator = match kind {
                IndicatorKind::Sma => IndicatorType::Sma(period),
                IndicatorKind::Ema => IndicatorType::Ema { period, sma_seed },
                IndicatorKind::Wma => IndicatorType::Wma(period),
                IndicatorKind::Hull => IndicatorType::Hull(period),
                IndicatorKind::Macd => IndicatorType::Macd {
                    fast,
                    slow,
                    signal,
                    sma_seed,
                },
            };
            debug!(%indicator, "computing indicator");
            let dates = store.dates(window, reverse);
            let columns = store.indicator_all(&indicator, window, reverse);
            write_columns(out, &indicator, &dates, &columns)
        }
        Command::Envelope {
            source,
            count,
            end,
            period,
            average,
            by,
            coverage,
            delta,
        } => {
            let store = open_store(&source)?;
            let query = EnvelopeQuery {
                count,
                end,
                period,
                average,
                by,
                coverage,
                delta,
            };
            let Some(result) = analytics::envelope(&store, &query)? else {
                return no_bars(&store);
            };
            write_span(out, &result.span)?;
            writeln!(out, "period\t{}", result.period)?;
            writeln!(out, "average\t{}", result.average)?;
            writeln!(out, "by\t{}", result.by)?;
            writeln!(out, "coverage\t{}", result.coverage)?;
            writeln!(out, "envelope\t{}", result.value)?;
            Ok(())
        }
        Command::Gap {
            source,
            window,
            coverage,
        } => {
            let store = open_store(&source)?;
            let Some(result) = analytics::gap(&store, window.window()?, coverage)? else {
                return no_bars(&store);
            };
            write_span(out, &result.span)?;
            writeln!(out, "steps\t{}", result.step_count)?;
            writeln!(out, "coverage\t{}", result.coverage)?;
            writeln!(out, "side\tcount\tmin\tmax\tmean\tmedian\tstd_dev\tcover_gap")?;
            for (name, side) in [("up", &result.up), ("down", &result.down)] {
                writeln!(
                    out,
                    "{name}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    side.count,
                    side.min,
                    side.max,
                    side.mean,
                    side.median,
                    side.std_dev,
                    side.cover_gap
                )?;
            }
            Ok(())
        }
        Command::Atr {
            source,
            count,
            end,
            period,
            method,
        } => {
            let store = open_store(&source)?;
            let Some(result) = analytics::average_true_range(&store, count, end, period, method)?
            else {
                return no_bars(&store);
            };
            write_span(out, &result.span)?;
            writeln!(out, "period\t{}", result.period)?;
            writeln!(out, "method\t{}", result.method)?;
            writeln!(out, "atr\t{}", result.value)?;
            Ok(())
        }
        Command::Stop {
            source,
            kind,
            start,
            end,
            stop_loss,
            side,
            factor,
            limit,
            coefficient,
            period,
        } => {
            let store = open_store(&source)?;
            let request = StopRequest {
                start,
                end,
                stop_loss,
                side,
            };
            let band = BandParams {
                coefficient,
                period,
            };
            let result = match kind {
                StopKind::Parabolic => {
                    analytics::parabolic_stop(&store, &request, &ParabolicParams { factor, limit })?
                }
                StopKind::SafeZone => analytics::safe_zone_stop(&store, &request, &band)?,
                StopKind::Chandelier => analytics::chandelier_stop(&store, &request, &band)?,
            };
            let Some(result) = result else {
                return no_bars(&store);
            };
            writeln!(out, "date\tstop")?;
            for (date, stop) in result.dates.iter().zip(result.stops.iter()) {
                writeln!(out, "{date}\t{stop}")?;
            }
            match result.exit {
                Some(exit) => match exit.fill {
                    Some(fill) => writeln!(out, "exit\t{}\t{fill}", exit.date)?,
                    None => writeln!(out, "exit\t{}\tno-fill", exit.date)?,
                },
                None => writeln!(out, "exit\tnone")?,
            }
            Ok(())
        }
    }
}

/// Loads the store named by `source`, layering CLI flags over the config file.
pub fn open_store(source: &SourceArgs) -> Result<QuoteStore, QuotelabError> {
    let (mut store_config, data_config) = match &source.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            let adapter = FileConfigAdapter::from_file(path)?;
            (build_store_config(&adapter)?, build_data_config(&adapter)?)
        }
        None => (StoreConfig::default(), DataConfig::default()),
    };
    if let Some(ticker) = &source.ticker {
        store_config.ticker = Some(ticker.clone());
    }
    if source.apply_dividend {
        store_config.apply_dividend = true;
    }

    let dir = source
        .data_dir
        .clone()
        .or(data_config.dir)
        .ok_or_else(|| QuotelabError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        })?;
    let adapter = CsvAdapter::with_date_format(dir, &data_config.date_format);
    let store = load_store(&adapter, store_config)?;

    Ok(match source.resample {
        Some(Resample::Weekly) => store.weekly(),
        Some(Resample::Monthly) => store.monthly(),
        None => store,
    })
}

fn no_bars(store: &QuoteStore) -> Result<(), QuotelabError> {
    eprintln!(
        "No bars for {} in the requested window",
        store.ticker().unwrap_or("-")
    );
    Ok(())
}

fn write_info(out: &mut dyn Write, store: &QuoteStore) -> Result<(), QuotelabError> {
    let quotes = store.quotes();
    let dividends = quotes.iter().filter(|q| q.dividend != 0.0).count();
    writeln!(out, "ticker\t{}", store.ticker().unwrap_or("-"))?;
    writeln!(out, "quotes\t{}", quotes.len())?;
    if let (Some(first), Some(last)) = (quotes.first(), quotes.last()) {
        writeln!(out, "first\t{}", first.date)?;
        writeln!(out, "last\t{}", last.date)?;
    }
    writeln!(out, "dividends\t{dividends}")?;
    Ok(())
}

fn write_span(out: &mut dyn Write, span: &Span) -> Result<(), QuotelabError> {
    writeln!(out, "ticker\t{}", span.ticker.as_deref().unwrap_or("-"))?;
    writeln!(out, "count\t{}", span.count)?;
    writeln!(out, "first\t{}", span.first_day)?;
    writeln!(out, "last\t{}", span.last_day)?;
    Ok(())
}

fn write_columns(
    out: &mut dyn Write,
    indicator: &IndicatorType,
    dates: &[NaiveDate],
    columns: &[Vec<f64>],
) -> Result<(), QuotelabError> {
    match indicator {
        IndicatorType::Macd { .. } => writeln!(out, "date\tmacd\tsignal\thistogram")?,
        other => writeln!(out, "date\t{other}")?,
    }
    for (i, date) in dates.iter().enumerate() {
        write!(out, "{date}")?;
        for column in columns {
            if let Some(value) = column.get(i) {
                write!(out, "\t{value}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
