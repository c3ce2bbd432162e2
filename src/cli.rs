//! CLI definition and dispatch.
//!
//! Every analytics command loads the INI config, applies command-line
//! overrides, fetches series through a memoized CSV provider and prints either
//! a plain-text table or JSON to stdout. Diagnostics go through `tracing`.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvSeriesProvider;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memoized_provider::MemoizedProvider;
use crate::domain::comparison::{compare, RebasedSeries};
use crate::domain::config_validation::{validate_analysis_config, validate_portfolio_config};
use crate::domain::correlation::{correlate, CorrelationMatrix};
use crate::domain::derived::{compute_indicators, DerivedBar};
use crate::domain::error::AnalyticsError;
use crate::domain::indicator::rsi::RsiZone;
use crate::domain::ohlcv::OhlcvSeries;
use crate::domain::portfolio::{aggregate, normalize_weights, PortfolioResult, WeightedAsset};
use crate::domain::risk::{compute_summary, Summary};
use crate::domain::settings::{parse_assets, parse_symbols, AnalysisConfig, PortfolioConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::SeriesProvider;

#[derive(Parser, Debug)]
#[command(
    name = "marketlens",
    about = "Indicators, risk/return, portfolios and correlation over OHLCV series"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every analytics command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Override [analysis] start_date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Override [analysis] end_date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// Override [analysis] interval (1d, 1wk, 1mo)
    #[arg(long)]
    pub interval: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Per-bar SMA, RSI, EMA and MACD for one symbol
    Indicators {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        symbol: String,
        /// Only show the last N bars
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Return and volatility summary per symbol
    Summary {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Weighted blend of several symbols
    Portfolio {
        #[command(flatten)]
        common: CommonArgs,
        /// SYMBOL:WEIGHT list, e.g. AAPL:0.6,MSFT:0.4
        #[arg(long)]
        assets: Option<String>,
        /// Rescale weights to sum to 1 before blending
        #[arg(long)]
        normalize: bool,
    },
    /// Correlation matrix of close-to-close returns
    Correlate {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Closes rebased to 100 at the first bar
    Compare {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), AnalyticsError> {
    match cli.command {
        Command::Indicators {
            common,
            symbol,
            tail,
        } => run_indicators(&common, &symbol, tail),
        Command::Summary { common, symbols } => run_summary(&common, symbols.as_deref()),
        Command::Portfolio {
            common,
            assets,
            normalize,
        } => run_portfolio(&common, assets.as_deref(), normalize),
        Command::Correlate { common, symbols } => run_correlate(&common, symbols.as_deref()),
        Command::Compare { common, symbols } => run_compare(&common, symbols.as_deref()),
        Command::ListSymbols { config, json } => run_list_symbols(&config, json),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AnalyticsError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Loaded config plus the provider and settings one command runs against.
pub struct Session {
    pub adapter: FileConfigAdapter,
    pub settings: AnalysisConfig,
    pub provider: MemoizedProvider<CsvSeriesProvider>,
}

impl Session {
    pub fn open(common: &CommonArgs) -> Result<Self, AnalyticsError> {
        let adapter = load_config(&common.config)?;
        let mut settings = AnalysisConfig::from_config(&adapter)?;
        settings.apply_overrides(
            common.start.as_deref(),
            common.end.as_deref(),
            common.interval.as_deref(),
        )?;
        info!(
            "analysing {} to {} at {}",
            settings.start_date, settings.end_date, settings.interval
        );
        let provider = MemoizedProvider::new(CsvSeriesProvider::new(settings.data_path.clone()));
        Ok(Self {
            adapter,
            settings,
            provider,
        })
    }

    pub fn fetch(&self, symbol: &str) -> Result<OhlcvSeries, AnalyticsError> {
        fetch_series(&self.provider, &self.settings, symbol)
    }
}

pub fn fetch_series(
    provider: &dyn SeriesProvider,
    settings: &AnalysisConfig,
    symbol: &str,
) -> Result<OhlcvSeries, AnalyticsError> {
    provider.fetch(
        symbol,
        settings.start_date,
        settings.end_date,
        settings.interval,
    )
}

/// Command-line symbols take precedence over `[analysis] symbols`.
pub fn resolve_symbols(
    override_list: Option<&str>,
    settings: &AnalysisConfig,
) -> Result<Vec<String>, AnalyticsError> {
    let symbols = match override_list {
        Some(list) => parse_symbols(list).map_err(|e| AnalyticsError::ConfigInvalid {
            section: "cli".to_string(),
            key: "symbols".to_string(),
            reason: e.to_string(),
        })?,
        None => settings.symbols.clone(),
    };
    if symbols.is_empty() {
        return Err(AnalyticsError::ConfigMissing {
            section: "analysis".to_string(),
            key: "symbols".to_string(),
        });
    }
    Ok(symbols)
}

/// Command-line assets take precedence over `[portfolio] assets`; weights are
/// normalized when either side asks for it.
pub fn resolve_assets(
    override_list: Option<&str>,
    normalize_flag: bool,
    config: &PortfolioConfig,
) -> Result<Vec<WeightedAsset>, AnalyticsError> {
    let assets = match override_list {
        Some(list) => parse_assets(list).map_err(|e| AnalyticsError::ConfigInvalid {
            section: "cli".to_string(),
            key: "assets".to_string(),
            reason: e.to_string(),
        })?,
        None => config.assets.clone(),
    };
    if assets.is_empty() {
        return Err(AnalyticsError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "assets".to_string(),
        });
    }
    if normalize_flag || config.normalize {
        normalize_weights(&assets)
    } else {
        Ok(assets)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AnalyticsError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{text}");
    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct IndicatorsReport<'a> {
    pub symbol: &'a str,
    pub bars: &'a [DerivedBar],
    pub last_rsi_zone: Option<RsiZone>,
    pub unavailable: Vec<String>,
}

fn run_indicators(
    common: &CommonArgs,
    symbol: &str,
    tail: Option<usize>,
) -> Result<(), AnalyticsError> {
    let session = Session::open(common)?;
    let symbol = symbol.trim().to_uppercase();
    let series = session.fetch(&symbol)?;
    let derived = compute_indicators(&series);

    let unavailable: Vec<String> = derived.unavailable().iter().map(|i| i.to_string()).collect();
    if !unavailable.is_empty() {
        warn!(
            "{symbol}: {} bars is too short for {}",
            series.len(),
            unavailable.join(", ")
        );
    }

    let last_rsi_zone = derived.last().and_then(|b| b.rsi_14).map(|rsi| {
        RsiZone::classify(
            rsi,
            session.settings.rsi_overbought,
            session.settings.rsi_oversold,
        )
    });

    let skip = tail.map_or(0, |n| derived.bars.len().saturating_sub(n));
    let shown = &derived.bars[skip..];

    if common.json {
        return print_json(&IndicatorsReport {
            symbol: &symbol,
            bars: shown,
            last_rsi_zone,
            unavailable,
        });
    }

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>7} {:>9} {:>9} {:>9}",
        "date", "close", "sma_20", "sma_50", "rsi_14", "macd", "signal", "hist"
    );
    for bar in shown {
        println!(
            "{:<10} {:>10.2} {:>10} {:>10} {:>7} {:>9.4} {:>9.4} {:>9.4}",
            bar.bar.date,
            bar.bar.close,
            fmt_opt(bar.sma_20, 2),
            fmt_opt(bar.sma_50, 2),
            fmt_opt(bar.rsi_14, 1),
            bar.macd,
            bar.signal_line,
            bar.macd_histogram,
        );
    }
    if let Some(zone) = last_rsi_zone {
        println!("\nRSI zone: {zone}");
    }
    if !unavailable.is_empty() {
        println!("Unavailable: {}", unavailable.join(", "));
    }
    Ok(())
}

/// Summaries for every symbol that has enough data; the rest are skipped
/// with a warning. Fails only when nothing could be summarised.
pub fn collect_summaries(
    provider: &dyn SeriesProvider,
    settings: &AnalysisConfig,
    symbols: &[String],
) -> Result<Vec<Summary>, AnalyticsError> {
    let mut summaries = Vec::with_capacity(symbols.len());
    let mut last_err = None;

    for symbol in symbols {
        let result = fetch_series(provider, settings, symbol).and_then(|s| compute_summary(&s));
        match result {
            Ok(summary) => summaries.push(summary),
            Err(
                e @ (AnalyticsError::DataUnavailable { .. }
                | AnalyticsError::InsufficientData { .. }),
            ) => {
                warn!("skipping {symbol} ({e})");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    match (summaries.is_empty(), last_err) {
        (true, Some(e)) => Err(e),
        _ => Ok(summaries),
    }
}

fn run_summary(common: &CommonArgs, symbols: Option<&str>) -> Result<(), AnalyticsError> {
    let session = Session::open(common)?;
    let symbols = resolve_symbols(symbols, &session.settings)?;
    let summaries = collect_summaries(&session.provider, &session.settings, &symbols)?;

    if common.json {
        return print_json(&summaries);
    }

    println!(
        "{:<10} {:>6} {:>12} {:>10} {:>9} {:>12} {:>10}",
        "symbol", "bars", "last", "change", "change%", "total_ret%", "ann_vol%"
    );
    for s in &summaries {
        println!(
            "{:<10} {:>6} {:>12.2} {:>10.2} {:>9} {:>12} {:>10}",
            s.symbol,
            s.bars,
            s.last_price,
            s.price_change,
            fmt_opt(s.price_change_pct, 2),
            fmt_opt(s.total_return_pct, 2),
            fmt_opt(s.annualized_volatility_pct, 2),
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PortfolioReport<'a> {
    pub assets: &'a [WeightedAsset],
    #[serde(flatten)]
    pub result: &'a PortfolioResult,
}

pub fn build_portfolio(
    provider: &dyn SeriesProvider,
    settings: &AnalysisConfig,
    assets: &[WeightedAsset],
    tolerance: f64,
) -> Result<PortfolioResult, AnalyticsError> {
    let series: Vec<OhlcvSeries> = assets
        .iter()
        .map(|a| fetch_series(provider, settings, &a.symbol))
        .collect::<Result<_, _>>()?;
    let holdings: Vec<(&OhlcvSeries, f64)> = series
        .iter()
        .zip(assets)
        .map(|(s, a)| (s, a.weight))
        .collect();
    aggregate(&holdings, tolerance)
}

fn run_portfolio(
    common: &CommonArgs,
    assets: Option<&str>,
    normalize: bool,
) -> Result<(), AnalyticsError> {
    let session = Session::open(common)?;
    let portfolio_config = PortfolioConfig::from_config(&session.adapter)?;
    let assets = resolve_assets(assets, normalize, &portfolio_config)?;
    let result = build_portfolio(
        &session.provider,
        &session.settings,
        &assets,
        portfolio_config.weight_tolerance,
    )?;

    if common.json {
        return print_json(&PortfolioReport {
            assets: &assets,
            result: &result,
        });
    }

    for a in &assets {
        println!("{:<10} {:>8.4}", a.symbol, a.weight);
    }
    println!();
    println!("{:<10} {:>12}", "date", "blended");
    for point in &result.blended {
        println!("{:<10} {:>12.4}", point.date, point.value);
    }
    println!(
        "\nPortfolio return: {}%",
        fmt_opt(result.portfolio_return_pct, 2)
    );
    Ok(())
}

/// Series for every symbol the provider can supply; unavailable symbols are
/// skipped with a warning. Fails only when none could be fetched.
pub fn fetch_available(
    provider: &dyn SeriesProvider,
    settings: &AnalysisConfig,
    symbols: &[String],
) -> Result<Vec<OhlcvSeries>, AnalyticsError> {
    let mut fetched = Vec::with_capacity(symbols.len());
    let mut last_err = None;

    for symbol in symbols {
        match fetch_series(provider, settings, symbol) {
            Ok(series) => fetched.push(series),
            Err(e @ AnalyticsError::DataUnavailable { .. }) => {
                warn!("skipping {symbol} ({e})");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    match (fetched.is_empty(), last_err) {
        (true, Some(e)) => Err(e),
        _ => Ok(fetched),
    }
}

fn run_correlate(common: &CommonArgs, symbols: Option<&str>) -> Result<(), AnalyticsError> {
    let session = Session::open(common)?;
    let symbols = resolve_symbols(symbols, &session.settings)?;
    let series = fetch_available(&session.provider, &session.settings, &symbols)?;
    let refs: Vec<&OhlcvSeries> = series.iter().collect();
    let matrix = correlate(&refs)?;

    if matrix.is_empty() {
        warn!("correlation needs at least two symbols");
    }
    if common.json {
        return print_json(&matrix);
    }
    print_matrix(&matrix);
    Ok(())
}

fn print_matrix(matrix: &CorrelationMatrix) {
    print!("{:<10}", "");
    for s in &matrix.symbols {
        print!(" {s:>9}");
    }
    println!();
    for (symbol, row) in matrix.symbols.iter().zip(&matrix.values) {
        print!("{symbol:<10}");
        for v in row {
            print!(" {:>9}", fmt_opt(*v, 3));
        }
        println!();
    }
}

fn run_compare(common: &CommonArgs, symbols: Option<&str>) -> Result<(), AnalyticsError> {
    let session = Session::open(common)?;
    let symbols = resolve_symbols(symbols, &session.settings)?;
    let series = fetch_available(&session.provider, &session.settings, &symbols)?;
    let refs: Vec<&OhlcvSeries> = series.iter().collect();
    let rebased: Vec<RebasedSeries> = compare(&refs);

    if common.json {
        return print_json(&rebased);
    }
    for r in &rebased {
        match (r.points.first(), r.points.last()) {
            (Some(first), Some(last)) => println!(
                "{:<10} {} {:>8.2} -> {} {:>8.2}",
                r.symbol, first.date, first.value, last.date, last.value
            ),
            _ => println!("{:<10} (no data)", r.symbol),
        }
    }
    Ok(())
}

fn run_list_symbols(config_path: &Path, json: bool) -> Result<(), AnalyticsError> {
    let adapter = load_config(config_path)?;
    let data_path = adapter
        .get_string("data", "path")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AnalyticsError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        })?;
    let symbols = CsvSeriesProvider::new(data_path.trim()).list_symbols()?;

    if json {
        return print_json(&symbols);
    }
    if symbols.is_empty() {
        warn!("no symbols found");
    }
    for s in &symbols {
        println!("{s}");
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), AnalyticsError> {
    let adapter = load_config(config_path)?;
    validate_analysis_config(&adapter)?;
    validate_portfolio_config(&adapter)?;
    info!("config validated successfully");
    println!("{} is valid", config_path.display());
    Ok(())
}
