//! CLI definition and dispatch.

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use futures::executor::block_on;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_portfolio_adapter::JsonPortfolioAdapter;
use crate::adapters::simulated_adapter::SimulatedAdapter;
use crate::domain::config_validation::{
    load_channel_config, load_index_range, validate_channel_config, validate_data_config,
    validate_index_config, validate_portfolio_config,
};
use crate::domain::date_range::DateRange;
use crate::domain::error::ChartfolioError;
use crate::domain::indicator::gaussian::{ChannelConfig, GaussianChannel};
use crate::domain::indicator::Trend;
use crate::domain::indicator_helpers::{channel_overlay, ChannelOverlay};
use crate::domain::performance_index::{self, PerformanceIndex};
use crate::domain::portfolio::{self, EntryUpdate, NewEntry, PortfolioEntry};
use crate::logging::{init_logging, LoggingConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::portfolio_port::PortfolioStore;
use crate::ports::price_port::PriceSeriesProvider;

#[derive(Parser, Debug)]
#[command(
    name = "chartfolio",
    about = "Portfolio performance index and Gaussian channel charts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the portfolio performance index as CSV
    Index {
        #[arg(short, long)]
        config: PathBuf,
        /// ytd, 1y, 5y or custom
        #[arg(long)]
        range: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Print the purchase markers instead of the index
        #[arg(long)]
        markers: bool,
    },
    /// Print a Gaussian channel for one symbol as CSV
    Channel {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        range: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[command(flatten)]
        overrides: ChannelOverrides,
    },
    /// Manage portfolio entries
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        #[command(subcommand)]
        action: PortfolioAction,
    },
    /// Print the latest close for every portfolio symbol
    Prices {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct ChannelOverrides {
    #[arg(long)]
    pub poles: Option<usize>,
    #[arg(long)]
    pub period: Option<usize>,
    #[arg(long)]
    pub multiplier: Option<f64>,
    #[arg(long)]
    pub reduced_lag: bool,
    #[arg(long)]
    pub fast_response: bool,
}

#[derive(Subcommand, Debug)]
pub enum PortfolioAction {
    /// List all entries
    List,
    /// Record a purchase
    Add {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        quantity: i64,
    },
    /// Change fields of an existing entry
    Update {
        id: String,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        quantity: Option<i64>,
    },
    /// Delete an entry
    Remove { id: String },
    /// Holdings with current prices and gain/loss
    Summary,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Index {
            config,
            range,
            start,
            end,
            markers,
        } => run_index(&config, range.as_deref(), start, end, markers),
        Command::Channel {
            config,
            symbol,
            range,
            start,
            end,
            overrides,
        } => run_channel(&config, &symbol, range.as_deref(), start, end, &overrides),
        Command::Portfolio { config, action } => run_portfolio(&config, action),
        Command::Prices { config } => run_prices(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;

    let logging = LoggingConfig::from_env(Some(&adapter));
    if init_logging(&logging).is_err() {
        eprintln!("warning: logging already initialized");
    }
    Ok(adapter)
}

fn fail(e: ChartfolioError) -> ExitCode {
    eprintln!("error: {e}");
    (&e).into()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Price provider selected by `[data] provider`.
pub fn build_provider(
    config: &dyn ConfigPort,
) -> Result<Box<dyn PriceSeriesProvider>, ChartfolioError> {
    validate_data_config(config)?;
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "csv".to_string());

    if provider.trim().eq_ignore_ascii_case("simulated") {
        return Ok(Box::new(SimulatedAdapter::new()));
    }

    let dir = config
        .get_string("data", "csv_dir")
        .ok_or_else(|| ChartfolioError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        })?;
    Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
}

pub fn build_store(config: &dyn ConfigPort) -> Result<JsonPortfolioAdapter, ChartfolioError> {
    validate_portfolio_config(config)?;
    let path = config
        .get_string("portfolio", "path")
        .ok_or_else(|| ChartfolioError::ConfigMissing {
            section: "portfolio".into(),
            key: "path".into(),
        })?;
    Ok(JsonPortfolioAdapter::new(path))
}

/// Command-line range flags win over `[index]`.
pub fn resolve_range(
    config: &dyn ConfigPort,
    range: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange, ChartfolioError> {
    match range {
        Some(kind) => {
            let config_date = |key: &str| config.get_date("index", key).and_then(Result::ok);
            DateRange::parse(
                kind,
                start.or_else(|| config_date("start_date")),
                end.or_else(|| config_date("end_date")),
            )
        }
        None => match (start, end) {
            (Some(start), Some(end)) => DateRange::custom(start, end),
            _ => load_index_range(config),
        },
    }
}

/// `[channel]` settings with command-line flags applied on top.
pub fn resolve_channel_config(
    config: &dyn ConfigPort,
    overrides: &ChannelOverrides,
) -> Result<ChannelConfig, ChartfolioError> {
    let mut channel = load_channel_config(config)?;
    if let Some(poles) = overrides.poles {
        channel.poles = poles;
    }
    if let Some(period) = overrides.period {
        channel.period = period;
    }
    if let Some(multiplier) = overrides.multiplier {
        channel.multiplier = multiplier;
    }
    channel.reduced_lag |= overrides.reduced_lag;
    channel.fast_response |= overrides.fast_response;
    Ok(channel)
}

#[derive(Debug, Serialize)]
struct ChannelRow {
    time: i64,
    filter: f64,
    upper: f64,
    lower: f64,
    trend: Trend,
}

#[derive(Debug, Serialize)]
struct EntryRow<'a> {
    id: &'a str,
    symbol: &'a str,
    quantity: i64,
    purchase_price: f64,
    purchase_date: NaiveDate,
    cost_basis: f64,
}

impl<'a> From<&'a PortfolioEntry> for EntryRow<'a> {
    fn from(entry: &'a PortfolioEntry) -> Self {
        Self {
            id: &entry.id,
            symbol: &entry.symbol,
            quantity: entry.quantity,
            purchase_price: entry.purchase_price,
            purchase_date: entry.purchase_date,
            cost_basis: entry.cost_basis(),
        }
    }
}

pub fn write_index_csv<W: Write>(out: W, index: &PerformanceIndex) -> Result<(), ChartfolioError> {
    write_rows(out, &index.chart_data)
}

pub fn write_markers_csv<W: Write>(
    out: W,
    index: &PerformanceIndex,
) -> Result<(), ChartfolioError> {
    write_rows(out, &index.markers)
}

pub fn write_channel_csv<W: Write>(
    out: W,
    channel: &GaussianChannel,
) -> Result<(), ChartfolioError> {
    let rows: Vec<ChannelRow> = (0..channel.len())
        .map(|i| ChannelRow {
            time: channel.filter[i].time,
            filter: channel.filter[i].value,
            upper: channel.upper_band[i].value,
            lower: channel.lower_band[i].value,
            trend: channel.trends[i],
        })
        .collect();
    write_rows(out, &rows)
}

fn write_rows<W: Write, T: Serialize>(out: W, rows: &[T]) -> Result<(), ChartfolioError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn index_for(
    config: &dyn ConfigPort,
    range: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<PerformanceIndex, ChartfolioError> {
    let range = resolve_range(config, range, start, end)?;
    let provider = build_provider(config)?;
    let store = build_store(config)?;

    eprintln!("Calculating {} index from {}", range, store.path().display());
    block_on(performance_index::calculate_for_store(
        provider.as_ref(),
        &store,
        range,
        today(),
    ))
}

fn run_index(
    config_path: &PathBuf,
    range: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    markers: bool,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let index = match index_for(&adapter, range, start, end) {
        Ok(index) => index,
        Err(e) => return fail(e),
    };

    let Some(meta) = &index.metadata else {
        eprintln!("Portfolio is empty, no data");
        return ExitCode::SUCCESS;
    };

    let written = if markers {
        write_markers_csv(io::stdout().lock(), &index)
    } else {
        write_index_csv(io::stdout().lock(), &index)
    };
    if let Err(e) = written {
        return fail(e);
    }

    if !index.has_data() {
        eprintln!("No price data for the selected range");
        return ExitCode::SUCCESS;
    }

    eprintln!("\n=== Performance Index ===");
    eprintln!("Period:        {} to {}", meta.start_date, meta.end_date);
    eprintln!("Positions:     {} ({} symbols)", meta.position_count, meta.symbol_count);
    if let Some(baseline) = meta.baseline_value {
        eprintln!("Baseline:      ${:.2}", baseline);
    }
    eprintln!("Current:       {:.2}", meta.current_value);
    eprintln!("Total Return:  {:+.2}%", meta.total_return);
    ExitCode::SUCCESS
}

fn overlay_for(
    config: &dyn ConfigPort,
    symbol: &str,
    range: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    overrides: &ChannelOverrides,
) -> Result<ChannelOverlay, ChartfolioError> {
    let symbol = portfolio::normalize_symbol(symbol);
    let range = resolve_range(config, range, start, end)?;
    let channel_config = resolve_channel_config(config, overrides)?;
    let provider = build_provider(config)?;

    let window = range.resolve(today());
    let candles = block_on(provider.fetch_series(&symbol, window.start, window.end))?;
    eprintln!(
        "Computing channel for {}: {} candles, poles {}, period {}",
        symbol,
        candles.len(),
        channel_config.effective_poles(),
        channel_config.period
    );
    Ok(channel_overlay(&candles, &channel_config)?)
}

fn run_channel(
    config_path: &PathBuf,
    symbol: &str,
    range: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    overrides: &ChannelOverrides,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let overlay = match overlay_for(&adapter, symbol, range, start, end, overrides) {
        Ok(o) => o,
        Err(ChartfolioError::Channel(e)) => {
            eprintln!("no channel overlay for {}: {}", symbol, e);
            return ExitCode::SUCCESS;
        }
        Err(e) => return fail(e),
    };

    if let Err(e) = write_channel_csv(io::stdout().lock(), &overlay.channel) {
        return fail(e);
    }

    let bullish = overlay
        .segments
        .iter()
        .filter(|s| s.trend == Trend::Bullish)
        .count();
    eprintln!(
        "{} points, {} trend segments ({} bullish, {} bearish)",
        overlay.channel.len(),
        overlay.segments.len(),
        bullish,
        overlay.segments.len() - bullish
    );
    ExitCode::SUCCESS
}

fn run_portfolio(config_path: &PathBuf, action: PortfolioAction) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let store = match build_store(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let result = match action {
        PortfolioAction::List => store.list().and_then(|entries| {
            let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
            write_rows(io::stdout().lock(), &rows)
        }),
        PortfolioAction::Add {
            symbol,
            price,
            date,
            quantity,
        } => store
            .add(NewEntry {
                symbol,
                purchase_price: price,
                purchase_date: date,
                quantity,
            })
            .map(|entry| {
                eprintln!(
                    "Added {} x{} @ ${:.2} ({})",
                    entry.symbol, entry.quantity, entry.purchase_price, entry.id
                )
            }),
        PortfolioAction::Update {
            id,
            symbol,
            price,
            date,
            quantity,
        } => store
            .update(
                &id,
                EntryUpdate {
                    symbol,
                    purchase_price: price,
                    purchase_date: date,
                    quantity,
                },
            )
            .map(|entry| eprintln!("Updated {}", entry.id)),
        PortfolioAction::Remove { id } => store.delete(&id).and_then(|removed| {
            if removed {
                eprintln!("Removed {}", id);
                Ok(())
            } else {
                Err(ChartfolioError::EntryNotFound { id })
            }
        }),
        PortfolioAction::Summary => run_summary(&adapter, &store),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn run_summary(config: &dyn ConfigPort, store: &dyn PortfolioStore) -> Result<(), ChartfolioError> {
    let entries = store.list()?;
    let provider = build_provider(config)?;
    let prices = block_on(performance_index::current_prices(
        provider.as_ref(),
        &entries,
        today(),
    ))?;
    let summary = portfolio::holdings_summary(&entries, &prices);

    write_rows(io::stdout().lock(), &summary.rows)?;
    eprintln!("\n=== Holdings ===");
    eprintln!("Positions:       {}", summary.rows.len());
    eprintln!("Cost Basis:      ${:.2}", summary.total_cost_basis);
    eprintln!("Gain/Loss:       ${:+.2}", summary.total_gain_loss);
    Ok(())
}

fn print_prices(config: &dyn ConfigPort) -> Result<usize, ChartfolioError> {
    let provider = build_provider(config)?;
    let store = build_store(config)?;
    let entries = store.list()?;
    let prices = block_on(performance_index::current_prices(
        provider.as_ref(),
        &entries,
        today(),
    ))?;

    let mut symbols = portfolio::distinct_symbols(&entries);
    symbols.sort();

    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    writer.write_record(["symbol", "price"])?;
    for symbol in &symbols {
        let price = prices
            .get(symbol)
            .map(|p| format!("{:.2}", p))
            .unwrap_or_default();
        writer.write_record([symbol.as_str(), price.as_str()])?;
    }
    writer.flush()?;
    Ok(symbols.len())
}

fn run_prices(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match print_prices(&adapter) {
        Ok(count) => {
            eprintln!("{} symbols", count);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checks: [(&str, fn(&dyn ConfigPort) -> Result<(), ChartfolioError>); 4] = [
        ("data", validate_data_config),
        ("portfolio", validate_portfolio_config),
        ("channel", validate_channel_config),
        ("index", validate_index_config),
    ];

    for (section, check) in checks {
        if let Err(e) = check(&adapter) {
            return fail(e);
        }
        eprintln!("[{}] ok", section);
    }
    eprintln!("Configuration is valid");
    ExitCode::SUCCESS
}
