//! Portfolio performance index.
//!
//! Each entry is a lot bought on its purchase date. The index walks the union
//! of every fetched timestamp, values the lots purchased so far at their
//! step-held prices, and rescales the total so the first valid timestamp is 100.
//! A timestamp where any active lot has no resolvable price is dropped.

use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use crate::domain::date_range::DateRange;
use crate::domain::error::ChartfolioError;
use crate::domain::portfolio::{distinct_symbols, PortfolioEntry};
use crate::domain::price_lookup::{latest_price, price_at};
use crate::domain::price_point::PricePoint;
use crate::ports::portfolio_port::PortfolioStore;
use crate::ports::price_port::PriceSeriesProvider;

pub const INDEX_BASE: f64 = 100.0;

pub type SeriesMap = HashMap<String, Vec<PricePoint>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexPoint {
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingMarker {
    pub time: i64,
    pub symbol: String,
    pub quantity: i64,
    pub purchase_price: f64,
    pub cost_basis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Portfolio value at the first valid timestamp; `None` if there was none.
    pub baseline_value: Option<f64>,
    pub current_value: f64,
    pub total_return: f64,
    pub symbol_count: usize,
    pub position_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceIndex {
    pub chart_data: Vec<IndexPoint>,
    pub markers: Vec<RebalancingMarker>,
    /// `None` only for an empty portfolio.
    pub metadata: Option<IndexMetadata>,
}

impl PerformanceIndex {
    pub fn empty() -> Self {
        Self {
            chart_data: Vec::new(),
            markers: Vec::new(),
            metadata: None,
        }
    }

    /// A zero-length index means "no data", never flat performance.
    pub fn has_data(&self) -> bool {
        !self.chart_data.is_empty()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sorted, deduplicated union of every timestamp across all series.
pub fn build_master_timeline(series: &SeriesMap) -> Vec<i64> {
    let unique: BTreeSet<i64> = series
        .values()
        .flat_map(|points| points.iter().map(|p| p.time))
        .collect();
    unique.into_iter().collect()
}

/// One marker per entry at its purchase time, ascending.
pub fn rebalancing_markers(entries: &[PortfolioEntry]) -> Vec<RebalancingMarker> {
    let mut markers: Vec<RebalancingMarker> = entries
        .iter()
        .map(|e| RebalancingMarker {
            time: e.purchase_time(),
            symbol: e.symbol.clone(),
            quantity: e.quantity,
            purchase_price: e.purchase_price,
            cost_basis: e.cost_basis(),
        })
        .collect();
    markers.sort_by_key(|m| m.time);
    markers
}

/// Fetches every symbol concurrently; the first failure fails the whole join.
pub async fn fetch_symbol_series(
    provider: &dyn PriceSeriesProvider,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SeriesMap, ChartfolioError> {
    let fetches = symbols.iter().map(|symbol| async move {
        let points = provider.fetch_series(symbol, start, end).await?;
        debug!(symbol = %symbol, points = points.len(), "fetched price series");
        Ok::<_, ChartfolioError>((symbol.clone(), points))
    });

    let results = try_join_all(fetches).await?;
    Ok(results.into_iter().collect())
}

/// Builds the index from already-fetched series. Pure.
pub fn compute_index(
    entries: &[PortfolioEntry],
    series: &SeriesMap,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> PerformanceIndex {
    if entries.is_empty() {
        return PerformanceIndex::empty();
    }

    let purchases: Vec<(i64, &PortfolioEntry)> =
        entries.iter().map(|e| (e.purchase_time(), e)).collect();

    let mut chart_data = Vec::new();
    let mut baseline: Option<f64> = None;
    let mut unresolved = 0usize;

    for time in build_master_timeline(series) {
        let mut active = purchases.iter().filter(|(bought, _)| *bought <= time).peekable();
        if active.peek().is_none() {
            continue;
        }

        let total: Option<f64> = active
            .map(|(_, entry)| {
                series
                    .get(&entry.symbol)
                    .and_then(|points| price_at(points, time))
                    .map(|price| entry.market_value(price))
            })
            .sum();

        let Some(total) = total else {
            unresolved += 1;
            continue;
        };

        if baseline.is_none() && total <= 0.0 {
            unresolved += 1;
            continue;
        }
        let base = *baseline.get_or_insert(total);

        chart_data.push(IndexPoint {
            time,
            value: round2(total / base * INDEX_BASE),
        });
    }

    if unresolved > 0 {
        warn!(skipped = unresolved, "dropped timestamps without a complete valuation");
    }

    let current_value = chart_data.last().map(|p| p.value).unwrap_or(INDEX_BASE);
    let total_return = if chart_data.is_empty() {
        0.0
    } else {
        current_value - INDEX_BASE
    };

    let metadata = IndexMetadata {
        start_date,
        end_date,
        baseline_value: baseline,
        current_value,
        total_return,
        symbol_count: distinct_symbols(entries).len(),
        position_count: entries.len(),
    };

    PerformanceIndex {
        chart_data,
        markers: rebalancing_markers(entries),
        metadata: Some(metadata),
    }
}

/// Computes the index from the earliest purchase through the window end.
///
/// The window's nominal start is ignored: the portfolio has no value before its
/// first purchase.
pub async fn calculate_performance_index(
    provider: &dyn PriceSeriesProvider,
    entries: &[PortfolioEntry],
    range: DateRange,
    today: NaiveDate,
) -> Result<PerformanceIndex, ChartfolioError> {
    let Some(earliest) = entries.iter().map(|e| e.purchase_date).min() else {
        return Ok(PerformanceIndex::empty());
    };

    let window = range.resolve(today);
    let symbols = distinct_symbols(entries);

    info!(
        range = %range,
        start = %earliest,
        end = %window.end,
        symbols = symbols.len(),
        positions = entries.len(),
        "calculating performance index"
    );

    let series = fetch_symbol_series(provider, &symbols, earliest, window.end).await?;
    Ok(compute_index(entries, &series, earliest, window.end))
}

/// Reads the entries from `store` and calculates their index.
pub async fn calculate_for_store(
    provider: &dyn PriceSeriesProvider,
    store: &dyn PortfolioStore,
    range: DateRange,
    today: NaiveDate,
) -> Result<PerformanceIndex, ChartfolioError> {
    let entries = store.list()?;
    calculate_performance_index(provider, &entries, range, today).await
}

/// Latest close per distinct symbol over the trailing year.
///
/// Symbols whose series is empty are left out.
pub async fn current_prices(
    provider: &dyn PriceSeriesProvider,
    entries: &[PortfolioEntry],
    today: NaiveDate,
) -> Result<HashMap<String, f64>, ChartfolioError> {
    if entries.is_empty() {
        return Ok(HashMap::new());
    }

    let window = DateRange::TrailingYear.resolve(today);
    let symbols = distinct_symbols(entries);
    let series = fetch_symbol_series(provider, &symbols, window.start, window.end).await?;

    Ok(series
        .into_iter()
        .filter_map(|(symbol, points)| latest_price(&points).map(|p| (symbol, p)))
        .collect())
}
