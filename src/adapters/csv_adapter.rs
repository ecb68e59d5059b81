//! CSV file price adapter.
//!
//! One file per symbol, `{SYMBOL}.csv`, with a `date,open,high,low,close`
//! header. Extra columns such as volume are ignored.

use crate::domain::error::ChartfolioError;
use crate::domain::price_point::{date_to_timestamp, PricePoint};
use crate::ports::price_port::PriceSeriesProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn read_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ChartfolioError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| ChartfolioError::Provider {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut points = Vec::new();
        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| ChartfolioError::Provider {
                symbol: symbol.to_string(),
                reason: format!("{} row {}: {}", path.display(), line + 1, e),
            })?;

            if row.date < start || row.date > end {
                continue;
            }

            points.push(PricePoint {
                time: date_to_timestamp(row.date),
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
            });
        }

        points.sort_by_key(|p| p.time);
        points.dedup_by_key(|p| p.time);
        debug!(symbol, file = %path.display(), points = points.len(), "read csv series");
        Ok(points)
    }
}

#[async_trait]
impl PriceSeriesProvider for CsvAdapter {
    async fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ChartfolioError> {
        self.read_series(symbol, start, end)
    }
}
