#![allow(dead_code)]

use async_trait::async_trait;
use chartfolio::domain::error::ChartfolioError;
use chartfolio::domain::portfolio::PortfolioEntry;
pub use chartfolio::domain::price_point::{date_to_timestamp, PricePoint};
use chartfolio::ports::price_port::PriceSeriesProvider;
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned series per symbol, ignoring the requested window.
pub struct MockPriceProvider {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub requests: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _, _)| s.clone())
            .collect();
        symbols.sort();
        symbols
    }
}

#[async_trait]
impl PriceSeriesProvider for MockPriceProvider {
    async fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ChartfolioError> {
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), start, end));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ChartfolioError::Provider {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(day: NaiveDate, close: f64) -> PricePoint {
    PricePoint {
        time: date_to_timestamp(day),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
    }
}

/// Daily closes starting at `start`, one per element of `closes`.
pub fn daily_series(start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_point(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn make_entry(
    id: &str,
    symbol: &str,
    purchase_price: f64,
    purchase_date: NaiveDate,
    quantity: i64,
) -> PortfolioEntry {
    PortfolioEntry {
        id: id.to_string(),
        symbol: symbol.to_string(),
        purchase_price,
        purchase_date,
        quantity,
        created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        updated_at: None,
    }
}

/// Candles oscillating around a rising trend.
pub fn wave_candles(count: usize) -> Vec<PricePoint> {
    let start = date(2024, 1, 1);
    (0..count)
        .map(|i| {
            let close = 100.0 + i as f64 * 0.2 + (i as f64 * 0.4).sin() * 4.0;
            PricePoint {
                time: date_to_timestamp(start + chrono::Duration::days(i as i64)),
                open: close - 0.5,
                high: close + 1.5,
                low: close - 1.5,
                close,
            }
        })
        .collect()
}
