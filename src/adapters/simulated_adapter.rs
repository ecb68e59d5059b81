//! Deterministic simulated price feed.
//!
//! Daily weekday candles from a per-symbol base price and a seeded random walk
//! with 2% volatility. Each symbol has one walk starting at a fixed origin
//! date; a request returns the slice of that walk inside its window, so a
//! given symbol and day always map to the same candle.

use crate::domain::error::ChartfolioError;
use crate::domain::price_point::{date_to_timestamp, PricePoint};
use crate::ports::price_port::PriceSeriesProvider;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

const VOLATILITY: f64 = 0.02;
const DEFAULT_BASE_PRICE: f64 = 100.0;

/// First day of every simulated walk. Days before it have no candles.
pub fn origin() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(NaiveDate::MIN)
}

const BASE_PRICES: [(&str, f64); 7] = [
    ("AAPL", 180.0),
    ("GOOGL", 140.0),
    ("MSFT", 380.0),
    ("AMZN", 155.0),
    ("TSLA", 240.0),
    ("NVDA", 480.0),
    ("META", 320.0),
];

pub fn base_price(symbol: &str) -> f64 {
    BASE_PRICES
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
        .map(|(_, p)| *p)
        .unwrap_or(DEFAULT_BASE_PRICE)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// FNV-1a over the upper-cased symbol, stable across runs.
fn seed_for(symbol: &str) -> u64 {
    symbol
        .to_uppercase()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedAdapter;

impl SimulatedAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let base = base_price(symbol);
        let swing = base * VOLATILITY;
        let floor = base * 0.5;
        let mut rng = StdRng::seed_from_u64(seed_for(symbol));
        let mut price = base;
        let mut points = Vec::new();

        for day in origin().iter_days().take_while(|d| *d <= end) {
            // Weekend and pre-window draws are still taken so every day keeps its candle.
            let drift = (rng.r#gen::<f64>() - 0.48) * swing;
            price = (price + drift).max(floor);

            let open = price;
            let close = open + (rng.r#gen::<f64>() - 0.5) * swing;
            let high = open.max(close) + rng.r#gen::<f64>() * swing * 0.5;
            let low = open.min(close) - rng.r#gen::<f64>() * swing * 0.5;

            if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            price = close;
            if day < start {
                continue;
            }

            points.push(PricePoint {
                time: date_to_timestamp(day),
                open: round2(open),
                high: round2(high),
                low: round2(low),
                close: round2(close),
            });
        }

        points
    }
}

#[async_trait]
impl PriceSeriesProvider for SimulatedAdapter {
    async fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ChartfolioError> {
        let points = self.generate(symbol, start, end);
        debug!(symbol, points = points.len(), "generated simulated series");
        Ok(points)
    }
}
