//! Price history access port trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::error::ChartfolioError;
use crate::domain::price_point::PricePoint;

/// Source of daily OHLC candles for a symbol.
///
/// Implementations return points sorted ascending by `time` with no duplicate
/// timestamps. A symbol without data yields an empty vector, not an error.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    async fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ChartfolioError>;
}
