//! Step-function price lookup over a sparse, time-ascending series.

use crate::domain::price_point::PricePoint;

/// Close of the latest point at or before `time`.
///
/// A query before the first point resolves to the first close; an empty series
/// resolves to `None`. Prices are held flat between observations.
pub fn price_at(series: &[PricePoint], time: i64) -> Option<f64> {
    let first = series.first()?;
    let at_or_before = series.partition_point(|p| p.time <= time);
    if at_or_before == 0 {
        Some(first.close)
    } else {
        Some(series[at_or_before - 1].close)
    }
}

/// Close of the last point in the series.
pub fn latest_price(series: &[PricePoint]) -> Option<f64> {
    series.last().map(|p| p.close)
}
