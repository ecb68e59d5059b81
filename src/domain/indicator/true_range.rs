//! True range series.
//!
//! TR[0] = high - low; TR[i] = max(high - low, |high - C[i-1]|, |low - C[i-1]|).

use crate::domain::price_point::PricePoint;

pub fn calculate_true_range(points: &[PricePoint]) -> Vec<f64> {
    let mut values = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        let tr = if i == 0 {
            point.high - point.low
        } else {
            point.true_range(points[i - 1].close)
        };
        values.push(tr);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_point(time: i64, high: f64, low: f64, close: f64) -> PricePoint {
        PricePoint {
            time,
            open: close,
            high,
            low,
            close,
        }
    }

    #[test]
    fn true_range_empty() {
        assert!(calculate_true_range(&[]).is_empty());
    }

    #[test]
    fn true_range_first_point_is_high_low() {
        let points = vec![make_point(0, 110.0, 100.0, 105.0)];
        let tr = calculate_true_range(&points);
        assert_eq!(tr.len(), 1);
        assert!((tr[0] - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_uses_previous_close() {
        let points = vec![
            make_point(0, 110.0, 100.0, 105.0),
            // gap up: |130 - 105| = 25 beats high-low = 10
            make_point(1, 130.0, 120.0, 125.0),
            // gap down: |95 - 125| = 30 beats high-low = 10
            make_point(2, 105.0, 95.0, 100.0),
        ];
        let tr = calculate_true_range(&points);
        assert!((tr[0] - 10.0).abs() < f64::EPSILON);
        assert!((tr[1] - 25.0).abs() < f64::EPSILON);
        assert!((tr[2] - 30.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn true_range_length_and_head(
            bars in prop::collection::vec((1.0f64..500.0, 0.0f64..50.0, 0.0f64..1.0), 1..60)
        ) {
            let points: Vec<PricePoint> = bars
                .iter()
                .enumerate()
                .map(|(i, &(low, spread, frac))| {
                    make_point(i as i64, low + spread, low, low + spread * frac)
                })
                .collect();

            let tr = calculate_true_range(&points);
            prop_assert_eq!(tr.len(), points.len());
            prop_assert!((tr[0] - (points[0].high - points[0].low)).abs() < 1e-12);
            for (value, point) in tr.iter().zip(&points) {
                prop_assert!(*value >= point.high - point.low - 1e-12);
            }
        }
    }
}
