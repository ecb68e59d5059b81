//! Integration tests for the index and channel pipelines.
//!
//! Tests cover:
//! - Performance index end to end with a mock provider (single lot, staggered lots, empty)
//! - Provider failures and symbols without prices
//! - Index computed from a JSON-file portfolio store
//! - Current prices and holdings summary
//! - Gaussian channel overlay on realistic candles and on the simulated feed

mod common;

use chartfolio::adapters::json_portfolio_adapter::JsonPortfolioAdapter;
use chartfolio::adapters::memory_portfolio_adapter::MemoryPortfolioAdapter;
use chartfolio::adapters::simulated_adapter::SimulatedAdapter;
use chartfolio::domain::date_range::DateRange;
use chartfolio::domain::error::{ChannelError, ChartfolioError};
use chartfolio::domain::indicator::gaussian::ChannelConfig;
use chartfolio::domain::indicator::Trend;
use chartfolio::domain::indicator_helpers::channel_overlay;
use chartfolio::domain::performance_index::{
    calculate_for_store, calculate_performance_index, current_prices, PerformanceIndex,
};
use chartfolio::domain::portfolio::{holdings_summary, NewEntry};
use chartfolio::ports::portfolio_port::PortfolioStore;
use common::*;
use futures::executor::block_on;

fn values(index: &PerformanceIndex) -> Vec<f64> {
    index.chart_data.iter().map(|p| p.value).collect()
}

mod performance_index {
    use super::*;

    #[test]
    fn single_lot_tracks_price() {
        let day0 = date(2024, 3, 4);
        let provider =
            MockPriceProvider::new().with_series("X", daily_series(day0, &[100.0, 110.0, 90.0]));
        let entries = vec![make_entry("1", "X", 100.0, day0, 10)];

        let index = block_on(calculate_performance_index(
            &provider,
            &entries,
            DateRange::TrailingYear,
            date(2024, 3, 6),
        ))
        .unwrap();

        assert_eq!(values(&index), vec![100.0, 110.0, 90.0]);
        assert_eq!(index.markers.len(), 1);
        assert_eq!(index.markers[0].time, date_to_timestamp(day0));

        let meta = index.metadata.unwrap();
        assert_eq!(meta.baseline_value, Some(1000.0));
        assert_eq!(meta.current_value, 90.0);
        assert_eq!(meta.total_return, -10.0);
        assert_eq!(meta.start_date, day0);
        assert_eq!(meta.end_date, date(2024, 3, 6));
    }

    #[test]
    fn staggered_purchases_rebase_on_first_total() {
        let day0 = date(2024, 3, 4);
        let day1 = date(2024, 3, 5);
        let provider = MockPriceProvider::new()
            .with_series("X", daily_series(day0, &[100.0, 100.0, 100.0]))
            .with_series("Y", daily_series(day1, &[50.0, 60.0]));
        let entries = vec![
            make_entry("1", "X", 100.0, day0, 10),
            make_entry("2", "Y", 50.0, day1, 20),
        ];

        let index = block_on(calculate_performance_index(
            &provider,
            &entries,
            DateRange::YearToDate,
            date(2024, 3, 6),
        ))
        .unwrap();

        assert_eq!(values(&index), vec![100.0, 200.0, 220.0]);
        let meta = index.metadata.unwrap();
        assert_eq!(meta.baseline_value, Some(1000.0));
        assert_eq!(meta.total_return, 120.0);
        assert_eq!(meta.symbol_count, 2);
        assert_eq!(meta.position_count, 2);
    }

    #[test]
    fn empty_portfolio_returns_empty_index() {
        let provider = MockPriceProvider::new();
        let index = block_on(calculate_performance_index(
            &provider,
            &[],
            DateRange::TrailingYear,
            date(2024, 3, 6),
        ))
        .unwrap();

        assert!(index.chart_data.is_empty());
        assert!(index.markers.is_empty());
        assert!(index.metadata.is_none());
        assert!(provider.requested_symbols().is_empty());
    }

    #[test]
    fn fetches_each_symbol_once_from_earliest_purchase() {
        let provider = MockPriceProvider::new()
            .with_series("X", daily_series(date(2024, 1, 2), &[1.0, 2.0]))
            .with_series("Y", daily_series(date(2024, 1, 2), &[1.0, 2.0]));
        let entries = vec![
            make_entry("1", "X", 1.0, date(2024, 1, 3), 1),
            make_entry("2", "Y", 1.0, date(2024, 1, 2), 1),
            make_entry("3", "X", 1.0, date(2024, 1, 2), 5),
        ];

        block_on(calculate_performance_index(
            &provider,
            &entries,
            DateRange::TrailingFiveYears,
            date(2024, 6, 1),
        ))
        .unwrap();

        assert_eq!(provider.requested_symbols(), vec!["X", "Y"]);
        for (_, start, end) in provider.requests.lock().unwrap().iter() {
            assert_eq!(*start, date(2024, 1, 2));
            assert_eq!(*end, date(2024, 6, 1));
        }
    }

    #[test]
    fn custom_range_sets_end_of_span() {
        let provider = MockPriceProvider::new()
            .with_series("X", daily_series(date(2023, 1, 2), &[1.0, 2.0, 3.0]));
        let entries = vec![make_entry("1", "X", 1.0, date(2023, 1, 2), 1)];
        let range = DateRange::custom(date(2023, 1, 1), date(2023, 1, 3)).unwrap();

        let index =
            block_on(calculate_performance_index(&provider, &entries, range, date(2024, 1, 1)))
                .unwrap();
        assert_eq!(index.metadata.unwrap().end_date, date(2023, 1, 3));
    }

    #[test]
    fn provider_failure_fails_whole_calculation() {
        let provider = MockPriceProvider::new()
            .with_series("X", daily_series(date(2024, 1, 2), &[1.0, 2.0]))
            .with_error("Y", "rate limited");
        let entries = vec![
            make_entry("1", "X", 1.0, date(2024, 1, 2), 1),
            make_entry("2", "Y", 1.0, date(2024, 1, 2), 1),
        ];

        let result = block_on(calculate_performance_index(
            &provider,
            &entries,
            DateRange::TrailingYear,
            date(2024, 2, 1),
        ));

        assert!(
            matches!(result, Err(ChartfolioError::Provider { symbol, reason }) if symbol == "Y" && reason == "rate limited")
        );
    }

    #[test]
    fn symbol_without_data_drops_its_timestamps() {
        let day0 = date(2024, 1, 2);
        let provider = MockPriceProvider::new()
            .with_series("X", daily_series(day0, &[10.0, 11.0, 12.0]));
        let entries = vec![
            make_entry("1", "X", 10.0, day0, 1),
            make_entry("2", "GHOST", 5.0, date(2024, 1, 3), 1),
        ];

        let index = block_on(calculate_performance_index(
            &provider,
            &entries,
            DateRange::TrailingYear,
            date(2024, 1, 4),
        ))
        .unwrap();

        // Only day 0 precedes the unpriced lot.
        assert_eq!(values(&index), vec![100.0]);
        assert_eq!(index.markers.len(), 2);
    }

    #[test]
    fn all_series_empty_means_no_data() {
        let provider = MockPriceProvider::new().with_series("X", Vec::new());
        let entries = vec![make_entry("1", "X", 10.0, date(2024, 1, 2), 1)];

        let index = block_on(calculate_performance_index(
            &provider,
            &entries,
            DateRange::TrailingYear,
            date(2024, 1, 4),
        ))
        .unwrap();

        assert!(!index.has_data());
        let meta = index.metadata.unwrap();
        assert_eq!(meta.current_value, 100.0);
        assert_eq!(meta.total_return, 0.0);
    }

    #[test]
    fn sparse_series_hold_last_close() {
        let day0 = date(2024, 1, 1);
        let provider = MockPriceProvider::new()
            .with_series(
                "X",
                vec![make_point(day0, 100.0), make_point(date(2024, 1, 3), 120.0)],
            )
            .with_series("Y", daily_series(day0, &[10.0, 10.0, 10.0]));
        let entries = vec![
            make_entry("1", "X", 100.0, day0, 1),
            make_entry("2", "Y", 10.0, day0, 10),
        ];

        let index = block_on(calculate_performance_index(
            &provider,
            &entries,
            DateRange::TrailingYear,
            date(2024, 1, 3),
        ))
        .unwrap();

        // Day 1: X held at 100.
        assert_eq!(values(&index), vec![100.0, 100.0, 110.0]);
    }
}

mod stores {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn index_from_json_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonPortfolioAdapter::new(dir.path().join("portfolio.json"));
        let day0 = date(2024, 3, 4);
        store
            .add(NewEntry {
                symbol: "x".into(),
                purchase_price: 100.0,
                purchase_date: day0,
                quantity: 10,
            })
            .unwrap();

        let provider =
            MockPriceProvider::new().with_series("X", daily_series(day0, &[100.0, 110.0, 90.0]));

        let index = block_on(calculate_for_store(
            &provider,
            &store,
            DateRange::TrailingYear,
            date(2024, 3, 6),
        ))
        .unwrap();
        assert_eq!(values(&index), vec![100.0, 110.0, 90.0]);
    }

    #[test]
    fn updated_quantity_changes_index_weights() {
        let store = MemoryPortfolioAdapter::new();
        let day0 = date(2024, 3, 4);
        let x = store
            .add(NewEntry {
                symbol: "X".into(),
                purchase_price: 100.0,
                purchase_date: day0,
                quantity: 1,
            })
            .unwrap();
        store
            .add(NewEntry {
                symbol: "Y".into(),
                purchase_price: 100.0,
                purchase_date: day0,
                quantity: 1,
            })
            .unwrap();
        store
            .update(
                &x.id,
                chartfolio::domain::portfolio::EntryUpdate {
                    quantity: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();

        let provider = MockPriceProvider::new()
            .with_series("X", daily_series(day0, &[100.0, 200.0]))
            .with_series("Y", daily_series(day0, &[100.0, 100.0]));

        let index = block_on(calculate_for_store(
            &provider,
            &store,
            DateRange::TrailingYear,
            date(2024, 3, 5),
        ))
        .unwrap();
        // 3*200 + 100 = 700 over 400.
        assert_eq!(values(&index), vec![100.0, 175.0]);
    }
}

mod holdings {
    use super::*;

    #[test]
    fn current_prices_use_latest_close() {
        let provider = MockPriceProvider::new()
            .with_series("X", daily_series(date(2024, 1, 1), &[10.0, 12.0, 15.0]))
            .with_series("Y", Vec::new());
        let entries = vec![
            make_entry("1", "X", 10.0, date(2024, 1, 1), 2),
            make_entry("2", "Y", 10.0, date(2024, 1, 1), 1),
        ];

        let prices = block_on(current_prices(&provider, &entries, date(2024, 1, 3))).unwrap();
        assert_eq!(prices.get("X"), Some(&15.0));
        assert!(!prices.contains_key("Y"));

        let summary = holdings_summary(&entries, &prices);
        assert_eq!(summary.total_cost_basis, 30.0);
        assert_eq!(summary.total_gain_loss, 10.0);
        assert_eq!(summary.rows[1].gain_loss, 0.0);
    }

    #[test]
    fn current_prices_request_trailing_year() {
        let provider = MockPriceProvider::new();
        let entries = vec![make_entry("1", "X", 10.0, date(2020, 1, 1), 1)];
        block_on(current_prices(&provider, &entries, date(2024, 6, 15))).unwrap();

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, date(2023, 6, 15));
        assert_eq!(requests[0].2, date(2024, 6, 15));
    }
}

mod channel {
    use super::*;

    #[test]
    fn overlay_on_wave_candles() {
        let candles = wave_candles(120);
        let config = ChannelConfig {
            poles: 4,
            period: 20,
            ..ChannelConfig::default()
        };
        let overlay = channel_overlay(&candles, &config).unwrap();

        assert_eq!(overlay.channel.len(), 120);
        for i in 0..120 {
            assert_eq!(overlay.channel.filter[i].time, candles[i].time);
            assert!(overlay.channel.upper_band[i].value >= overlay.channel.filter[i].value);
            assert!(overlay.channel.lower_band[i].value <= overlay.channel.filter[i].value);
        }

        assert!(overlay.segments.len() > 1);
        for pair in overlay.segments.windows(2) {
            assert_ne!(pair[0].trend, pair[1].trend);
            let tail = pair[0].filter.last().unwrap();
            assert_eq!(*tail, pair[1].filter[0]);
        }
    }

    #[test]
    fn variants_stay_finite() {
        let candles = wave_candles(80);
        for poles in 1..=9 {
            for (reduced_lag, fast_response) in [(false, false), (true, false), (false, true), (true, true)] {
                let config = ChannelConfig {
                    poles,
                    period: 30,
                    multiplier: 1.414,
                    reduced_lag,
                    fast_response,
                };
                let overlay = channel_overlay(&candles, &config).unwrap();
                assert!(overlay.channel.filter.iter().all(|p| p.value.is_finite()));
            }
        }
    }

    #[test]
    fn short_history_rejected() {
        let result = channel_overlay(&wave_candles(9), &ChannelConfig::default());
        assert_eq!(
            result.unwrap_err(),
            ChannelError::InsufficientData { have: 9, need: 10 }
        );
    }

    #[test]
    fn overlay_on_simulated_feed() {
        let candles = SimulatedAdapter::new().generate("NVDA", date(2023, 1, 1), date(2023, 12, 31));
        let overlay = channel_overlay(&candles, &ChannelConfig::default()).unwrap();
        assert_eq!(overlay.channel.len(), candles.len());
        assert_eq!(overlay.channel.trends[0], Trend::Bullish);
    }
}
