//! End-to-end tests over the analytics engines.
//!
//! Tests cover:
//! - Indicator windows and bounds on synthetic series
//! - Summary edge cases and known values
//! - Portfolio aggregation and weight handling through a provider
//! - Correlation and comparison over several symbols
//! - Determinism and concurrent use of the engines and memoized provider

mod common;

use approx::assert_relative_eq;
use common::*;
use marketlens::adapters::memoized_provider::MemoizedProvider;
use marketlens::cli::{build_portfolio, collect_summaries, fetch_available};
use marketlens::domain::comparison::compare;
use marketlens::domain::correlation::correlate;
use marketlens::domain::derived::compute_indicators;
use marketlens::domain::error::AnalyticsError;
use marketlens::domain::indicator::macd::macd_lines;
use marketlens::domain::interval::Interval;
use marketlens::domain::portfolio::{aggregate, normalize_weights, WeightedAsset};
use marketlens::domain::risk::compute_summary;
use marketlens::ports::data_port::SeriesProvider;
use proptest::prelude::*;

mod indicator_engine {
    use super::*;

    #[test]
    fn sma_windows_match_brute_force_mean() {
        let closes: Vec<f64> = (0..100).map(|i| 50.0 + (i * 7 % 31) as f64 + i as f64 * 0.01).collect();
        let derived = compute_indicators(&series_from_closes("SYN", &closes));

        for (i, bar) in derived.bars.iter().enumerate() {
            if i < 19 {
                assert!(bar.sma_20.is_none(), "sma_20[{i}]");
            } else {
                let mean = closes[i + 1 - 20..=i].iter().sum::<f64>() / 20.0;
                assert_relative_eq!(bar.sma_20.unwrap(), mean, epsilon = 1e-9);
            }
            if i < 49 {
                assert!(bar.sma_50.is_none(), "sma_50[{i}]");
            } else {
                let mean = closes[i + 1 - 50..=i].iter().sum::<f64>() / 50.0;
                assert_relative_eq!(bar.sma_50.unwrap(), mean, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn rsi_is_one_hundred_without_losses() {
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let derived = compute_indicators(&series_from_closes("UP", &closes));
        for bar in &derived.bars[14..] {
            assert_eq!(bar.rsi_14, Some(100.0));
        }
    }

    #[test]
    fn macd_golden_series() {
        let derived = compute_indicators(&series_from_closes("G", &[10.0, 11.0, 12.0, 11.0, 13.0]));
        let lines = macd_lines(&[10.0, 11.0, 12.0, 11.0, 13.0], 12, 26, 9);

        assert_relative_eq!(derived.bars[4].macd, 0.4285955308146754, epsilon = 1e-12);
        assert_relative_eq!(derived.bars[4].signal_line, 0.162128435711287, epsilon = 1e-12);
        for (bar, (m, s)) in derived.bars.iter().zip(lines.macd.iter().zip(&lines.signal)) {
            assert_eq!(bar.macd, *m);
            assert_eq!(bar.signal_line, *s);
        }
    }

    #[test]
    fn weekly_series_feeds_indicators() {
        let closes = generate_closes(400, 100.0, 0.0);
        let provider = MockProvider::new().with_bars("W", bars_from_closes("2022-01-03", &closes));
        let weekly = provider
            .fetch("W", date(2022, 1, 1), date(2023, 12, 31), Interval::Weekly)
            .unwrap();

        assert!(weekly.len() > 50 && weekly.len() < 60);
        let derived = compute_indicators(&weekly);
        assert!(derived.last().unwrap().sma_50.is_some());
    }

    proptest! {
        #[test]
        fn rsi_bounded_for_any_finite_series(closes in prop::collection::vec(0.01f64..10_000.0, 15..120)) {
            let derived = compute_indicators(&series_from_closes("P", &closes));
            for bar in &derived.bars[14..] {
                let rsi = bar.rsi_14.unwrap();
                prop_assert!((0.0..=100.0).contains(&rsi));
            }
        }
    }
}

mod risk_engine {
    use super::*;

    #[test]
    fn short_series_is_insufficient() {
        for closes in [&[][..], &[100.0][..]] {
            let err = compute_summary(&series_from_closes("S", closes)).unwrap_err();
            assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
        }
    }

    #[test]
    fn summaries_skip_short_and_missing_symbols() {
        let provider = MockProvider::new()
            .with_bars("AAPL", bars_from_closes("2024-01-01", &[100.0, 110.0, 99.0, 108.9]))
            .with_bars("NEW", bars_from_closes("2024-01-01", &[10.0]))
            .with_error("GONE", "delisted");
        let symbols = vec!["AAPL".to_string(), "NEW".to_string(), "GONE".to_string()];

        let summaries = collect_summaries(&provider, &sample_settings(), &symbols).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].symbol, "AAPL");
        assert_relative_eq!(summaries[0].total_return_pct.unwrap(), 8.9, epsilon = 1e-9);
    }

    #[test]
    fn summaries_fail_when_nothing_usable() {
        let provider = MockProvider::new().with_bars("NEW", bars_from_closes("2024-01-01", &[10.0]));
        let err = collect_summaries(&provider, &sample_settings(), &["NEW".to_string()]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
    }
}

mod portfolio_aggregation {
    use super::*;

    fn provider() -> MockProvider {
        MockProvider::new()
            .with_bars("A", bars_from_closes("2024-03-01", &[100.0, 110.0, 121.0]))
            .with_bars("B", bars_from_closes("2024-03-01", &[50.0, 55.0, 60.5]))
            .with_bars("C", bars_from_closes("2024-03-02", &[50.0, 55.0, 60.5]))
    }

    #[test]
    fn blended_values_through_provider() {
        let assets = vec![WeightedAsset::new("A", 0.6), WeightedAsset::new("B", 0.4)];
        let result = build_portfolio(&provider(), &sample_settings(), &assets, 1e-6).unwrap();

        let values: Vec<f64> = result.blended.iter().map(|p| p.value).collect();
        assert_relative_eq!(values[0], 80.0, epsilon = 1e-9);
        assert_relative_eq!(values[1], 88.0, epsilon = 1e-9);
        assert_relative_eq!(values[2], 96.8, epsilon = 1e-9);
        assert_relative_eq!(result.portfolio_return_pct.unwrap(), 21.0, epsilon = 1e-9);
    }

    #[test]
    fn weights_summing_to_point_nine_fail() {
        let assets = vec![WeightedAsset::new("A", 0.5), WeightedAsset::new("B", 0.4)];
        let err = build_portfolio(&provider(), &sample_settings(), &assets, 1e-6).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidWeights { .. }));
    }

    #[test]
    fn normalized_weights_blend() {
        let raw = vec![WeightedAsset::new("A", 3.0), WeightedAsset::new("B", 2.0)];
        let assets = normalize_weights(&raw).unwrap();
        let result = build_portfolio(&provider(), &sample_settings(), &assets, 1e-6).unwrap();
        assert_relative_eq!(result.blended[0].value, 80.0, epsilon = 1e-9);
    }

    #[test]
    fn misaligned_dates_are_a_mismatch() {
        let assets = vec![WeightedAsset::new("A", 0.5), WeightedAsset::new("C", 0.5)];
        let err = build_portfolio(&provider(), &sample_settings(), &assets, 1e-6).unwrap_err();
        assert!(matches!(err, AnalyticsError::InputMismatch { .. }));
    }

    #[test]
    fn missing_asset_is_unavailable() {
        let assets = vec![WeightedAsset::new("A", 0.5), WeightedAsset::new("Z", 0.5)];
        let err = build_portfolio(&provider(), &sample_settings(), &assets, 1e-6).unwrap_err();
        assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
    }
}

mod correlation_and_comparison {
    use super::*;

    #[test]
    fn identical_and_inverse_patterns() {
        let a = series_from_closes("A", &[100.0, 110.0, 99.0, 108.9]);
        let same = series_from_closes("SAME", &[200.0, 220.0, 198.0, 217.8]);
        let inverse = series_from_closes("INV", &[100.0, 90.0, 99.0, 89.1]);

        let matrix = correlate(&[&a, &same, &inverse]).unwrap();
        assert_relative_eq!(matrix.get("A", "SAME").unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(matrix.get("A", "INV").unwrap(), -1.0, epsilon = 1e-9);
        assert_relative_eq!(matrix.get("INV", "SAME").unwrap(), -1.0, epsilon = 1e-9);
    }

    #[test]
    fn single_symbol_gives_empty_matrix() {
        let a = series_from_closes("A", &generate_closes(30, 50.0, 0.0));
        let matrix = correlate(&[&a]).unwrap();
        assert!(matrix.is_empty());
        assert!(matrix.values.is_empty());
    }

    #[test]
    fn unavailable_symbol_is_skipped_for_comparison() {
        let provider = MockProvider::new()
            .with_bars("A", bars_from_closes("2024-01-01", &[40.0, 44.0]))
            .with_error("GONE", "delisted");
        let symbols = vec!["A".to_string(), "GONE".to_string()];

        let series = fetch_available(&provider, &sample_settings(), &symbols).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].symbol(), "A");

        let refs: Vec<_> = series.iter().collect();
        let rebased = compare(&refs);
        assert_eq!(rebased.len(), 1);
        assert_relative_eq!(rebased[0].points[1].value, 110.0, epsilon = 1e-9);
    }

    #[test]
    fn nothing_available_is_an_error() {
        let provider = MockProvider::new().with_error("GONE", "delisted");
        let err = fetch_available(&provider, &sample_settings(), &["GONE".to_string()]).unwrap_err();
        assert!(matches!(err, AnalyticsError::DataUnavailable { ref symbol, .. } if symbol == "GONE"));
    }

    #[test]
    fn empty_fetched_series_correlates_to_none() {
        let provider = MockProvider::new()
            .with_bars("A", bars_from_closes("2024-01-01", &[100.0, 110.0, 99.0, 108.9]))
            .with_bars("OLD", bars_from_closes("2019-01-01", &[10.0, 11.0, 12.0]));
        let symbols = vec!["A".to_string(), "OLD".to_string()];

        // OLD has no bars inside the analysis window
        let series = fetch_available(&provider, &sample_settings(), &symbols).unwrap();
        assert!(series[1].is_empty());
        let refs: Vec<_> = series.iter().collect();
        let matrix = correlate(&refs).unwrap();
        assert_eq!(matrix.get("A", "OLD"), None);
    }

    #[test]
    fn compare_rebases_every_symbol() {
        let a = series_from_closes("A", &[40.0, 44.0]);
        let b = series_from_closes("B", &[200.0, 180.0]);
        let rebased = compare(&[&a, &b]);
        assert_eq!(rebased[0].points[0].value, 100.0);
        assert_eq!(rebased[1].points[0].value, 100.0);
        assert_relative_eq!(rebased[0].points[1].value, 110.0, epsilon = 1e-9);
        assert_relative_eq!(rebased[1].points[1].value, 90.0, epsilon = 1e-9);
    }
}

mod determinism_and_sharing {
    use super::*;

    #[test]
    fn engines_are_idempotent() {
        let a = series_from_closes("A", &generate_closes(120, 100.0, 0.0));
        let b = series_from_closes("B", &generate_closes(120, 80.0, 2.5));
        let before = (a.clone(), b.clone());

        assert_eq!(compute_indicators(&a), compute_indicators(&a));
        assert_eq!(compute_summary(&a).unwrap(), compute_summary(&a).unwrap());
        assert_eq!(
            aggregate(&[(&a, 0.5), (&b, 0.5)], 1e-6).unwrap(),
            aggregate(&[(&a, 0.5), (&b, 0.5)], 1e-6).unwrap()
        );
        assert_eq!(correlate(&[&a, &b]).unwrap(), correlate(&[&a, &b]).unwrap());
        assert_eq!(compare(&[&a, &b]), compare(&[&a, &b]));
        assert_eq!((a, b), before);
    }

    #[test]
    fn engines_run_concurrently_on_shared_input() {
        let series = series_from_closes("A", &generate_closes(200, 100.0, 1.0));
        let expected = compute_indicators(&series);

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| compute_indicators(&series))).collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn memoized_provider_fetches_once_per_render() {
        let inner = MockProvider::new().with_bars("A", bars_from_closes("2024-01-01", &[1.0, 2.0, 3.0]));
        let provider = MemoizedProvider::new(inner);
        let settings = sample_settings();

        let symbols = vec!["A".to_string()];
        collect_summaries(&provider, &settings, &symbols).unwrap();
        collect_summaries(&provider, &settings, &symbols).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| collect_summaries(&provider, &settings, &symbols).unwrap());
            }
        });

        assert_eq!(provider.fetch_count(), 1);
        assert_eq!(provider.inner().calls(), 1);
    }
}
