//! Property-based tests for pipeline invariants.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated daily series.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use revenue_forecast::core::CanonicalSeries;
use revenue_forecast::models::{AdditiveModel, ForecastEngine, SeasonalityMode};
use revenue_forecast::pipeline::{assemble, merge};
use revenue_forecast::utils::round_to;
use std::collections::BTreeMap;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

/// Strategy for sparse series: day offsets mapped to values.
fn sparse_series_strategy(max_day: i64, max_len: usize) -> impl Strategy<Value = CanonicalSeries> {
    prop::collection::btree_map(0..max_day, -1000.0..1000.0_f64, 0..max_len).prop_map(|points| {
        CanonicalSeries::from_pairs(
            points
                .into_iter()
                .map(|(day, value)| (base_date() + Duration::days(day), value)),
        )
        .unwrap()
    })
}

/// Strategy for dense daily values with trend, weekly swing and noise.
fn daily_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (
            0.0..500.0_f64,
            -2.0..2.0_f64,
            0.0..50.0_f64,
            prop::collection::vec(-10.0..10.0_f64, len),
        )
            .prop_map(|(base, slope, amplitude, noise)| {
                noise
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        base + slope * i as f64
                            + amplitude * (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin()
                            + e
                    })
                    .collect()
            })
    })
}

fn make_series(values: &[f64]) -> CanonicalSeries {
    CanonicalSeries::from_pairs(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (base_date() + Duration::days(i as i64), v)),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn merge_keeps_preferred_values(
        a in sparse_series_strategy(60, 40),
        b in sparse_series_strategy(60, 40),
    ) {
        prop_assume!(!a.is_empty() || !b.is_empty());
        let merged = merge(&a, &b).unwrap();

        let mut expected: BTreeMap<NaiveDate, f64> = b.iter().map(|p| (p.date, p.value)).collect();
        for p in a.iter() {
            expected.insert(p.date, p.value);
        }

        prop_assert_eq!(merged.len(), expected.len());
        for (point, (date, value)) in merged.iter().zip(&expected) {
            prop_assert_eq!(point.date, *date);
            prop_assert_eq!(point.value, *value);
        }
    }

    #[test]
    fn rounding_is_idempotent(value in -1.0e9..1.0e9_f64) {
        let once = round_to(value, 2);
        prop_assert_eq!(round_to(once, 2), once);
    }

    #[test]
    fn forecast_bounds_are_ordered(
        values in daily_values_strategy(20, 120),
        horizon in 0usize..60,
        coverage in 0.5..0.99_f64,
    ) {
        let series = make_series(&values);
        let rows = AdditiveModel::default()
            .with_interval_coverage(coverage)
            .fit(&series, horizon)
            .unwrap();

        prop_assert_eq!(rows.len(), values.len() + horizon);
        for row in &rows {
            prop_assert!(row.lower_bound <= row.predicted);
            prop_assert!(row.predicted <= row.upper_bound);
        }
    }

    #[test]
    fn result_dates_are_contiguous(
        series in sparse_series_strategy(90, 60),
        horizon in 0usize..30,
    ) {
        prop_assume!(series.len() >= 2);
        let model = AdditiveModel::default()
            .with_weekly(SeasonalityMode::Disabled)
            .with_yearly(SeasonalityMode::Disabled);
        let rows = model.fit(&series, horizon).unwrap();
        let table = assemble(&series, &rows, "Revenue").unwrap();

        let first = series.first_date().unwrap();
        let last = series.last_date().unwrap() + Duration::days(horizon as i64);
        prop_assert_eq!(table.len() as i64, (last - first).num_days() + 1);
        for (i, row) in table.rows.iter().enumerate() {
            let expected = first + Duration::days(i as i64);
            prop_assert_eq!(&row.date, &expected.format("%Y/%m/%d").to_string());
            prop_assert_eq!(row.actual.is_some(), series.get(expected).is_some());
        }
    }
}
