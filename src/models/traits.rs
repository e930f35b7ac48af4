//! ForecastEngine trait defining the interface between the merger and the assembler.

use crate::core::{CanonicalSeries, ForecastRow};
use crate::error::Result;

/// Common interface for forecasting engines.
///
/// An engine turns a canonical daily series into one [`ForecastRow`] per
/// calendar day from the first historical date through `horizon` days past
/// the last one. Implementations must keep `lower_bound <= predicted <=
/// upper_bound` on every row and must not retain state between calls.
///
/// This trait is object-safe and can be used with `Box<dyn ForecastEngine>`.
pub trait ForecastEngine {
    /// Fit the series and produce rows for its range plus `horizon` days.
    fn fit(&self, series: &CanonicalSeries, horizon: usize) -> Result<Vec<ForecastRow>>;

    /// Get the engine name.
    fn name(&self) -> &str;
}

/// Type alias for boxed engine trait objects.
///
/// # Example
///
/// ```
/// use revenue_forecast::models::{AdditiveModel, BoxedEngine, ForecastEngine};
///
/// let engine: BoxedEngine = Box::new(AdditiveModel::default());
/// assert_eq!(engine.name(), "Additive");
/// ```
pub type BoxedEngine = Box<dyn ForecastEngine + Send + Sync>;

impl<E: ForecastEngine + ?Sized> ForecastEngine for Box<E> {
    fn fit(&self, series: &CanonicalSeries, horizon: usize) -> Result<Vec<ForecastRow>> {
        (**self).fit(series, horizon)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;
    use crate::models::AdditiveModel;
    use chrono::{Duration, NaiveDate};

    /// Mean of the history with a fixed band, used to check substitution.
    struct MeanEngine;

    impl ForecastEngine for MeanEngine {
        fn fit(&self, series: &CanonicalSeries, horizon: usize) -> Result<Vec<ForecastRow>> {
            let (first, last) = match (series.first_date(), series.last_date()) {
                (Some(f), Some(l)) => (f, l),
                _ => return Err(ForecastError::InsufficientData { needed: 2, got: 0 }),
            };
            let values = series.values();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let days = (last - first).num_days() + horizon as i64;
            Ok((0..=days)
                .map(|i| ForecastRow::symmetric(first + Duration::days(i), mean, 1.0))
                .collect())
        }

        fn name(&self) -> &str {
            "Mean"
        }
    }

    fn make_series(n: i64) -> CanonicalSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        CanonicalSeries::from_pairs((0..n).map(|i| (start + Duration::days(i), i as f64))).unwrap()
    }

    #[test]
    fn boxed_engines_are_interchangeable() {
        let engines: Vec<BoxedEngine> = vec![Box::new(AdditiveModel::default()), Box::new(MeanEngine)];
        let series = make_series(20);

        for engine in &engines {
            let rows = engine.fit(&series, 5).unwrap();
            assert_eq!(rows.len(), 25, "engine {}", engine.name());
            assert!(rows.iter().all(|r| r.is_ordered()));
        }

        let names: Vec<_> = engines.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Additive", "Mean"]);
    }

    #[test]
    fn engine_calls_are_independent() {
        let engine = AdditiveModel::default();
        let a = engine.fit(&make_series(20), 3).unwrap();
        let _ = engine.fit(&make_series(40), 3).unwrap();
        let again = engine.fit(&make_series(20), 3).unwrap();
        assert_eq!(a, again);
    }
}
