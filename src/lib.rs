//! # revenue-forecast
//!
//! Reconciles a business metric reported by two analytics sources (a legacy
//! backend and its successor) into one daily series, then forecasts it with
//! an additive piecewise-linear trend plus Fourier seasonality model.
//!
//! The pipeline is a sequence of pure stages: normalize each source, merge
//! the two series preferring the primary source, fit a [`ForecastEngine`],
//! and assemble a presentation table with rounded values and bounds.
//!
//! ```
//! use revenue_forecast::prelude::*;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = CanonicalSeries::from_pairs(
//!     (0..60).map(|i| (start + chrono::Duration::days(i), 100.0 + i as f64)),
//! )
//! .unwrap();
//!
//! let rows = AdditiveModel::default().fit(&series, 10).unwrap();
//! assert_eq!(rows.len(), 70);
//! assert!(rows.iter().all(|r| r.lower_bound <= r.predicted && r.predicted <= r.upper_bound));
//! ```

#![allow(clippy::needless_range_loop)]

pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::catalog::{MetricCatalog, MetricEntry};
    pub use crate::config::PipelineConfig;
    pub use crate::core::{CanonicalPoint, CanonicalSeries, ForecastRow};
    pub use crate::error::{ErrorKind, ForecastError, Result};
    pub use crate::models::{AdditiveConfig, AdditiveModel, ForecastEngine, SeasonalityMode};
    pub use crate::pipeline::{ForecastPipeline, ResultRow, ResultTable, SourceSchema};
    pub use crate::sources::{CsvSource, DateRange, RawRecord, SourceAdapter, StaticSource};
}
