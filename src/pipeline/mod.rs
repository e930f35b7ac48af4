//! The reconciliation-and-forecast pipeline.
//!
//! Stages run in order, each borrowing its input and returning a new value:
//!
//! 1. [`normalize`]: raw records of each source into a canonical series
//! 2. [`merge`]: the two series into one, the primary source winning overlaps
//! 3. a [`ForecastEngine`]: forecast rows over history plus the horizon
//! 4. [`assemble`]: actuals and forecast joined into a [`ResultTable`]
//!
//! # Example
//!
//! ```
//! use revenue_forecast::pipeline::{ForecastPipeline, SourceSchema};
//! use revenue_forecast::models::AdditiveModel;
//! use revenue_forecast::sources::RawRecord;
//!
//! let legacy: Vec<RawRecord> = (1..=20)
//!     .map(|d| RawRecord::new()
//!         .with("ga:date", &format!("202301{:02}", d))
//!         .with("ga:sessions", &(100 + d).to_string()))
//!     .collect();
//! let primary: Vec<RawRecord> = (15..=31)
//!     .map(|d| RawRecord::new()
//!         .with("date", &format!("202301{:02}", d))
//!         .with("sessions", &(110 + d).to_string()))
//!     .collect();
//!
//! let pipeline = ForecastPipeline::new(AdditiveModel::default(), 7);
//! let output = pipeline
//!     .run_records(
//!         &primary,
//!         &SourceSchema::new("ga4", "date", "sessions"),
//!         &legacy,
//!         &SourceSchema::new("ua", "ga:date", "ga:sessions"),
//!         "Sessions",
//!     )
//!     .unwrap();
//!
//! assert_eq!(output.table.len(), 31 + 7);
//! assert_eq!(output.report.overlap, 6);
//! ```

pub mod assemble;
pub mod merge;
pub mod normalize;

pub use assemble::{assemble, column_names, ResultRow, ResultTable};
pub use merge::{merge, overlap_count};
pub use normalize::{normalize, Normalized, SourceSchema};

use crate::catalog::MetricEntry;
use crate::config::PipelineConfig;
use crate::core::CanonicalSeries;
use crate::error::Result;
use crate::models::{AdditiveModel, BoxedEngine, ForecastEngine};
use crate::sources::{DateRange, RawRecord, SourceAdapter};
use serde::Serialize;
use tracing::info;

/// Counts gathered while running the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub primary_points: usize,
    pub legacy_points: usize,
    pub primary_skipped: usize,
    pub legacy_skipped: usize,
    /// Same-day records summed by the normalizer, both sources.
    pub duplicates_combined: usize,
    /// Dates reported by both sources.
    pub overlap: usize,
    pub merged_points: usize,
    pub forecast_rows: usize,
}

/// Result table plus the run report.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub table: ResultTable,
    pub report: RunReport,
}

/// Runs normalize, merge, forecast and assemble with one engine.
pub struct ForecastPipeline {
    engine: BoxedEngine,
    horizon: usize,
}

impl ForecastPipeline {
    pub fn new<E>(engine: E, horizon: usize) -> Self
    where
        E: ForecastEngine + Send + Sync + 'static,
    {
        Self::with_engine(Box::new(engine), horizon)
    }

    pub fn with_engine(engine: BoxedEngine, horizon: usize) -> Self {
        Self { engine, horizon }
    }

    /// Additive model and horizon taken from a validated configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            AdditiveModel::new(config.model.clone()),
            config.horizon,
        ))
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Run from two already normalized series.
    pub fn run_series(
        &self,
        primary: &CanonicalSeries,
        legacy: &CanonicalSeries,
        metric_label: &str,
    ) -> Result<PipelineOutput> {
        let report = RunReport {
            primary_points: primary.len(),
            legacy_points: legacy.len(),
            ..RunReport::default()
        };
        self.forecast_merged(primary, legacy, metric_label, report)
    }

    /// Run from the raw records of both sources.
    pub fn run_records(
        &self,
        primary: &[RawRecord],
        primary_schema: &SourceSchema,
        legacy: &[RawRecord],
        legacy_schema: &SourceSchema,
        metric_label: &str,
    ) -> Result<PipelineOutput> {
        let primary = normalize(primary, primary_schema)?;
        let legacy = normalize(legacy, legacy_schema)?;

        let report = RunReport {
            primary_points: primary.series.len(),
            legacy_points: legacy.series.len(),
            primary_skipped: primary.skipped,
            legacy_skipped: legacy.skipped,
            duplicates_combined: primary.duplicates_combined + legacy.duplicates_combined,
            ..RunReport::default()
        };
        self.forecast_merged(&primary.series, &legacy.series, metric_label, report)
    }

    /// Fetch `metric` from both adapters and run.
    ///
    /// Source failures are returned unchanged so the caller can retry.
    pub fn run_sources(
        &self,
        primary: &dyn SourceAdapter,
        primary_range: &DateRange,
        legacy: &dyn SourceAdapter,
        legacy_range: &DateRange,
        metric: &MetricEntry,
    ) -> Result<PipelineOutput> {
        let primary_records = primary.fetch(&metric.primary_field, primary_range)?;
        let legacy_records = legacy.fetch(&metric.legacy_field, legacy_range)?;
        info!(
            primary = primary.name(),
            primary_records = primary_records.len(),
            legacy = legacy.name(),
            legacy_records = legacy_records.len(),
            metric = %metric.display_name,
            "fetched source records"
        );

        self.run_records(
            &primary_records,
            &SourceSchema::new(primary.name(), primary.date_field(), &metric.primary_field),
            &legacy_records,
            &SourceSchema::new(legacy.name(), legacy.date_field(), &metric.legacy_field),
            &metric.display_name,
        )
    }

    fn forecast_merged(
        &self,
        primary: &CanonicalSeries,
        legacy: &CanonicalSeries,
        metric_label: &str,
        mut report: RunReport,
    ) -> Result<PipelineOutput> {
        let merged = merge(primary, legacy)?;
        report.overlap = overlap_count(primary, legacy);
        report.merged_points = merged.len();

        let forecast = self.engine.fit(&merged, self.horizon)?;
        report.forecast_rows = forecast.len();

        let table = assemble(&merged, &forecast, metric_label)?;
        info!(
            engine = self.engine.name(),
            metric = metric_label,
            merged = report.merged_points,
            overlap = report.overlap,
            rows = table.len(),
            "pipeline finished"
        );

        Ok(PipelineOutput { table, report })
    }
}

impl std::fmt::Debug for ForecastPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastPipeline")
            .field("engine", &self.engine.name())
            .field("horizon", &self.horizon)
            .finish()
    }
}
