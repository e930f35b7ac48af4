//! Pipeline configuration loaded from JSON.
//!
//! Every field has a default, so an empty object `{}` is a complete
//! configuration:
//!
//! ```
//! use revenue_forecast::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{"horizon": 30}"#).unwrap();
//! assert_eq!(config.horizon, 30);
//! assert_eq!(config.legacy.date_field, "ga:date");
//! ```

use crate::catalog::{MetricCatalog, MetricEntry};
use crate::error::{ForecastError, Result};
use crate::models::{AdditiveConfig, MAX_HORIZON_DAYS};
use crate::sources::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default forecast horizon in days.
pub const DEFAULT_HORIZON: usize = 90;

/// Where one source reports its dates and which range to request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub date_field: String,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl SourceConfig {
    pub fn primary() -> Self {
        Self {
            name: "ga4".to_string(),
            date_field: "date".to_string(),
            start: None,
            end: None,
        }
    }

    /// The legacy backend stopped collecting data at the end of July 2023.
    pub fn legacy() -> Self {
        Self {
            name: "ua".to_string(),
            date_field: "ga:date".to_string(),
            start: NaiveDate::from_ymd_opt(2005, 1, 1),
            end: NaiveDate::from_ymd_opt(2023, 7, 31),
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Days to forecast past the last observation.
    pub horizon: usize,
    pub model: AdditiveConfig,
    pub primary: SourceConfig,
    pub legacy: SourceConfig,
    /// Catalog entries; empty means the built-in catalog.
    pub metrics: Vec<MetricEntry>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            model: AdditiveConfig::default(),
            primary: SourceConfig::primary(),
            legacy: SourceConfig::legacy(),
            metrics: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ForecastError::Config(e.to_string()))
    }

    /// Read and parse a JSON file, then validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ForecastError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ForecastError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon > MAX_HORIZON_DAYS {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon must be at most {} days, got {}",
                MAX_HORIZON_DAYS, self.horizon
            )));
        }
        self.model.validate()?;
        self.primary.range().validate()?;
        self.legacy.range().validate()?;
        for source in [&self.primary, &self.legacy] {
            if source.date_field.trim().is_empty() {
                return Err(ForecastError::InvalidParameter(format!(
                    "source `{}` has an empty date field",
                    source.name
                )));
            }
        }
        Ok(())
    }

    /// Built-in catalog with the configured entries added over it.
    pub fn catalog(&self) -> MetricCatalog {
        let mut catalog = MetricCatalog::default();
        for entry in &self.metrics {
            catalog.insert(entry.clone());
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeasonalityMode;
    use std::io::Write;

    #[test]
    fn empty_object_gives_defaults() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.horizon, 90);
        assert_eq!(config.primary.date_field, "date");
        assert_eq!(config.legacy.end, NaiveDate::from_ymd_opt(2023, 7, 31));
    }

    #[test]
    fn round_trips_through_json() {
        let mut config = PipelineConfig::default();
        config.horizon = 14;
        config.model.weekly = SeasonalityMode::Disabled;
        config.metrics.push(MetricEntry::new("Users", "totalUsers", "ga:users"));

        let json = config.to_json_string().unwrap();
        let back = PipelineConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn configured_metrics_extend_catalog() {
        let config = PipelineConfig::from_json_str(
            r#"{"metrics": [{"display_name": "Users", "primary_field": "totalUsers", "legacy_field": "ga:users"}]}"#,
        )
        .unwrap();
        let catalog = config.catalog();
        assert_eq!(catalog.lookup("Users").unwrap().primary_field, "totalUsers");
        assert!(catalog.lookup("Revenue").is_ok());
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = PipelineConfig::from_json_str(r#"{"horizon": "soon"}"#).unwrap_err();
        assert!(matches!(err, ForecastError::Config(_)));
    }

    #[test]
    fn load_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"model": {{"interval_coverage": 1.5}}}}"#).unwrap();
        let err = PipelineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter(_)));

        let err = PipelineConfig::load("/nonexistent/revcast.json").unwrap_err();
        assert!(matches!(err, ForecastError::Config(_)));
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let config = PipelineConfig::from_json_str(r#"{"horizon": 200000000}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ForecastError::InvalidParameter(_))
        ));

        let config = PipelineConfig {
            horizon: MAX_HORIZON_DAYS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_source_range_is_rejected() {
        let mut config = PipelineConfig::default();
        config.primary.start = NaiveDate::from_ymd_opt(2024, 2, 1);
        config.primary.end = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(config.validate().is_err());
    }
}
