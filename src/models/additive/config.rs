//! Configuration of the additive trend/seasonality model.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a built-in seasonal component is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// Enabled when the history is long enough to identify it.
    #[default]
    Auto,
    /// Always fitted.
    Enabled,
    /// Never fitted.
    Disabled,
}

/// A user-defined periodic component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSeasonality {
    pub name: String,
    /// Period length in days (may be fractional, e.g. 30.5).
    pub period_days: f64,
    /// Number of Fourier pairs.
    pub fourier_order: usize,
}

/// Parameters of [`AdditiveModel`](super::AdditiveModel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveConfig {
    /// Number of automatically placed trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints are placed.
    pub changepoint_range: f64,
    /// Manual changepoint dates; replaces automatic placement when set.
    pub changepoints: Option<Vec<NaiveDate>>,
    /// Prior standard deviation of slope changes.
    pub changepoint_prior_scale: f64,
    /// Prior standard deviation of Fourier coefficients.
    pub seasonality_prior_scale: f64,
    pub weekly: SeasonalityMode,
    pub yearly: SeasonalityMode,
    pub extra_seasonalities: Vec<CustomSeasonality>,
    /// Probability mass the forecast interval should contain.
    pub interval_coverage: f64,
}

impl Default for AdditiveConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoints: None,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            weekly: SeasonalityMode::Auto,
            yearly: SeasonalityMode::Auto,
            extra_seasonalities: Vec::new(),
            interval_coverage: 0.95,
        }
    }
}

impl AdditiveConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.changepoint_prior_scale > 0.0) || !self.changepoint_prior_scale.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_prior_scale must be positive, got {}",
                self.changepoint_prior_scale
            )));
        }
        if !(self.seasonality_prior_scale > 0.0) || !self.seasonality_prior_scale.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonality_prior_scale must be positive, got {}",
                self.seasonality_prior_scale
            )));
        }
        if !(self.interval_coverage > 0.0 && self.interval_coverage < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval_coverage must be in (0, 1), got {}",
                self.interval_coverage
            )));
        }
        for s in &self.extra_seasonalities {
            if !(s.period_days >= 2.0) || !s.period_days.is_finite() {
                return Err(ForecastError::InvalidParameter(format!(
                    "seasonality `{}` needs a period of at least 2 days, got {}",
                    s.name, s.period_days
                )));
            }
            if s.fourier_order == 0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "seasonality `{}` needs a positive fourier order",
                    s.name
                )));
            }
        }
        Ok(())
    }
}
