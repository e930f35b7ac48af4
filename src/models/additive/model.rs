//! Additive trend + seasonality model fitted by regularised least squares.

use super::config::{AdditiveConfig, CustomSeasonality, SeasonalityMode};
use super::seasonality::{epoch_day, resolve_components, SeasonalComponent};
use super::trend::{hinge_column, place_changepoints, PiecewiseLinearTrend};
use crate::core::{CanonicalSeries, ForecastRow};
use crate::error::{ForecastError, Result};
use crate::models::ForecastEngine;
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use crate::utils::ols::penalized_least_squares;
use crate::utils::stats::{std_dev, z_for_coverage};
use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

/// Lower bound on the residual variance (scaled units) used for priors.
const MIN_NOISE_VARIANCE: f64 = 1e-4;

/// Longest supported forecast horizon, one hundred years of days.
pub const MAX_HORIZON_DAYS: usize = 36_525;

/// Additive decomposition model.
///
/// `y(t) = trend(t) + Σ seasonal_k(t) + ε`, where the trend is piecewise
/// linear with changepoints and each seasonal component is a Fourier series.
/// Coefficients are the MAP estimate under Gaussian priors whose scales are
/// set by [`AdditiveConfig`].
///
/// # Example
///
/// ```
/// use revenue_forecast::core::CanonicalSeries;
/// use revenue_forecast::models::{AdditiveModel, ForecastEngine};
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let series = CanonicalSeries::from_pairs(
///     (0..60).map(|i| (start + Duration::days(i), 100.0 + i as f64)),
/// )
/// .unwrap();
///
/// let rows = AdditiveModel::default().fit(&series, 30).unwrap();
/// assert_eq!(rows.len(), 90);
/// assert!(rows.iter().all(|r| r.lower_bound <= r.predicted && r.predicted <= r.upper_bound));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AdditiveModel {
    config: AdditiveConfig,
}

impl AdditiveModel {
    pub fn new(config: AdditiveConfig) -> Self {
        Self { config }
    }

    /// Linear trend plus Fourier seasonality, without changepoints.
    pub fn linear() -> Self {
        Self::new(AdditiveConfig {
            n_changepoints: 0,
            changepoints: Some(Vec::new()),
            ..Default::default()
        })
    }

    pub fn with_interval_coverage(mut self, coverage: f64) -> Self {
        self.config.interval_coverage = coverage;
        self
    }

    pub fn with_weekly(mut self, mode: SeasonalityMode) -> Self {
        self.config.weekly = mode;
        self
    }

    pub fn with_yearly(mut self, mode: SeasonalityMode) -> Self {
        self.config.yearly = mode;
        self
    }

    /// Use the given changepoint dates instead of automatic placement.
    pub fn with_changepoints(mut self, dates: Vec<NaiveDate>) -> Self {
        self.config.changepoints = Some(dates);
        self
    }

    /// Add a custom periodic component.
    pub fn with_seasonality(mut self, name: &str, period_days: f64, fourier_order: usize) -> Self {
        self.config.extra_seasonalities.push(CustomSeasonality {
            name: name.to_string(),
            period_days,
            fourier_order,
        });
        self
    }

    pub fn config(&self) -> &AdditiveConfig {
        &self.config
    }

    /// Fit the model to the observed points of `series`.
    ///
    /// Non-finite values are treated as missing and excluded from the fit.
    /// Fails with [`ForecastError::InsufficientData`] when fewer than two
    /// observed points remain.
    pub fn fit_model(&self, series: &CanonicalSeries) -> Result<FittedAdditiveModel> {
        self.config.validate()?;
        let z = z_for_coverage(self.config.interval_coverage)?;

        let observed: Vec<(NaiveDate, f64)> = series
            .iter()
            .filter(|p| p.is_observed())
            .map(|p| (p.date, p.value))
            .collect();

        if observed.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: observed.len(),
            });
        }

        let origin = observed[0].0;
        let span_days = (observed[observed.len() - 1].0 - origin).num_days() as f64;
        if span_days <= 0.0 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: 1,
            });
        }
        let (first_date, last_date) = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ForecastError::InsufficientData { needed: 2, got: 0 }),
        };

        let y_scale = observed
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0_f64, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let times: Vec<f64> = observed
            .iter()
            .map(|(d, _)| (*d - origin).num_days() as f64 / span_days)
            .collect();
        let days: Vec<f64> = observed.iter().map(|(d, _)| epoch_day(*d)).collect();
        let y: Vec<f64> = observed.iter().map(|(_, v)| v / y_scale).collect();

        let changepoints = match &self.config.changepoints {
            Some(dates) => manual_changepoints(dates, origin, span_days),
            None => place_changepoints(
                &times,
                self.config.n_changepoints,
                self.config.changepoint_range,
            ),
        };
        let seasonalities = resolve_components(&self.config, span_days, observed.len());
        let n_seasonal: usize = seasonalities.iter().map(|s| s.n_features()).sum();

        let mut seasonal_columns = Vec::with_capacity(n_seasonal);
        for component in &seasonalities {
            component.push_columns(&days, &mut seasonal_columns);
        }

        let season_prior = self.config.seasonality_prior_scale.powi(2);
        let changepoint_prior = self.config.changepoint_prior_scale.powi(2);

        // First pass without changepoints estimates the noise level for the priors
        let mut columns = vec![vec![1.0; y.len()], times.clone()];
        columns.extend(seasonal_columns.iter().cloned());
        let mut penalties = vec![0.0, 0.0];
        penalties.extend(std::iter::repeat(MIN_NOISE_VARIANCE / season_prior).take(n_seasonal));
        let base = penalized_least_squares(&y, &columns, &penalties)?;
        let base_residuals = base.residuals(&y, &columns)?;
        let noise_variance = (base_residuals.iter().map(|r| r * r).sum::<f64>()
            / base_residuals.len() as f64)
            .max(MIN_NOISE_VARIANCE);

        let mut columns = vec![vec![1.0; y.len()], times.clone()];
        columns.extend(changepoints.iter().map(|&s| hinge_column(&times, s)));
        columns.extend(seasonal_columns);
        let mut penalties = vec![0.0, 0.0];
        penalties.extend(
            std::iter::repeat(noise_variance / changepoint_prior).take(changepoints.len()),
        );
        penalties.extend(std::iter::repeat(noise_variance / season_prior).take(n_seasonal));

        let fit = penalized_least_squares(&y, &columns, &penalties)?;
        let scaled_fitted = fit.predict(&columns)?;
        let scaled_residuals: Vec<f64> = y.iter().zip(&scaled_fitted).map(|(a, f)| a - f).collect();

        let coefficients = fit.coefficients;
        let n_cp = changepoints.len();
        let trend = PiecewiseLinearTrend {
            offset: coefficients[0],
            slope: coefficients[1],
            deltas: coefficients[2..2 + n_cp].to_vec(),
            changepoints,
        };

        let mut seasonal_coefficients = Vec::with_capacity(seasonalities.len());
        let mut offset = 2 + n_cp;
        for component in &seasonalities {
            let k = component.n_features();
            seasonal_coefficients.push(coefficients[offset..offset + k].to_vec());
            offset += k;
        }

        let sigma = std_dev(&scaled_residuals);
        let sigma = if sigma.is_finite() { sigma } else { 0.0 };
        if !coefficients.iter().all(|c| c.is_finite()) {
            return Err(ForecastError::ComputationError(
                "fitted coefficients are not finite".into(),
            ));
        }

        let trend_uncertainty_origin = trend.changepoints.last().copied().unwrap_or(1.0);

        // Sampling variance of the slope, used when no changepoints are fitted
        let t_mean = times.iter().sum::<f64>() / times.len() as f64;
        let sxx: f64 = times.iter().map(|t| (t - t_mean).powi(2)).sum();
        let slope_variance = if sxx > 0.0 { noise_variance / sxx } else { 0.0 };

        debug!(
            observed = observed.len(),
            changepoints = n_cp,
            seasonalities = ?seasonalities.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            sigma = sigma * y_scale,
            "fitted additive model"
        );

        Ok(FittedAdditiveModel {
            first_date,
            last_date,
            origin,
            span_days,
            y_scale,
            trend,
            seasonalities,
            seasonal_coefficients,
            sigma,
            trend_uncertainty_origin,
            slope_variance,
            z,
            observed_dates: observed.iter().map(|(d, _)| *d).collect(),
            observed_values: observed.iter().map(|(_, v)| *v).collect(),
            fitted: scaled_fitted.iter().map(|f| f * y_scale).collect(),
            residuals: scaled_residuals.iter().map(|r| r * y_scale).collect(),
        })
    }
}

impl ForecastEngine for AdditiveModel {
    fn fit(&self, series: &CanonicalSeries, horizon: usize) -> Result<Vec<ForecastRow>> {
        let fitted = self.fit_model(series)?;
        fitted.forecast_rows(horizon)
    }

    fn name(&self) -> &str {
        "Additive"
    }
}

/// Convert manual changepoint dates to scaled time, keeping interior ones.
fn manual_changepoints(dates: &[NaiveDate], origin: NaiveDate, span_days: f64) -> Vec<f64> {
    let mut points: Vec<f64> = dates
        .iter()
        .map(|d| (*d - origin).num_days() as f64 / span_days)
        .filter(|&t| {
            let inside = t > 0.0 && t < 1.0;
            if !inside {
                warn!(t, "ignoring changepoint outside the observed history");
            }
            inside
        })
        .collect();
    points.sort_by(|a, b| a.total_cmp(b));
    points.dedup();
    points
}

/// A fitted additive model, able to evaluate any calendar day.
#[derive(Debug, Clone)]
pub struct FittedAdditiveModel {
    first_date: NaiveDate,
    last_date: NaiveDate,
    origin: NaiveDate,
    span_days: f64,
    y_scale: f64,
    trend: PiecewiseLinearTrend,
    seasonalities: Vec<SeasonalComponent>,
    seasonal_coefficients: Vec<Vec<f64>>,
    /// Residual standard deviation in scaled units.
    sigma: f64,
    trend_uncertainty_origin: f64,
    /// Variance of the fitted slope in scaled units.
    slope_variance: f64,
    z: f64,
    observed_dates: Vec<NaiveDate>,
    observed_values: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl FittedAdditiveModel {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64 / self.span_days
    }

    /// Trend component at `date`.
    pub fn trend_at(&self, date: NaiveDate) -> f64 {
        self.trend.value(self.scaled_time(date)) * self.y_scale
    }

    /// Sum of all seasonal components at `date`.
    pub fn seasonal_at(&self, date: NaiveDate) -> f64 {
        let day = epoch_day(date);
        self.seasonalities
            .iter()
            .zip(&self.seasonal_coefficients)
            .map(|(s, c)| s.evaluate(c, day))
            .sum::<f64>()
            * self.y_scale
    }

    /// Value of a single named seasonal component at `date`.
    pub fn component_at(&self, name: &str, date: NaiveDate) -> Option<f64> {
        let day = epoch_day(date);
        self.seasonalities
            .iter()
            .zip(&self.seasonal_coefficients)
            .find(|(s, _)| s.name == name)
            .map(|(s, c)| s.evaluate(c, day) * self.y_scale)
    }

    /// Point prediction at `date`: trend plus seasonality.
    pub fn predict_at(&self, date: NaiveDate) -> f64 {
        self.trend_at(date) + self.seasonal_at(date)
    }

    /// Standard deviation of the prediction at `date`.
    ///
    /// Combines the in-sample noise with the spread of future slope changes,
    /// which occur at the historical changepoint rate with Laplace magnitudes
    /// of scale `mean |δ|`. The trend part grows with the cube of the distance
    /// from the last changepoint. Without changepoints the slope estimate
    /// itself is the uncertain part, growing with the square of the distance
    /// past the end of history.
    pub fn prediction_std(&self, date: NaiveDate) -> f64 {
        let distance = (self.scaled_time(date) - self.trend_uncertainty_origin).max(0.0);
        let trend_variance = if self.trend.changepoints.is_empty() {
            self.slope_variance * distance * distance
        } else {
            let rate = self.trend.changepoints.len() as f64;
            let scale = self.trend.mean_abs_delta();
            rate * 2.0 * scale * scale * distance.powi(3) / 3.0
        };
        (self.sigma * self.sigma + trend_variance).sqrt() * self.y_scale
    }

    /// Rows for every day from the first historical date through
    /// `horizon` days past the last one.
    ///
    /// Fails with [`ForecastError::InvalidParameter`] when `horizon` exceeds
    /// [`MAX_HORIZON_DAYS`] or the last row would fall outside the
    /// representable calendar.
    pub fn forecast_rows(&self, horizon: usize) -> Result<Vec<ForecastRow>> {
        if horizon > MAX_HORIZON_DAYS {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon must be at most {} days, got {}",
                MAX_HORIZON_DAYS, horizon
            )));
        }
        let end = i64::try_from(horizon)
            .ok()
            .and_then(Duration::try_days)
            .and_then(|span| self.last_date.checked_add_signed(span))
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "horizon of {} days runs past the last representable date",
                    horizon
                ))
            })?;
        Ok(std::iter::successors(Some(self.first_date), |date| date.succ_opt())
            .take_while(|date| *date <= end)
            .map(|date| {
                let half_width = self.z * self.prediction_std(date);
                ForecastRow::symmetric(date, self.predict_at(date), half_width)
            })
            .collect())
    }

    /// Trend changepoint dates.
    pub fn changepoints(&self) -> Vec<NaiveDate> {
        self.trend
            .changepoints
            .iter()
            .map(|t| self.origin + Duration::days((t * self.span_days).round() as i64))
            .collect()
    }

    /// Names of the fitted seasonal components.
    pub fn seasonality_names(&self) -> Vec<&str> {
        self.seasonalities.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn trend(&self) -> &PiecewiseLinearTrend {
        &self.trend
    }

    /// Residual standard deviation in the units of the metric.
    pub fn sigma(&self) -> f64 {
        self.sigma * self.y_scale
    }

    /// In-sample fitted values, one per observed point.
    pub fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    /// In-sample residuals (actual - fitted), one per observed point.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Dates of the observed points used for fitting.
    pub fn observed_dates(&self) -> &[NaiveDate] {
        &self.observed_dates
    }

    /// In-sample accuracy of the fit.
    pub fn metrics(&self) -> Result<AccuracyMetrics> {
        calculate_metrics(&self.observed_values, &self.fitted)
    }
}
