//! Statistical utility functions.

use crate::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal critical value for an interval coverage.
///
/// # Example
/// ```
/// use revenue_forecast::utils::stats::z_for_coverage;
///
/// // 95% coverage -> z ≈ 1.96
/// let z = z_for_coverage(0.95).unwrap();
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn z_for_coverage(coverage: f64) -> Result<f64> {
    if !(coverage > 0.0 && coverage < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "interval coverage must be in (0, 1), got {}",
            coverage
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::ComputationError(format!("standard normal: {}", e)))?;
    Ok(normal.inverse_cdf(0.5 + coverage / 2.0))
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Round to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
