//! In-sample accuracy metrics used for fit diagnostics.

use crate::error::{ForecastError, Result};

/// Accuracy of fitted values against the observed history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (None if zeros in actual)
    pub mape: Option<f64>,
    /// R-squared (coefficient of determination)
    pub r_squared: f64,
}

/// Calculate accuracy metrics between actual and fitted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }

    if actual.len() != predicted.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "expected {} predictions, got {}",
            actual.len(),
            predicted.len()
        )));
    }

    let n = actual.len() as f64;

    let mae: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;

    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let rmse = (ss_res / n).sqrt();

    // Revenue series routinely contain zero days
    let mape = if actual.contains(&0.0) {
        None
    } else {
        let sum: f64 = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| ((a - p) / a).abs())
            .sum();
        Some(100.0 * sum / n)
    };

    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(AccuracyMetrics {
        mae,
        rmse,
        mape,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_fit_has_zero_error() {
        let actual = vec![1.0, 2.0, 3.0, 4.0];
        let m = calculate_metrics(&actual, &actual).unwrap();
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mape, Some(0.0));
        assert_relative_eq!(m.r_squared, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn known_errors() {
        let actual = vec![10.0, 20.0, 30.0];
        let predicted = vec![12.0, 18.0, 30.0];
        let m = calculate_metrics(&actual, &predicted).unwrap();
        assert_relative_eq!(m.mae, 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(m.rmse, (8.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(m.mape.unwrap(), 100.0 * (0.2 + 0.1) / 3.0, epsilon = 1e-9);
        assert_relative_eq!(m.r_squared, 1.0 - 8.0 / 200.0, epsilon = 1e-12);
    }

    #[test]
    fn mape_is_undefined_with_zero_actuals() {
        let m = calculate_metrics(&[0.0, 5.0], &[1.0, 5.0]).unwrap();
        assert!(m.mape.is_none());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(calculate_metrics(&[1.0, 2.0], &[1.0]).is_err());
        assert!(calculate_metrics(&[], &[]).is_err());
    }
}
