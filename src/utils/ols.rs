//! Regularised least squares on a column-major design matrix.
//!
//! The additive model fits trend and seasonal coefficients jointly by solving
//! the penalised normal equations `(X'X + diag(λ)) β = X'y`, which is the MAP
//! estimate under independent zero-mean Gaussian priors on the coefficients.

use crate::error::{ForecastError, Result};

/// Ridge added to every diagonal entry for numerical stability.
const JITTER: f64 = 1e-8;

/// Fitted coefficients of a penalised least-squares problem.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    /// One coefficient per design column, in column order.
    pub coefficients: Vec<f64>,
}

impl LeastSquaresFit {
    /// Evaluate `X β` for a column-major design.
    pub fn predict(&self, columns: &[Vec<f64>]) -> Result<Vec<f64>> {
        if columns.len() != self.coefficients.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "design has {} columns, fit has {} coefficients",
                columns.len(),
                self.coefficients.len()
            )));
        }
        let n = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut out = vec![0.0; n];
        for (col, &beta) in columns.iter().zip(&self.coefficients) {
            if col.len() != n {
                return Err(ForecastError::InvalidParameter(format!(
                    "design column has {} rows, expected {}",
                    col.len(),
                    n
                )));
            }
            for (o, x) in out.iter_mut().zip(col) {
                *o += beta * x;
            }
        }
        Ok(out)
    }

    /// Residuals `y - X β`.
    pub fn residuals(&self, y: &[f64], columns: &[Vec<f64>]) -> Result<Vec<f64>> {
        let fitted = self.predict(columns)?;
        Ok(y.iter().zip(fitted).map(|(yi, fi)| yi - fi).collect())
    }
}

/// Solve `min ||y - X β||² + Σ penalties[j] β[j]²`.
///
/// # Arguments
/// * `y` - Target values (length n)
/// * `columns` - Design matrix as columns, each of length n
/// * `penalties` - Non-negative penalty per column
pub fn penalized_least_squares(
    y: &[f64],
    columns: &[Vec<f64>],
    penalties: &[f64],
) -> Result<LeastSquaresFit> {
    let n = y.len();
    let p = columns.len();

    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if p == 0 {
        return Ok(LeastSquaresFit {
            coefficients: vec![],
        });
    }
    if penalties.len() != p {
        return Err(ForecastError::InvalidParameter(format!(
            "expected {} penalties, got {}",
            p,
            penalties.len()
        )));
    }
    if let Some(col) = columns.iter().find(|c| c.len() != n) {
        return Err(ForecastError::InvalidParameter(format!(
            "design column has {} rows, expected {}",
            col.len(),
            n
        )));
    }

    // X'X is symmetric, fill the lower triangle and mirror it
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    for i in 0..p {
        let ci = &columns[i];
        xty[i] = ci.iter().zip(y).map(|(a, b)| a * b).sum();
        for j in 0..=i {
            let s: f64 = ci.iter().zip(&columns[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
    }

    for i in 0..p {
        xtx[i][i] += penalties[i].max(0.0) + JITTER;
    }

    let coefficients = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError(
            "least squares failed: matrix not positive definite".into(),
        )
    })?;

    Ok(LeastSquaresFit { coefficients })
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Cholesky decomposition A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unpenalized_fit_recovers_line() {
        // y = 2 + 3*x
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();
        let columns = vec![vec![1.0; 5], x];

        let fit = penalized_least_squares(&y, &columns, &[0.0, 0.0]).unwrap();

        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(fit.coefficients[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn penalty_shrinks_coefficient() {
        let x = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        let y: Vec<f64> = x.iter().map(|v| 4.0 * v).collect();
        let columns = vec![x];

        let free = penalized_least_squares(&y, &columns, &[0.0]).unwrap();
        let shrunk = penalized_least_squares(&y, &columns, &[10.0]).unwrap();

        assert_relative_eq!(free.coefficients[0], 4.0, epsilon = 1e-6);
        // x'x = 10, so beta = 40 / (10 + 10) = 2
        assert_relative_eq!(shrunk.coefficients[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn collinear_columns_are_resolved_by_penalty() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![2.0, 4.0, 6.0, 8.0];
        let columns = vec![x.clone(), x];

        let fit = penalized_least_squares(&y, &columns, &[1e-3, 1e-3]).unwrap();
        let fitted = fit.predict(&columns).unwrap();
        for (f, target) in fitted.iter().zip(&y) {
            assert_relative_eq!(*f, *target, epsilon = 1e-2);
        }
    }

    #[test]
    fn residuals_of_exact_fit_are_zero() {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![1.0, 3.0, 5.0];
        let columns = vec![vec![1.0; 3], x];
        let fit = penalized_least_squares(&y, &columns, &[0.0, 0.0]).unwrap();
        let residuals = fit.residuals(&y, &columns).unwrap();
        assert!(residuals.iter().all(|r| r.abs() < 1e-6));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let y = vec![1.0, 2.0, 3.0];
        let columns = vec![vec![1.0, 2.0]];
        assert!(penalized_least_squares(&y, &columns, &[0.0]).is_err());
        assert!(penalized_least_squares(&y, &[vec![1.0; 3]], &[]).is_err());
    }

    #[test]
    fn empty_target_is_insufficient() {
        assert!(matches!(
            penalized_least_squares(&[], &[], &[]),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
