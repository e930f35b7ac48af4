//! Piecewise-linear trend with slope changes at changepoints.

/// `offset + slope·t + Σ δⱼ·max(0, t − sⱼ)` on scaled time `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearTrend {
    pub offset: f64,
    pub slope: f64,
    /// Changepoint locations in scaled time, ascending.
    pub changepoints: Vec<f64>,
    /// Slope change at each changepoint.
    pub deltas: Vec<f64>,
}

impl PiecewiseLinearTrend {
    pub fn value(&self, t: f64) -> f64 {
        let hinge: f64 = self
            .changepoints
            .iter()
            .zip(&self.deltas)
            .map(|(s, d)| d * (t - s).max(0.0))
            .sum();
        self.offset + self.slope * t + hinge
    }

    /// Slope in effect after the last changepoint.
    pub fn final_slope(&self) -> f64 {
        self.slope + self.deltas.iter().sum::<f64>()
    }

    /// Mean absolute slope change, the scale of simulated future changes.
    pub fn mean_abs_delta(&self) -> f64 {
        if self.deltas.is_empty() {
            return 0.0;
        }
        self.deltas.iter().map(|d| d.abs()).sum::<f64>() / self.deltas.len() as f64
    }
}

/// Hinge design column `max(0, t − s)` for one changepoint.
pub(crate) fn hinge_column(times: &[f64], changepoint: f64) -> Vec<f64> {
    times.iter().map(|t| (t - changepoint).max(0.0)).collect()
}

/// Spread `n_changepoints` over the first `range` fraction of observed times.
///
/// Changepoints sit on observed times. Short histories get fewer changepoints
/// so that each segment keeps at least one observation.
pub(crate) fn place_changepoints(times: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let hist_size = (times.len() as f64 * range).floor() as usize;
    let n = n_changepoints.min(hist_size.saturating_sub(1));
    if n == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    let mut points: Vec<f64> = (1..=n)
        .map(|i| {
            let idx = (last * i as f64 / n as f64).round() as usize;
            times[idx.min(times.len() - 1)]
        })
        .collect();
    points.dedup();
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn value_bends_at_changepoints() {
        let trend = PiecewiseLinearTrend {
            offset: 1.0,
            slope: 2.0,
            changepoints: vec![0.5],
            deltas: vec![-2.0],
        };
        assert_relative_eq!(trend.value(0.0), 1.0);
        assert_relative_eq!(trend.value(0.5), 2.0);
        // Flat after the changepoint
        assert_relative_eq!(trend.value(1.0), 2.0);
        assert_relative_eq!(trend.final_slope(), 0.0);
        assert_relative_eq!(trend.mean_abs_delta(), 2.0);
    }

    #[test]
    fn changepoints_stay_inside_range() {
        let times: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let cps = place_changepoints(&times, 25, 0.8);
        assert_eq!(cps.len(), 25);
        assert!(cps.iter().all(|&c| c > 0.0 && c <= 0.8));
        assert!(cps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn short_history_gets_fewer_changepoints() {
        assert!(place_changepoints(&[0.0, 1.0], 25, 0.8).is_empty());
        assert_eq!(place_changepoints(&[0.0, 0.5, 1.0], 25, 0.8), vec![0.5]);

        let times: Vec<f64> = (0..10).map(|i| i as f64 / 9.0).collect();
        // floor(10 * 0.8) - 1 = 7
        assert_eq!(place_changepoints(&times, 25, 0.8).len(), 7);
        assert!(place_changepoints(&times, 0, 0.8).is_empty());
    }

    #[test]
    fn hinge_is_zero_before_changepoint() {
        let col = hinge_column(&[0.0, 0.25, 0.5, 1.0], 0.5);
        assert_eq!(col, vec![0.0, 0.0, 0.0, 0.5]);
    }
}
