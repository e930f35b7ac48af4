//! Fourier-series seasonal components.

use super::config::{AdditiveConfig, SeasonalityMode};
use chrono::NaiveDate;
use std::f64::consts::PI;

/// A periodic component modelled as a truncated Fourier series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalComponent {
    pub name: String,
    pub period: f64,
    pub order: usize,
}

impl SeasonalComponent {
    /// Order is capped at the Nyquist limit for daily sampling.
    pub fn new(name: impl Into<String>, period: f64, order: usize) -> Self {
        let nyquist = ((period / 2.0).floor() as usize).max(1);
        Self {
            name: name.into(),
            period,
            order: order.clamp(1, nyquist),
        }
    }

    pub fn weekly() -> Self {
        Self::new("weekly", 7.0, 3)
    }

    pub fn yearly() -> Self {
        Self::new("yearly", 365.25, 10)
    }

    /// Number of design columns (a cosine and a sine per order).
    pub fn n_features(&self) -> usize {
        2 * self.order
    }

    /// Feature values for an absolute day number.
    pub fn features(&self, day: f64) -> impl Iterator<Item = f64> + '_ {
        (1..=self.order).flat_map(move |k| {
            let x = 2.0 * PI * k as f64 * day / self.period;
            [x.cos(), x.sin()]
        })
    }

    /// Evaluate the component with fitted coefficients at an absolute day.
    pub fn evaluate(&self, coefficients: &[f64], day: f64) -> f64 {
        self.features(day)
            .zip(coefficients)
            .map(|(f, c)| f * c)
            .sum()
    }

    /// Append this component's design columns for the given days.
    pub(crate) fn push_columns(&self, days: &[f64], columns: &mut Vec<Vec<f64>>) {
        let start = columns.len();
        columns.extend((0..self.n_features()).map(|_| Vec::with_capacity(days.len())));
        for &day in days {
            for (j, f) in self.features(day).enumerate() {
                columns[start + j].push(f);
            }
        }
    }
}

/// Days since 1970-01-01, so seasonal phase is independent of the history start.
pub fn epoch_day(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

/// Resolve which components to fit given the history extent.
///
/// Auto components need two full periods of history and enough observations
/// to identify their coefficients.
pub(crate) fn resolve_components(
    config: &AdditiveConfig,
    span_days: f64,
    observed: usize,
) -> Vec<SeasonalComponent> {
    let identifiable = |c: &SeasonalComponent| {
        span_days >= 2.0 * c.period && observed >= 2 * c.n_features()
    };

    let mut components = Vec::new();
    for (mode, component) in [
        (config.weekly, SeasonalComponent::weekly()),
        (config.yearly, SeasonalComponent::yearly()),
    ] {
        let enabled = match mode {
            SeasonalityMode::Enabled => true,
            SeasonalityMode::Disabled => false,
            SeasonalityMode::Auto => identifiable(&component),
        };
        if enabled {
            components.push(component);
        }
    }
    components.extend(
        config
            .extra_seasonalities
            .iter()
            .map(|s| SeasonalComponent::new(s.name.clone(), s.period_days, s.fourier_order)),
    );
    components
}
