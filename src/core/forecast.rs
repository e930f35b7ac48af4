//! Forecast rows produced by a forecast engine.

use chrono::NaiveDate;

/// Point prediction and interval for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastRow {
    /// Build a row with a symmetric interval of `half_width` around `predicted`.
    pub fn symmetric(date: NaiveDate, predicted: f64, half_width: f64) -> Self {
        let half_width = half_width.abs();
        Self {
            date,
            predicted,
            lower_bound: predicted - half_width,
            upper_bound: predicted + half_width,
        }
    }

    /// Interval width (`upper_bound - lower_bound`).
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Whether `lower_bound <= predicted <= upper_bound`.
    pub fn is_ordered(&self) -> bool {
        self.lower_bound <= self.predicted && self.predicted <= self.upper_bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_rows_are_ordered() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let row = ForecastRow::symmetric(date, 100.0, 12.5);
        assert_eq!(row.lower_bound, 87.5);
        assert_eq!(row.upper_bound, 112.5);
        assert_eq!(row.width(), 25.0);
        assert!(row.is_ordered());

        // Negative widths are folded
        let row = ForecastRow::symmetric(date, 10.0, -2.0);
        assert!(row.is_ordered());
        assert_eq!(row.width(), 4.0);
    }
}
