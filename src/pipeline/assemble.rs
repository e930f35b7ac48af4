//! Presentation table joining actuals with forecast rows.

use crate::core::{CanonicalSeries, ForecastRow};
use crate::error::{ForecastError, Result};
use crate::utils::stats::round_to;
use serde::{Deserialize, Serialize};

/// Date layout of [`ResultRow::date`].
pub const DATE_FORMAT: &str = "%Y/%m/%d";

const DECIMALS: u32 = 2;

/// One presentation row. Numbers are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// `YYYY/MM/DD`.
    pub date: String,
    /// Observed value, absent for future days and gaps in history.
    pub actual: Option<f64>,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Final output of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub metric_label: String,
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that carry an observed value.
    pub fn historical_rows(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter().filter(|r| r.actual.is_some())
    }
}

/// Column names of a result table for `metric_label`.
pub fn column_names(metric_label: &str) -> Vec<String> {
    vec![
        "Date".to_string(),
        format!("Real {}", metric_label),
        format!("Predicted {}", metric_label),
        "Lower Bound".to_string(),
        "Upper Bound".to_string(),
    ]
}

/// Join historical actuals onto forecast rows.
///
/// There is one output row per forecast row. Actuals outside the forecast's
/// date range are dropped.
pub fn assemble(
    actuals: &CanonicalSeries,
    forecast: &[ForecastRow],
    metric_label: &str,
) -> Result<ResultTable> {
    if let Some(pair) = forecast.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(ForecastError::InvalidParameter(format!(
            "forecast rows must be strictly increasing, found {} after {}",
            pair[1].date, pair[0].date
        )));
    }

    let rows = forecast
        .iter()
        .map(|row| ResultRow {
            date: row.date.format(DATE_FORMAT).to_string(),
            actual: actuals
                .get(row.date)
                .filter(|v| v.is_finite())
                .map(|v| round_to(v, DECIMALS)),
            predicted: round_to(row.predicted, DECIMALS),
            lower_bound: round_to(row.lower_bound, DECIMALS),
            upper_bound: round_to(row.upper_bound, DECIMALS),
        })
        .collect();

    Ok(ResultTable {
        metric_label: metric_label.to_string(),
        columns: column_names(metric_label),
        rows,
    })
}
