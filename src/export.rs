//! CSV and chart-JSON renderings of a [`ResultTable`].

use crate::error::{ForecastError, Result};
use crate::pipeline::{ResultRow, ResultTable};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

fn format_number(value: f64) -> String {
    format!("{:.2}", value)
}

fn csv_error(e: impl std::fmt::Display) -> ForecastError {
    ForecastError::ComputationError(format!("csv export: {}", e))
}

/// Write the table as CSV with its column names as header.
///
/// Absent actuals are written as empty cells.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.columns).map_err(csv_error)?;
    for row in &table.rows {
        out.write_record([
            row.date.clone(),
            row.actual.map(format_number).unwrap_or_default(),
            format_number(row.predicted),
            format_number(row.lower_bound),
            format_number(row.upper_bound),
        ])
        .map_err(csv_error)?;
    }
    out.flush().map_err(csv_error)?;
    Ok(())
}

/// CSV text of the table.
pub fn to_csv_string(table: &ResultTable) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).map_err(csv_error)
}

/// Data behind the forecast chart and its companion table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    /// One object per row keyed by column name.
    pub table_data: Vec<Map<String, Value>>,
    pub dates: Vec<String>,
    pub real_values: Vec<Option<f64>>,
    pub predicted_values: Vec<f64>,
    pub upper_bound: Vec<f64>,
    pub lower_bound: Vec<f64>,
}

impl ChartPayload {
    pub fn from_table(table: &ResultTable) -> Self {
        let rows = &table.rows;
        Self {
            table_data: rows.iter().map(|r| row_object(&table.columns, r)).collect(),
            dates: rows.iter().map(|r| r.date.clone()).collect(),
            real_values: rows.iter().map(|r| r.actual).collect(),
            predicted_values: rows.iter().map(|r| r.predicted).collect(),
            upper_bound: rows.iter().map(|r| r.upper_bound).collect(),
            lower_bound: rows.iter().map(|r| r.lower_bound).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ForecastError::ComputationError(format!("chart export: {}", e)))
    }
}

fn row_object(columns: &[String], row: &ResultRow) -> Map<String, Value> {
    let values = [
        Value::from(row.date.clone()),
        row.actual.map_or(Value::Null, Value::from),
        Value::from(row.predicted),
        Value::from(row.lower_bound),
        Value::from(row.upper_bound),
    ];
    columns.iter().cloned().zip(values).collect()
}
