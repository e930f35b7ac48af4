//! Conversion of raw source records into a canonical daily series.

use crate::core::{CanonicalPoint, CanonicalSeries};
use crate::error::{ForecastError, Result};
use crate::sources::RawRecord;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Field names under which one source reports the date and the metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    /// Source name used in diagnostics.
    pub name: String,
    pub date_field: String,
    pub metric_field: String,
}

impl SourceSchema {
    pub fn new(name: &str, date_field: &str, metric_field: &str) -> Self {
        Self {
            name: name.to_string(),
            date_field: date_field.to_string(),
            metric_field: metric_field.to_string(),
        }
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub series: CanonicalSeries,
    /// Records skipped because their date or value could not be parsed.
    pub skipped: usize,
    /// Records folded into an earlier record with the same date.
    pub duplicates_combined: usize,
}

/// Parse a calendar date in any of the layouts analytics exports use.
///
/// Accepts `YYYYMMDD`, `YYYY-MM-DD`, `YYYY/MM/DD` and `YYYY-MM-DD HH:MM:SS`;
/// any time of day is discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    const DATE_FORMATS: [&str; 3] = ["%Y%m%d", "%Y-%m-%d", "%Y/%m/%d"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}

/// Parse a metric value, possibly string-encoded.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse one record into a point.
pub fn parse_record(
    index: usize,
    record: &RawRecord,
    schema: &SourceSchema,
) -> Result<CanonicalPoint> {
    let malformed = |reason: String| ForecastError::MalformedRecord { index, reason };

    let raw_date = record
        .get(&schema.date_field)
        .ok_or_else(|| malformed(format!("missing field `{}`", schema.date_field)))?;
    let date = parse_date(raw_date)
        .ok_or_else(|| malformed(format!("unparseable date `{}`", raw_date)))?;

    let raw_value = record
        .get(&schema.metric_field)
        .ok_or_else(|| malformed(format!("missing field `{}`", schema.metric_field)))?;
    let value = parse_value(raw_value)
        .ok_or_else(|| malformed(format!("value `{}` is not numeric", raw_value)))?;

    Ok(CanonicalPoint::new(date, value))
}

/// Normalize the records of one source into a sorted canonical series.
///
/// Malformed records are skipped and counted. Records sharing a date are
/// summed. Fails only when every record of a non-empty batch is malformed.
pub fn normalize(records: &[RawRecord], schema: &SourceSchema) -> Result<Normalized> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut skipped = 0;
    let mut first_failure: Option<String> = None;

    for (index, record) in records.iter().enumerate() {
        match parse_record(index, record, schema) {
            Ok(point) => *by_date.entry(point.date).or_insert(0.0) += point.value,
            Err(err) => {
                debug!(source = %schema.name, %err, "skipping record");
                if first_failure.is_none() {
                    first_failure = Some(err.to_string());
                }
                skipped += 1;
            }
        }
    }

    let parsed = records.len() - skipped;
    let duplicates_combined = parsed - by_date.len();

    if !records.is_empty() && parsed == 0 {
        return Err(ForecastError::MalformedRecords {
            total: records.len(),
            reason: first_failure.unwrap_or_default(),
        });
    }
    if skipped > 0 {
        warn!(source = %schema.name, skipped, total = records.len(), "skipped malformed records");
    }

    let series = CanonicalSeries::new(
        by_date
            .into_iter()
            .map(|(date, value)| CanonicalPoint::new(date, value))
            .collect(),
    )?;

    Ok(Normalized {
        series,
        skipped,
        duplicates_combined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SourceSchema {
        SourceSchema::new("ga4", "date", "totalRevenue")
    }

    fn record(date: &str, value: &str) -> RawRecord {
        RawRecord::new().with("date", date).with("totalRevenue", value)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_accepts_common_layouts() {
        assert_eq!(parse_date("20240131"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_date("2024-01-31"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_date("2024/01/31"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_date(" 2024-01-31 13:45:00 "), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_date("2024-01-31T08:00:00"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_date("31/01/2024"), None);
        assert_eq!(parse_date("20240231"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parse_value_rejects_non_numeric() {
        assert_eq!(parse_value("12.50"), Some(12.5));
        assert_eq!(parse_value(" 0 "), Some(0.0));
        assert_eq!(parse_value("-3"), Some(-3.0));
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("1,000"), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn records_are_sorted_by_date() {
        let records = vec![
            record("20240103", "30"),
            record("20240101", "10"),
            record("20240102", "20"),
        ];
        let out = normalize(&records, &schema()).unwrap();
        assert_eq!(
            out.series.dates(),
            vec![ymd(2024, 1, 1), ymd(2024, 1, 2), ymd(2024, 1, 3)]
        );
        assert_eq!(out.series.values(), vec![10.0, 20.0, 30.0]);
        assert_eq!(out.skipped, 0);
        assert_eq!(out.duplicates_combined, 0);
    }

    #[test]
    fn malformed_records_are_skipped_and_counted() {
        let records = vec![
            record("20240101", "10"),
            record("20240102", "n/a"),
            record("not-a-date", "5"),
            RawRecord::new().with("date", "20240104"),
            record("20240105", "50"),
        ];
        let out = normalize(&records, &schema()).unwrap();
        assert_eq!(out.skipped, 3);
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.series.get(ymd(2024, 1, 5)), Some(50.0));
    }

    #[test]
    fn all_malformed_is_fatal() {
        let records = vec![record("20240101", "x"), record("20240102", "y")];
        match normalize(&records, &schema()) {
            Err(ForecastError::MalformedRecords { total, reason }) => {
                assert_eq!(total, 2);
                assert!(reason.contains("record 0"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let out = normalize(&[], &schema()).unwrap();
        assert!(out.series.is_empty());
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn same_day_records_are_summed() {
        let records = vec![
            record("20240101", "10"),
            record("2024-01-01", "5.5"),
            record("20240102", "1"),
        ];
        let out = normalize(&records, &schema()).unwrap();
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.series.get(ymd(2024, 1, 1)), Some(15.5));
        assert_eq!(out.duplicates_combined, 1);
    }

    #[test]
    fn parse_record_reports_index_and_reason() {
        let err = parse_record(7, &record("20240101", "abc"), &schema()).unwrap_err();
        assert_eq!(
            err,
            ForecastError::MalformedRecord {
                index: 7,
                reason: "value `abc` is not numeric".to_string()
            }
        );
    }
}
