//! Source adapters returning raw analytics records.
//!
//! Adapters sit at the edge of the pipeline: they know where records come
//! from and which field holds the date, but not how to interpret them.
//! Parsing happens in [`crate::pipeline::normalize`].

mod csv_file;

pub use csv_file::CsvSource;

use crate::error::{ForecastError, Result};
use crate::pipeline::normalize::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw row from an analytics backend: field name to string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: &str) {
        self.fields.insert(field.to_string(), value.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Keep only the named fields.
    fn project(&self, keep: &[&str]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| keep.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Inclusive date range; an open end is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self {
            start: Some(start),
            end: Some(end),
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ForecastError::InvalidParameter(format!(
                    "date range starts {} after it ends {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Whether a raw date string should be kept for this range.
    ///
    /// Unparseable dates are kept so the normalizer can count them.
    pub(crate) fn admits(&self, raw_date: Option<&str>) -> bool {
        match raw_date.and_then(parse_date) {
            Some(date) => self.contains(date),
            None => true,
        }
    }
}

/// A backend that can return daily records for a metric.
pub trait SourceAdapter {
    /// Source name used in diagnostics and errors.
    fn name(&self) -> &str;

    /// Field holding the date dimension in returned records.
    fn date_field(&self) -> &str;

    /// Fetch records carrying `date_field` and `metric_field` within `range`.
    ///
    /// Backend failures are reported as [`ForecastError::SourceFetch`].
    fn fetch(&self, metric_field: &str, range: &DateRange) -> Result<Vec<RawRecord>>;
}

/// Records held in memory, e.g. fetched by the caller beforehand.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    date_field: String,
    records: Vec<RawRecord>,
}

impl StaticSource {
    pub fn new(name: &str, date_field: &str, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.to_string(),
            date_field: date_field.to_string(),
            records,
        }
    }

    /// Build from `(date, value)` pairs under the given field names.
    pub fn from_pairs<'a, I>(name: &str, date_field: &str, metric_field: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let records = pairs
            .into_iter()
            .map(|(d, v)| RawRecord::new().with(date_field, d).with(metric_field, v))
            .collect();
        Self::new(name, date_field, records)
    }
}

impl SourceAdapter for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn date_field(&self) -> &str {
        &self.date_field
    }

    fn fetch(&self, metric_field: &str, range: &DateRange) -> Result<Vec<RawRecord>> {
        range.validate()?;
        if !self.records.is_empty() && !self.records.iter().any(|r| r.contains(metric_field)) {
            return Err(ForecastError::source_fetch(
                &self.name,
                format!("metric `{}` is not available", metric_field),
            ));
        }
        let keep = [self.date_field.as_str(), metric_field];
        Ok(self
            .records
            .iter()
            .filter(|r| range.admits(r.get(&self.date_field)))
            .map(|r| r.project(&keep))
            .collect())
    }
}
