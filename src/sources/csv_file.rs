//! Source adapter reading a CSV export of an analytics report.

use super::{DateRange, RawRecord, SourceAdapter};
use crate::error::{ForecastError, Result};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A report exported to CSV with a header row naming the fields.
///
/// Each call to `fetch` re-reads the file, so the adapter holds no data.
#[derive(Debug, Clone)]
pub struct CsvSource {
    name: String,
    path: PathBuf,
    date_field: String,
}

impl CsvSource {
    pub fn new(name: &str, path: impl AsRef<Path>, date_field: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.as_ref().to_path_buf(),
            date_field: date_field.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read records from any reader holding CSV text.
    pub fn read_records<R: Read>(
        &self,
        reader: R,
        metric_field: &str,
        range: &DateRange,
    ) -> Result<Vec<RawRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| ForecastError::source_fetch(&self.name, e.to_string()))?
            .clone();
        let column = |field: &str| {
            headers.iter().position(|h| h == field).ok_or_else(|| {
                ForecastError::source_fetch(&self.name, format!("no `{}` column", field))
            })
        };
        let date_idx = column(&self.date_field)?;
        let metric_idx = column(metric_field)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| ForecastError::source_fetch(&self.name, e.to_string()))?;
            let mut record = RawRecord::new();
            // Short rows keep the missing field absent so the normalizer counts them
            if let Some(date) = row.get(date_idx) {
                record.insert(&self.date_field, date);
            }
            if let Some(value) = row.get(metric_idx) {
                record.insert(metric_field, value);
            }
            if range.admits(record.get(&self.date_field)) {
                records.push(record);
            }
        }

        debug!(source = %self.name, records = records.len(), "read csv records");
        Ok(records)
    }
}

impl SourceAdapter for CsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn date_field(&self) -> &str {
        &self.date_field
    }

    fn fetch(&self, metric_field: &str, range: &DateRange) -> Result<Vec<RawRecord>> {
        range.validate()?;
        let file = File::open(&self.path).map_err(|e| {
            ForecastError::source_fetch(&self.name, format!("{}: {}", self.path.display(), e))
        })?;
        self.read_records(file, metric_field, range)
    }
}
