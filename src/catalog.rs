//! Mapping between metric display names and per-source field names.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Label used when a field has no catalog entry.
pub const FALLBACK_DISPLAY_NAME: &str = "Metric";

/// One metric as named by the user and by each source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub display_name: String,
    /// Field in the primary (current) source.
    pub primary_field: String,
    /// Field in the legacy source.
    pub legacy_field: String,
}

impl MetricEntry {
    pub fn new(display_name: &str, primary_field: &str, legacy_field: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            primary_field: primary_field.to_string(),
            legacy_field: legacy_field.to_string(),
        }
    }
}

/// Metrics the pipeline can be asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCatalog {
    entries: Vec<MetricEntry>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self {
            entries: vec![
                MetricEntry::new("Revenue", "totalRevenue", "ga:transactionRevenue"),
                MetricEntry::new("Sessions", "sessions", "ga:sessions"),
                MetricEntry::new("Conversions", "ecommercePurchases", "ga:transactions"),
            ],
        }
    }
}

impl MetricCatalog {
    pub fn new(entries: Vec<MetricEntry>) -> Self {
        Self { entries }
    }

    /// Add an entry, replacing any entry with the same display name.
    pub fn insert(&mut self, entry: MetricEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.display_name.eq_ignore_ascii_case(&entry.display_name))
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Look up a metric by display name (case-insensitive).
    pub fn lookup(&self, display_name: &str) -> Result<&MetricEntry> {
        self.entries
            .iter()
            .find(|e| e.display_name.eq_ignore_ascii_case(display_name.trim()))
            .ok_or_else(|| ForecastError::UnknownMetric(display_name.to_string()))
    }

    /// Display name for a source field, `"Metric"` when unknown.
    pub fn display_name_for(&self, field: &str) -> &str {
        self.entries
            .iter()
            .find(|e| e.primary_field == field)
            .or_else(|| self.entries.iter().find(|e| e.legacy_field == field))
            .map(|e| e.display_name.as_str())
            .unwrap_or(FALLBACK_DISPLAY_NAME)
    }

    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.display_name.as_str())
    }

    pub fn entries(&self) -> &[MetricEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_metrics_map_to_both_sources() {
        let catalog = MetricCatalog::default();
        let revenue = catalog.lookup("Revenue").unwrap();
        assert_eq!(revenue.primary_field, "totalRevenue");
        assert_eq!(revenue.legacy_field, "ga:transactionRevenue");

        let sessions = catalog.lookup("sessions").unwrap();
        assert_eq!(sessions.legacy_field, "ga:sessions");

        assert_eq!(
            catalog.display_names().collect::<Vec<_>>(),
            vec!["Revenue", "Sessions", "Conversions"]
        );
    }

    #[test]
    fn unknown_metric_is_an_error() {
        let catalog = MetricCatalog::default();
        assert_eq!(
            catalog.lookup("Bounce Rate").unwrap_err(),
            ForecastError::UnknownMetric("Bounce Rate".to_string())
        );
    }

    #[test]
    fn reverse_lookup_checks_both_sources() {
        let catalog = MetricCatalog::default();
        assert_eq!(catalog.display_name_for("ecommercePurchases"), "Conversions");
        assert_eq!(catalog.display_name_for("ga:transactionRevenue"), "Revenue");
        assert_eq!(catalog.display_name_for("screenPageViews"), "Metric");
    }

    #[test]
    fn insert_replaces_by_display_name() {
        let mut catalog = MetricCatalog::default();
        catalog.insert(MetricEntry::new("revenue", "purchaseRevenue", "ga:transactionRevenue"));
        catalog.insert(MetricEntry::new("Users", "totalUsers", "ga:users"));
        assert_eq!(catalog.entries().len(), 4);
        assert_eq!(catalog.lookup("Revenue").unwrap().primary_field, "purchaseRevenue");
        assert_eq!(catalog.lookup("users").unwrap().legacy_field, "ga:users");
    }
}
