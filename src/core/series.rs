//! Canonical daily series shared by every pipeline stage.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// One observation of the metric on a calendar day.
///
/// A non-finite `value` marks a missing observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl CanonicalPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// Whether the value can be used for fitting.
    pub fn is_observed(&self) -> bool {
        self.value.is_finite()
    }
}

/// A daily series, strictly increasing by date with no duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalSeries {
    points: Vec<CanonicalPoint>,
}

impl CanonicalSeries {
    /// Create a series from points already in ascending date order.
    pub fn new(points: Vec<CanonicalPoint>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::InvalidParameter(format!(
                    "dates must be strictly increasing, found {} after {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        Ok(Self { points })
    }

    /// Create a series from points in any order. Duplicate dates are rejected.
    pub fn from_unsorted(mut points: Vec<CanonicalPoint>) -> Result<Self> {
        points.sort_by_key(|p| p.date);
        Self::new(points)
    }

    /// Create a series from `(date, value)` pairs in any order.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::from_unsorted(
            pairs
                .into_iter()
                .map(|(date, value)| CanonicalPoint::new(date, value))
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CanonicalPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalPoint> {
        self.points.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Value recorded on `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Number of points with a usable (finite) value.
    pub fn observed_len(&self) -> usize {
        self.points.iter().filter(|p| p.is_observed()).count()
    }

    /// Consume the series, returning its points.
    pub fn into_points(self) -> Vec<CanonicalPoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a CanonicalSeries {
    type Item = &'a CanonicalPoint;
    type IntoIter = std::slice::Iter<'a, CanonicalPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
