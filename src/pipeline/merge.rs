//! Reconciliation of two canonical series into one.

use crate::core::{CanonicalPoint, CanonicalSeries};
use crate::error::{ForecastError, Result};
use std::cmp::Ordering;
use tracing::debug;

/// Merge two series into one ordered series without duplicate dates.
///
/// On dates present in both, the value from `preferred` is kept and the
/// other is discarded. Fails with [`ForecastError::EmptySeries`] only when
/// both inputs are empty.
pub fn merge(preferred: &CanonicalSeries, other: &CanonicalSeries) -> Result<CanonicalSeries> {
    if preferred.is_empty() && other.is_empty() {
        return Err(ForecastError::EmptySeries);
    }

    let (a, b) = (preferred.points(), other.points());
    let mut points: Vec<CanonicalPoint> = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    let mut overlap = 0usize;

    // Both inputs are sorted, so a two-way merge keeps the output sorted
    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            Ordering::Less => {
                points.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                points.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                points.push(a[i]);
                overlap += 1;
                i += 1;
                j += 1;
            }
        }
    }
    points.extend_from_slice(&a[i..]);
    points.extend_from_slice(&b[j..]);

    debug!(
        preferred = a.len(),
        other = b.len(),
        overlap,
        merged = points.len(),
        "merged series"
    );

    CanonicalSeries::new(points)
}

/// Number of dates present in both series.
pub fn overlap_count(a: &CanonicalSeries, b: &CanonicalSeries) -> usize {
    a.iter().filter(|p| b.get(p.date).is_some()).count()
}
