//! Core data structures shared by the pipeline stages.

mod forecast;
mod series;

pub use forecast::ForecastRow;
pub use series::{CanonicalPoint, CanonicalSeries};
