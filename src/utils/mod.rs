//! Numerical utilities shared by the model and the assembler.

pub mod metrics;
pub mod ols;
pub mod stats;

pub use metrics::{calculate_metrics, AccuracyMetrics};
pub use ols::{penalized_least_squares, LeastSquaresFit};
pub use stats::{round_to, z_for_coverage};
