//! Additive decomposition model: piecewise-linear trend plus Fourier seasonality.
//!
//! The model is fitted in one batch on the full history. Time is rescaled to
//! `[0, 1]` over the observed range and values are divided by their absolute
//! maximum, so prior scales are comparable across metrics.

mod config;
mod model;
mod seasonality;
mod trend;

pub use config::{AdditiveConfig, CustomSeasonality, SeasonalityMode};
pub use model::{AdditiveModel, FittedAdditiveModel, MAX_HORIZON_DAYS};
pub use seasonality::{epoch_day, SeasonalComponent};
pub use trend::PiecewiseLinearTrend;
