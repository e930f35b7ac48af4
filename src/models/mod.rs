//! Forecasting engines.

mod traits;

pub mod additive;

pub use additive::{
    AdditiveConfig, AdditiveModel, FittedAdditiveModel, SeasonalityMode, MAX_HORIZON_DAYS,
};
pub use traits::{BoxedEngine, ForecastEngine};
