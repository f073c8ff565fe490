//! Forecasting models.

mod traits;

pub mod damped_trend;
pub mod log_transformed;

pub use damped_trend::{DampedTrend, Damping, ModelState};
pub use log_transformed::LogTransformed;
pub use traits::{BoxedForecaster, Forecaster};
