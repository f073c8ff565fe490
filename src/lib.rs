//! # price-outlook
//!
//! Extends monthly price series into the future and derives their
//! percentage changes.
//!
//! Each entity (a column of the input table) is fitted with a damped
//! additive-trend exponential smoothing model in log space, projected over
//! the horizon, and capped by its own historical compound annual growth
//! rate. Month-over-month and year-over-year percent changes are computed
//! from the history. Entities are processed in parallel and fail
//! independently.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod features;
pub mod growth;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, InputError, Result};

pub mod prelude {
    pub use crate::core::{Column, Forecast, Series, SeriesTable};
    pub use crate::error::{ForecastError, InputError, Result};
    pub use crate::growth::{CapParameters, GrowthCapper};
    pub use crate::models::{DampedTrend, Damping, Forecaster, LogTransformed};
    pub use crate::pipeline::{run, PipelineConfig, RunOutput};
}
