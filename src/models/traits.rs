//! Forecaster trait defining the common interface for all models.

use crate::core::{Forecast, Series};
use crate::error::Result;
use crate::models::ModelState;

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the series.
    fn fit(&mut self, series: &Series) -> Result<()>;

    /// Generate `horizon` monthly predictions after the last fitted date.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Fitted smoothing state, if the model has one.
    fn state(&self) -> Option<ModelState>;

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Boxed forecaster that can be moved onto a worker thread.
pub type BoxedForecaster = Box<dyn Forecaster + Send>;
