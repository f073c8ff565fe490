//! Fit any forecaster in log space and report results on the original scale.

use crate::core::{Forecast, Series};
use crate::error::{ForecastError, Result};
use crate::models::{Forecaster, ModelState};
use crate::transform::{inv_log_transform, log_transform};

/// Wraps a model so it sees `ln(y)` and callers see `exp(ŷ)`.
///
/// Requires every observation to be strictly positive. The inner model's
/// state stays in log space; fitted values and residuals are on the
/// original scale.
#[derive(Debug, Clone)]
pub struct LogTransformed<M> {
    inner: M,
    name: String,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl<M: Forecaster> LogTransformed<M> {
    pub fn new(inner: M) -> Self {
        let name = format!("Log({})", inner.name());
        Self {
            inner,
            name,
            fitted: None,
            residuals: None,
        }
    }
}

impl<M: Forecaster> Forecaster for LogTransformed<M> {
    fn fit(&mut self, series: &Series) -> Result<()> {
        let logged = log_transform(series.values())?;
        let log_series = Series::new(series.dates().to_vec(), logged)?;
        self.inner.fit(&log_series)?;

        let fitted = self
            .inner
            .fitted_values()
            .map(inv_log_transform)
            .ok_or(ForecastError::FitRequired)?;
        let residuals = series
            .values()
            .iter()
            .zip(&fitted)
            .map(|(y, f)| y - f)
            .collect();

        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        Ok(self.inner.predict(horizon)?.map_values(f64::exp))
    }

    fn state(&self) -> Option<ModelState> {
        self.inner.state()
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
