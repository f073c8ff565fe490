//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Point predictions paired 1:1 with their future dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl Forecast {
    /// Create a forecast from dates and values of equal length.
    pub fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }
        Ok(Self { dates, values })
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Same dates, values replaced by `f` applied element-wise.
    pub fn map_values<F>(self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            values: self.values.into_iter().map(f).collect(),
            dates: self.dates,
        }
    }

    /// Element-wise minimum with `bound`, which must cover the horizon.
    pub fn bounded_above(self, bound: &[f64]) -> Result<Self> {
        if bound.len() != self.values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.values.len(),
                got: bound.len(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(bound)
            .map(|(&v, &b)| v.min(b))
            .collect();
        Ok(Self {
            dates: self.dates,
            values,
        })
    }

    /// Drop the first `steps` predictions together with their dates.
    pub fn skip_steps(mut self, steps: usize) -> Self {
        let steps = steps.min(self.values.len());
        self.dates.drain(..steps);
        self.values.drain(..steps);
        self
    }
}
