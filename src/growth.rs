//! Compound-growth ceiling for forecasts.
//!
//! A log-additive trend can still compound implausibly over a long horizon
//! when damping is mild. The ceiling caps each step at what the entity's own
//! historical compound annual growth rate would reach.

use crate::core::Forecast;
use crate::error::{ForecastError, Result};

/// Observations per year for monthly data.
pub const MONTHS_PER_YEAR: usize = 12;

/// Growth statistics of a history, used to build the ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapParameters {
    /// Compound annual growth rate over the history.
    pub cagr: f64,
    /// Last observed value, the ceiling's starting point.
    pub last_value: f64,
}

impl CapParameters {
    /// Derive the parameters from an original-scale history.
    ///
    /// `elapsed_years = len / periods_per_year`. CAGR is
    /// `(last / first)^(1 / elapsed_years) - 1` when the elapsed time is
    /// positive and the first value is positive, and `0` otherwise.
    pub fn from_history(history: &[f64], periods_per_year: usize) -> Result<Self> {
        let (first, last) = match (history.first(), history.last()) {
            (Some(&f), Some(&l)) => (f, l),
            _ => return Err(ForecastError::EmptyData),
        };
        if periods_per_year == 0 {
            return Err(ForecastError::InvalidParameter(
                "periods per year must be positive".to_string(),
            ));
        }

        let elapsed_years = history.len() as f64 / periods_per_year as f64;
        let cagr = if elapsed_years > 0.0 && first > 0.0 {
            (last / first).powf(1.0 / elapsed_years) - 1.0
        } else {
            0.0
        };
        if !cagr.is_finite() {
            return Err(ForecastError::ComputationError(format!(
                "growth rate is not finite (first={first}, last={last})"
            )));
        }

        Ok(Self {
            cagr,
            last_value: last,
        })
    }

    /// `last_value * (1 + cagr)^(h / periods_per_year)` for h = 1..=horizon.
    pub fn ceiling(&self, horizon: usize, periods_per_year: usize) -> Vec<f64> {
        let base = 1.0 + self.cagr;
        (1..=horizon)
            .map(|h| self.last_value * base.powf(h as f64 / periods_per_year as f64))
            .collect()
    }
}

/// Bounds forecasts by the history's compound growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthCapper {
    periods_per_year: usize,
}

impl GrowthCapper {
    pub fn new(periods_per_year: usize) -> Self {
        Self { periods_per_year }
    }

    /// Capper for monthly data.
    pub fn monthly() -> Self {
        Self::new(MONTHS_PER_YEAR)
    }

    pub fn parameters(&self, history: &[f64]) -> Result<CapParameters> {
        CapParameters::from_history(history, self.periods_per_year)
    }

    /// `min(raw[h], ceiling[h])` element-wise; the horizon is unchanged.
    pub fn cap(&self, history: &[f64], raw: Forecast) -> Result<Forecast> {
        let params = self.parameters(history)?;
        let ceiling = params.ceiling(raw.horizon(), self.periods_per_year);
        raw.bounded_above(&ceiling)
    }
}

impl Default for GrowthCapper {
    fn default() -> Self {
        Self::monthly()
    }
}
