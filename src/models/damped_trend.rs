//! Damped additive-trend exponential smoothing.
//!
//! Holt's linear method with a damping factor on the trend. Without damping
//! the trend extrapolates linearly forever; with `phi < 1` its contribution
//! converges to `phi / (1 - phi) * b`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{months_after, Forecast, Series};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// Search range for the level and trend smoothing weights.
pub const SMOOTHING_BOUNDS: (f64, f64) = (0.0001, 0.9999);

/// Search range for an optimized damping factor.
pub const DAMPING_BOUNDS: (f64, f64) = (0.8, 1.0);

/// How the damping factor is chosen.
///
/// A run applies one policy to every entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "DampingRepr", into = "DampingRepr")]
pub enum Damping {
    /// Choose phi in [`DAMPING_BOUNDS`] jointly with alpha and beta.
    #[default]
    Optimized,
    /// Use this phi, which must lie in `(0, 1]`.
    Fixed(f64),
}

impl Damping {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Damping::Optimized => Ok(()),
            Damping::Fixed(phi) if phi > 0.0 && phi <= 1.0 => Ok(()),
            Damping::Fixed(phi) => Err(ForecastError::InvalidParameter(format!(
                "damping factor must be in (0, 1], got {phi}"
            ))),
        }
    }
}

impl fmt::Display for Damping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Damping::Optimized => write!(f, "optimized"),
            Damping::Fixed(phi) => write!(f, "{phi}"),
        }
    }
}

impl FromStr for Damping {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("optimized") || s.eq_ignore_ascii_case("auto") {
            return Ok(Damping::Optimized);
        }
        let phi: f64 = s.parse().map_err(|_| {
            ForecastError::InvalidParameter(format!(
                "damping must be 'optimized' or a number, got '{s}'"
            ))
        })?;
        let damping = Damping::Fixed(phi);
        damping.validate()?;
        Ok(damping)
    }
}

/// Config-file form: `"optimized"` or a bare number.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DampingRepr {
    Fixed(f64),
    Named(String),
}

impl TryFrom<DampingRepr> for Damping {
    type Error = String;

    fn try_from(repr: DampingRepr) -> std::result::Result<Self, Self::Error> {
        let damping = match repr {
            DampingRepr::Fixed(phi) => Damping::Fixed(phi),
            DampingRepr::Named(name) => name.parse::<Damping>().map_err(|e| e.to_string())?,
        };
        damping.validate().map_err(|e| e.to_string())?;
        Ok(damping)
    }
}

impl From<Damping> for DampingRepr {
    fn from(damping: Damping) -> Self {
        match damping {
            Damping::Optimized => DampingRepr::Named("optimized".to_string()),
            Damping::Fixed(phi) => DampingRepr::Fixed(phi),
        }
    }
}

/// Fitted parameters and final state of a damped-trend model.
///
/// Only meaningful for the series it was fitted on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelState {
    /// Level at the last observation.
    pub level: f64,
    /// Trend at the last observation.
    pub trend: f64,
    /// Damping factor phi.
    pub damping: f64,
    /// Level smoothing weight.
    pub alpha: f64,
    /// Trend smoothing weight.
    pub beta: f64,
    /// In-sample sum of squared one-step-ahead errors.
    pub sse: f64,
}

/// Damped additive-trend forecaster.
///
/// The model equations are:
/// - Forecast: `ŷ_{t+1} = l_t + φ b_t`
/// - Level: `l_t = α y_t + (1-α)(l_{t-1} + φ b_{t-1})`
/// - Trend: `b_t = β (l_t - l_{t-1}) + (1-β) φ b_{t-1}`
/// - h-step: `ŷ_{T+h} = l_T + (φ + φ² + ... + φ^h) b_T`
///
/// Alpha and beta (and phi under [`Damping::Optimized`]) minimize the
/// one-step-ahead SSE. The initial level is the first observation and the
/// initial trend the first difference.
#[derive(Debug, Clone)]
pub struct DampedTrend {
    damping: Damping,
    optimizer: NelderMeadConfig,
    state: Option<ModelState>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    last_date: Option<NaiveDate>,
}

impl DampedTrend {
    pub fn new(damping: Damping) -> Self {
        Self {
            damping,
            optimizer: NelderMeadConfig::default(),
            state: None,
            fitted: None,
            residuals: None,
            last_date: None,
        }
    }

    /// Damping chosen by the optimizer.
    pub fn optimized() -> Self {
        Self::new(Damping::Optimized)
    }

    /// Damping held at `phi`.
    pub fn fixed(phi: f64) -> Self {
        Self::new(Damping::Fixed(phi))
    }

    /// Override the optimizer settings.
    pub fn with_optimizer(mut self, config: NelderMeadConfig) -> Self {
        self.optimizer = config;
        self
    }

    /// `phi + phi^2 + ... + phi^h`.
    pub fn damped_sum(phi: f64, h: usize) -> f64 {
        if (phi - 1.0).abs() < 1e-10 {
            h as f64
        } else {
            phi * (1.0 - phi.powi(h as i32)) / (1.0 - phi)
        }
    }

    fn initial_state(values: &[f64]) -> (f64, f64) {
        (values[0], values[1] - values[0])
    }

    /// Run the recursions, calling `step(forecast, actual)` for every
    /// observation after the first. Returns the final (level, trend).
    fn smooth<F>(values: &[f64], alpha: f64, beta: f64, phi: f64, mut step: F) -> (f64, f64)
    where
        F: FnMut(f64, f64),
    {
        let (mut l, mut b) = Self::initial_state(values);
        for &y in &values[1..] {
            step(l + phi * b, y);
            let l_prev = l;
            l = alpha * y + (1.0 - alpha) * (l_prev + phi * b);
            b = beta * (l - l_prev) + (1.0 - beta) * phi * b;
        }
        (l, b)
    }

    fn sse(values: &[f64], alpha: f64, beta: f64, phi: f64) -> f64 {
        let mut sse = 0.0;
        Self::smooth(values, alpha, beta, phi, |forecast, y| {
            sse += (y - forecast).powi(2);
        });
        sse
    }

    /// Returns (alpha, beta, phi).
    fn optimize(&self, values: &[f64]) -> Result<(f64, f64, f64)> {
        let result = match self.damping {
            Damping::Optimized => nelder_mead(
                |p| Self::sse(values, p[0], p[1], p[2]),
                &[0.3, 0.1, 0.98],
                Some(&[SMOOTHING_BOUNDS, SMOOTHING_BOUNDS, DAMPING_BOUNDS]),
                self.optimizer.clone(),
            ),
            Damping::Fixed(phi) => nelder_mead(
                |p| Self::sse(values, p[0], p[1], phi),
                &[0.3, 0.1],
                Some(&[SMOOTHING_BOUNDS, SMOOTHING_BOUNDS]),
                self.optimizer.clone(),
            ),
        };

        if !result.converged || !result.optimal_value.is_finite() {
            return Err(ForecastError::ConvergenceFailure {
                iterations: result.iterations,
            });
        }

        let p = &result.optimal_point;
        let phi = match self.damping {
            Damping::Optimized => p[2].clamp(DAMPING_BOUNDS.0, DAMPING_BOUNDS.1),
            Damping::Fixed(phi) => phi,
        };
        Ok((
            p[0].clamp(SMOOTHING_BOUNDS.0, SMOOTHING_BOUNDS.1),
            p[1].clamp(SMOOTHING_BOUNDS.0, SMOOTHING_BOUNDS.1),
            phi,
        ))
    }
}

impl Default for DampedTrend {
    fn default() -> Self {
        Self::optimized()
    }
}

impl Forecaster for DampedTrend {
    fn fit(&mut self, series: &Series) -> Result<()> {
        self.damping.validate()?;

        let values = series.values();
        if values.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: values.len(),
            });
        }

        let (alpha, beta, phi) = self.optimize(values)?;

        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());
        fitted.push(values[0]);
        residuals.push(0.0);
        let (level, trend) = Self::smooth(values, alpha, beta, phi, |forecast, y| {
            fitted.push(forecast);
            residuals.push(y - forecast);
        });

        let sse = residuals.iter().map(|r| r * r).sum();
        if !level.is_finite() || !trend.is_finite() {
            return Err(ForecastError::ComputationError(
                "non-finite model state".to_string(),
            ));
        }

        let state = ModelState {
            level,
            trend,
            damping: phi,
            alpha,
            beta,
            sse,
        };
        debug!(?state, "fitted damped trend");

        self.state = Some(state);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.last_date = series.last_date();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.ok_or(ForecastError::FitRequired)?;
        let last = self.last_date.ok_or(ForecastError::FitRequired)?;

        let dates = months_after(last, horizon)?;
        let values = (1..=horizon)
            .map(|h| state.level + Self::damped_sum(state.damping, h) * state.trend)
            .collect();
        Forecast::from_parts(dates, values)
    }

    fn state(&self) -> Option<ModelState> {
        self.state
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        match self.damping {
            Damping::Optimized => "DampedTrend(optimized)",
            Damping::Fixed(_) => "DampedTrend(fixed)",
        }
    }
}
