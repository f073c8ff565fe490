//! Run configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::models::{BoxedForecaster, DampedTrend, Damping, LogTransformed};
use crate::utils::NelderMeadConfig;

/// Forecast horizon used by the monthly price update.
pub const DEFAULT_HORIZON: usize = 60;

/// Settings shared by every entity in a run.
///
/// The earlier variants of the price update (plain Holt, no log transform,
/// no cap) are all expressible by switching these off.
///
/// # Example
///
/// ```
/// use price_outlook::models::Damping;
/// use price_outlook::pipeline::PipelineConfig;
///
/// let config = PipelineConfig {
///     damping: Damping::Fixed(0.9),
///     apply_growth_cap: false,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.horizon, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Months to forecast past the last historical date.
    pub horizon: usize,
    /// Fit the model on `ln(y)`.
    pub use_log_transform: bool,
    /// Damping policy for every entity.
    pub damping: Damping,
    /// Bound forecasts by the historical compound annual growth rate.
    pub apply_growth_cap: bool,
    /// Decimal places kept in the published values.
    pub decimals: u32,
    /// Iteration budget of the parameter search; an entity whose search
    /// does not converge within it fails.
    pub max_iterations: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            use_log_transform: true,
            damping: Damping::Optimized,
            apply_growth_cap: true,
            decimals: 2,
            max_iterations: NelderMeadConfig::default().max_iter,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, InputError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.horizon == 0 {
            return Err(InputError::InvalidHorizon(self.horizon));
        }
        self.damping
            .validate()
            .map_err(|e| InputError::InvalidConfig(e.to_string()))?;
        if self.decimals > 12 {
            return Err(InputError::InvalidConfig(format!(
                "at most 12 decimals are supported, got {}",
                self.decimals
            )));
        }
        if self.max_iterations == 0 {
            return Err(InputError::InvalidConfig(
                "max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// A fresh, unfitted model for one entity.
    pub fn build_model(&self) -> BoxedForecaster {
        let model = DampedTrend::new(self.damping).with_optimizer(NelderMeadConfig {
            max_iter: self.max_iterations,
            ..Default::default()
        });
        if self.use_log_transform {
            Box::new(LogTransformed::new(model))
        } else {
            Box::new(model)
        }
    }
}
