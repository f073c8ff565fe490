//! What a run did not produce, and why.

use std::fmt;

use chrono::NaiveDate;

use crate::error::ForecastError;

/// An entity left out of the combined output.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFailure {
    pub entity: String,
    pub error: ForecastError,
}

/// A percent-change point skipped because its base value was zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPoint {
    pub entity: String,
    pub date: NaiveDate,
    /// 1 for month-over-month, 12 for year-over-year.
    pub period: usize,
}

/// Per-run summary of recovered errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Entities present in the combined output, in table order.
    pub forecast_entities: Vec<String>,
    pub failures: Vec<EntityFailure>,
    pub skipped_points: Vec<SkippedPoint>,
}

impl RunReport {
    /// No entity failed and no point was skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped_points.is_empty()
    }

    pub fn failed_entities(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.entity.as_str())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entities forecast, {} skipped, {} percent-change points skipped",
            self.forecast_entities.len(),
            self.failures.len(),
            self.skipped_points.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  skipped {}: {}", failure.entity, failure.error)?;
        }
        Ok(())
    }
}
