//! Join history and forecasts into publishable structures.

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::core::{months_after, Forecast, SeriesTable, DATES_KEY};
use crate::error::{ForecastError, Result};
use crate::growth::CapParameters;
use crate::models::ModelState;
use crate::utils::{round_all, round_to};

/// Date format used in every published document.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The successful result for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityForecast {
    pub entity: String,
    /// Fitted smoothing state (log space when the log transform is on).
    pub state: Option<ModelState>,
    /// Ceiling parameters, when capping was applied.
    pub cap: Option<CapParameters>,
    /// Capped forecast on the original scale.
    pub forecast: Forecast,
}

/// Historical values followed by forecasts, per entity, under shared dates.
///
/// Serializes as `{ "dates": [...], "<entity>": [...], ... }` in table
/// column order. Historical gaps serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedOutput {
    dates: Vec<NaiveDate>,
    series: Vec<(String, Vec<Option<f64>>)>,
}

impl CombinedOutput {
    /// Build the combined mapping. Values are rounded here and nowhere
    /// earlier.
    pub fn assemble(
        table: &SeriesTable,
        forecasts: &[EntityForecast],
        horizon: usize,
        decimals: u32,
    ) -> Result<Self> {
        let last = table.last_date().ok_or(ForecastError::EmptyData)?;
        let mut dates = table.dates().to_vec();
        dates.extend(months_after(last, horizon)?);

        let mut series = Vec::with_capacity(forecasts.len());
        for entity in forecasts {
            let column = table.column(&entity.entity).ok_or_else(|| {
                ForecastError::InvalidParameter(format!("unknown entity '{}'", entity.entity))
            })?;
            if entity.forecast.horizon() != horizon {
                return Err(ForecastError::DimensionMismatch {
                    expected: horizon,
                    got: entity.forecast.horizon(),
                });
            }

            let mut values: Vec<Option<f64>> = column
                .values
                .iter()
                .map(|v| v.filter(|x| x.is_finite()).map(|x| round_to(x, decimals)))
                .collect();
            values.extend(
                round_all(entity.forecast.values(), decimals)
                    .into_iter()
                    .map(Some),
            );
            series.push((entity.entity.clone(), values));
        }

        Ok(Self { dates, series })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(name, _)| name.as_str())
    }

    pub fn series(&self, entity: &str) -> Option<&[Option<f64>]> {
        self.series
            .iter()
            .find(|(name, _)| name == entity)
            .map(|(_, values)| values.as_slice())
    }
}

impl Serialize for CombinedOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        let dates: Vec<String> = self
            .dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();
        map.serialize_entry(DATES_KEY, &dates)?;
        for (name, values) in &self.series {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}
