//! End-to-end run: forecast every entity, cap, derive percent changes.
//!
//! A run is pure computation over an in-memory [`SeriesTable`]; reading the
//! table and publishing the outputs happen outside of it (see [`crate::io`]).
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use price_outlook::core::{month_sequence, Column, SeriesTable};
//! use price_outlook::pipeline::{run, PipelineConfig};
//!
//! let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let values: Vec<Option<f64>> = (0..36).map(|i| Some(100.0 + i as f64)).collect();
//! let table = SeriesTable::new(
//!     month_sequence(start, 36).unwrap(),
//!     vec![Column { name: "Madrid".to_string(), values }],
//! )
//! .unwrap();
//!
//! let config = PipelineConfig { horizon: 12, ..Default::default() };
//! let output = run(&table, &config).unwrap();
//! assert_eq!(output.combined.series("Madrid").unwrap().len(), 48);
//! assert_eq!(output.year_over_year.len(), 24);
//! ```

pub mod assemble;
pub mod changes;
pub mod config;
pub mod report;

pub use assemble::{CombinedOutput, EntityForecast, DATE_FORMAT};
pub use changes::{ChangeRecord, ChangeTable};
pub use config::{PipelineConfig, DEFAULT_HORIZON};
pub use report::{EntityFailure, RunReport, SkippedPoint};

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::core::{column_to_series, months_after, months_between, Column, SeriesTable};
use crate::error::{ForecastError, InputError, Result};
use crate::features::{MONTH_OVER_MONTH, YEAR_OVER_YEAR};
use crate::growth::GrowthCapper;

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub combined: CombinedOutput,
    pub year_over_year: ChangeTable,
    pub month_over_month: ChangeTable,
    /// Per-entity results, in table order, for the entities that succeeded.
    pub forecasts: Vec<EntityForecast>,
    pub report: RunReport,
}

/// Run the full computation.
///
/// Fails only on fatal input problems (empty table, misaligned columns,
/// invalid configuration). Entities that cannot be modeled are recorded in
/// [`RunReport::failures`] and left out of the combined output.
pub fn run(table: &SeriesTable, config: &PipelineConfig) -> std::result::Result<RunOutput, InputError> {
    config.validate()?;
    table.validate()?;

    info!(
        entities = table.columns().len(),
        dates = table.len(),
        horizon = config.horizon,
        damping = %config.damping,
        log_transform = config.use_log_transform,
        growth_cap = config.apply_growth_cap,
        "starting forecast run"
    );

    let results: Vec<(&str, Result<EntityForecast>)> = table
        .columns()
        .par_iter()
        .map(|column| {
            (
                column.name.as_str(),
                forecast_entity(table.dates(), column, config),
            )
        })
        .collect();

    let mut report = RunReport::default();
    let mut forecasts = Vec::with_capacity(results.len());
    for (entity, result) in results {
        match result {
            Ok(forecast) => {
                report.forecast_entities.push(entity.to_string());
                forecasts.push(forecast);
            }
            Err(error) => {
                warn!(entity, %error, "entity skipped");
                report.failures.push(EntityFailure {
                    entity: entity.to_string(),
                    error,
                });
            }
        }
    }

    let combined =
        CombinedOutput::assemble(table, &forecasts, config.horizon, config.decimals)?;
    let (year_over_year, yoy_skipped) =
        ChangeTable::compute(table, YEAR_OVER_YEAR, config.decimals)?;
    let (month_over_month, mom_skipped) =
        ChangeTable::compute(table, MONTH_OVER_MONTH, config.decimals)?;

    for point in yoy_skipped.iter().chain(&mom_skipped) {
        warn!(
            entity = %point.entity,
            date = %point.date,
            period = point.period,
            "percent change skipped: zero base value"
        );
    }
    report.skipped_points.extend(yoy_skipped);
    report.skipped_points.extend(mom_skipped);

    info!(
        forecast = report.forecast_entities.len(),
        failed = report.failures.len(),
        skipped_points = report.skipped_points.len(),
        "forecast run finished"
    );

    Ok(RunOutput {
        combined,
        year_over_year,
        month_over_month,
        forecasts,
        report,
    })
}

/// Fit, predict and cap one entity.
///
/// An entity whose observations stop before the table's last date is
/// projected across the gap, so the returned forecast always covers the
/// `horizon` months after the table's last date.
pub fn forecast_entity(
    dates: &[NaiveDate],
    column: &Column,
    config: &PipelineConfig,
) -> Result<EntityForecast> {
    let series = column_to_series(dates, column)?;
    let table_last = dates.last().copied().ok_or(ForecastError::EmptyData)?;

    let mut model = config.build_model();
    model.fit(&series)?;

    let last_observed = series.last_date().ok_or(ForecastError::FitRequired)?;
    let gap = usize::try_from(months_between(last_observed, table_last)).map_err(|_| {
        ForecastError::TimestampError(format!(
            "last observation {last_observed} is after {table_last}"
        ))
    })?;
    let raw = model.predict(gap + config.horizon)?;

    // Cap over the full projection so ceiling steps line up with model steps.
    let (forecast, cap) = if config.apply_growth_cap {
        let capper = GrowthCapper::monthly();
        let params = capper.parameters(series.values())?;
        (capper.cap(series.values(), raw)?, Some(params))
    } else {
        (raw, None)
    };
    let forecast = forecast.skip_steps(gap);

    if forecast.dates() != months_after(table_last, config.horizon)?.as_slice() {
        return Err(ForecastError::TimestampError(format!(
            "forecast dates for '{}' do not follow {table_last}",
            column.name
        )));
    }
    if let Some(pos) = forecast.values().iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::ComputationError(format!(
            "forecast step {} is not finite",
            pos + 1
        )));
    }

    debug!(
        entity = %column.name,
        model = model.name(),
        observations = series.len(),
        gap,
        cagr = cap.map(|c| c.cagr),
        "entity forecast"
    );

    Ok(EntityForecast {
        entity: column.name.clone(),
        state: model.state(),
        cap,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::month_sequence;
    use crate::models::Damping;

    fn column(name: &str, values: Vec<Option<f64>>) -> Column {
        Column {
            name: name.to_string(),
            values,
        }
    }

    fn dates(n: usize) -> Vec<NaiveDate> {
        month_sequence(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(), n).unwrap()
    }

    #[test]
    fn forecast_entity_respects_ceiling() {
        // Steep recent growth over a flat history: the ceiling binds.
        let mut values: Vec<Option<f64>> = vec![Some(100.0); 24];
        for (i, v) in values.iter_mut().enumerate().skip(18) {
            *v = Some(100.0 + 10.0 * (i - 17) as f64);
        }
        let config = PipelineConfig {
            horizon: 12,
            damping: Damping::Fixed(1.0),
            ..Default::default()
        };
        let result = forecast_entity(&dates(24), &column("Faro", values), &config).unwrap();

        let cap = result.cap.unwrap();
        let ceiling = cap.ceiling(12, 12);
        assert_eq!(result.forecast.horizon(), 12);
        for (v, c) in result.forecast.values().iter().zip(&ceiling) {
            assert!(v <= c);
        }
    }

    #[test]
    fn forecast_entity_without_cap_has_no_parameters() {
        let values = (0..12).map(|i| Some(50.0 + i as f64)).collect();
        let config = PipelineConfig {
            horizon: 3,
            apply_growth_cap: false,
            ..Default::default()
        };
        let result = forecast_entity(&dates(12), &column("Gent", values), &config).unwrap();
        assert!(result.cap.is_none());
        assert!(result.state.is_some());
    }

    #[test]
    fn forecast_entity_bridges_trailing_gap() {
        // Observed for the first year only, in a two-year table.
        let values: Vec<Option<f64>> = (0..24)
            .map(|i| (i < 12).then(|| 100.0 * 1.01_f64.powi(i)))
            .collect();
        let config = PipelineConfig {
            horizon: 3,
            damping: Damping::Fixed(1.0),
            apply_growth_cap: false,
            ..Default::default()
        };
        let table_dates = dates(24);
        let result = forecast_entity(&table_dates, &column("Linz", values), &config).unwrap();

        let expected_dates = months_after(table_dates[23], 3).unwrap();
        assert_eq!(result.forecast.dates(), expected_dates.as_slice());
        // Step h after the table end is step 12 + h after the last observation.
        for (h, v) in result.forecast.values().iter().enumerate() {
            let expected = 100.0 * 1.01_f64.powi(11 + 12 + h as i32 + 1);
            assert!((v - expected).abs() / expected < 1e-6, "{v} != {expected}");
        }
    }

    #[test]
    fn trailing_gap_uses_matching_ceiling_steps() {
        let values: Vec<Option<f64>> = (0..24)
            .map(|i| (i < 12).then(|| 100.0 + 5.0 * i as f64))
            .collect();
        let config = PipelineConfig {
            horizon: 2,
            damping: Damping::Fixed(1.0),
            ..Default::default()
        };
        let result = forecast_entity(&dates(24), &column("Graz", values), &config).unwrap();

        let ceiling = result.cap.unwrap().ceiling(12 + 2, 12);
        for (v, c) in result.forecast.values().iter().zip(&ceiling[12..]) {
            assert!(v <= c);
        }
    }

    #[test]
    fn non_convergence_fails_only_that_entity() {
        let n = 36;
        let noisy: Vec<Option<f64>> = (0..n)
            .map(|i| Some(100.0 + 7.0 * ((i * 37 % 11) as f64) + 0.5 * i as f64))
            .collect();
        // Log-linear history: the objective is flat, so the first iteration converges.
        let geometric: Vec<Option<f64>> = (0..n).map(|i| Some(50.0 * 1.02_f64.powi(i as i32))).collect();
        let table = SeriesTable::new(
            dates(n),
            vec![column("Noisy", noisy), column("Steady", geometric)],
        )
        .unwrap();

        let config = PipelineConfig {
            horizon: 4,
            max_iterations: 1,
            ..Default::default()
        };
        let output = run(&table, &config).unwrap();

        assert_eq!(output.report.forecast_entities, vec!["Steady".to_string()]);
        assert_eq!(output.report.failed_entities().collect::<Vec<_>>(), vec!["Noisy"]);
        assert!(matches!(
            output.report.failures[0].error,
            ForecastError::ConvergenceFailure { iterations: 1 }
        ));
        assert_eq!(output.combined.series("Steady").unwrap().len(), n + 4);
    }

    #[test]
    fn run_isolates_entity_failures() {
        let n = 24;
        let table = SeriesTable::new(
            dates(n),
            vec![
                column("Good", (0..n).map(|i| Some(100.0 + i as f64)).collect()),
                column(
                    "Negative",
                    (0..n).map(|i| Some(i as f64 - 5.0)).collect(),
                ),
                column("Sparse", {
                    let mut v = vec![None; n];
                    v[3] = Some(10.0);
                    v
                }),
            ],
        )
        .unwrap();

        let output = run(
            &table,
            &PipelineConfig {
                horizon: 6,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(output.report.forecast_entities, vec!["Good".to_string()]);
        let failed: Vec<_> = output.report.failed_entities().collect();
        assert_eq!(failed, vec!["Negative", "Sparse"]);
        assert!(matches!(
            output.report.failures[0].error,
            ForecastError::NonPositiveValue { .. }
        ));
        assert!(matches!(
            output.report.failures[1].error,
            ForecastError::InsufficientData { needed: 2, got: 1 }
        ));
        assert_eq!(output.combined.series("Good").unwrap().len(), n + 6);
        assert!(output.combined.series("Negative").is_none());
        // Percent changes still cover every column.
        assert!(output.month_over_month.records()[0].get("Negative").is_some());
    }

    #[test]
    fn zero_horizon_aborts_before_any_work() {
        let table = SeriesTable::new(dates(3), vec![column("A", vec![Some(1.0); 3])]).unwrap();
        let config = PipelineConfig {
            horizon: 0,
            ..Default::default()
        };
        assert!(matches!(
            run(&table, &config),
            Err(InputError::InvalidHorizon(0))
        ));
    }
}
