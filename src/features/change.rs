//! Period-over-period percentage changes.

use chrono::NaiveDate;

use crate::core::Series;
use crate::error::{ForecastError, Result};

/// Month-over-month period for monthly data.
pub const MONTH_OVER_MONTH: usize = 1;

/// Year-over-year period for monthly data.
pub const YEAR_OVER_YEAR: usize = 12;

/// Outcome of one percent-change computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointChange {
    /// `(v[i] - v[i-p]) / v[i-p] * 100`.
    Value(f64),
    /// The base value `v[i-p]` is zero.
    ZeroBase,
    /// One of the two values is absent.
    Missing,
}

impl PointChange {
    pub fn value(&self) -> Option<f64> {
        match *self {
            PointChange::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Percent change between `current` and `base`.
pub fn point_change(current: f64, base: f64) -> PointChange {
    if !current.is_finite() || !base.is_finite() {
        PointChange::Missing
    } else if base == 0.0 {
        PointChange::ZeroBase
    } else {
        PointChange::Value((current - base) / base * 100.0)
    }
}

/// Percent change over `period` steps for a column with gaps.
///
/// The result has `values.len() - period` entries; entry `k` belongs to
/// input index `k + period`. The first `period` inputs produce nothing.
pub fn percent_changes(values: &[Option<f64>], period: usize) -> Result<Vec<PointChange>> {
    if period == 0 {
        return Err(ForecastError::InvalidParameter(
            "period must be positive".to_string(),
        ));
    }
    if values.len() <= period {
        return Ok(Vec::new());
    }

    Ok(values[period..]
        .iter()
        .zip(values)
        .map(|(current, base)| match (current, base) {
            (Some(c), Some(b)) => point_change(*c, *b),
            _ => PointChange::Missing,
        })
        .collect())
}

/// A point left out of a [`PercentChangeSeries`] because its base was zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroBasePoint {
    /// Index into the input series.
    pub index: usize,
    pub date: NaiveDate,
}

/// Dated percent changes of one series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PercentChangeSeries {
    pub period: usize,
    pub points: Vec<(NaiveDate, f64)>,
    pub skipped: Vec<ZeroBasePoint>,
}

impl PercentChangeSeries {
    /// Percent change of `series` over `period` observations.
    pub fn compute(series: &Series, period: usize) -> Result<Self> {
        let cells: Vec<Option<f64>> = series.values().iter().copied().map(Some).collect();
        let changes = percent_changes(&cells, period)?;

        let mut points = Vec::with_capacity(changes.len());
        let mut skipped = Vec::new();
        for (k, change) in changes.into_iter().enumerate() {
            let index = k + period;
            let date = series.dates()[index];
            match change {
                PointChange::Value(v) => points.push((date, v)),
                PointChange::ZeroBase => skipped.push(ZeroBasePoint { index, date }),
                PointChange::Missing => {}
            }
        }

        Ok(Self {
            period,
            points,
            skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|&(_, v)| v).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_series(values: Vec<f64>) -> Series {
        Series::monthly(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), values).unwrap()
    }

    #[test]
    fn month_over_month_basic() {
        let s = make_series(vec![100.0, 110.0, 99.0]);
        let pct = PercentChangeSeries::compute(&s, MONTH_OVER_MONTH).unwrap();

        assert_eq!(pct.len(), 2);
        assert_eq!(pct.points[0].0, s.dates()[1]);
        assert_relative_eq!(pct.points[0].1, 10.0, epsilon = 1e-12);
        assert_relative_eq!(pct.points[1].1, -10.0, epsilon = 1e-12);
    }

    #[test]
    fn year_over_year_of_geometric_series_is_constant() {
        // 1% a month compounds to the same annual change at every point.
        let values: Vec<f64> = (0..48).map(|i| 200.0 * 1.01_f64.powi(i)).collect();
        let pct = PercentChangeSeries::compute(&make_series(values), YEAR_OVER_YEAR).unwrap();

        assert_eq!(pct.len(), 36);
        let expected = (1.01_f64.powi(12) - 1.0) * 100.0;
        for v in pct.values() {
            assert_relative_eq!(v, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_base_skips_only_that_point() {
        let mut values: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        values[5] = 0.0;
        let s = make_series(values.clone());
        let pct = PercentChangeSeries::compute(&s, MONTH_OVER_MONTH).unwrap();

        assert_eq!(
            pct.skipped,
            vec![ZeroBasePoint {
                index: 6,
                date: s.dates()[6]
            }]
        );
        assert_eq!(pct.len(), 8);
        assert!(pct.points.iter().all(|(d, _)| *d != s.dates()[6]));
        // Index 5 (drop to zero) is still a valid -100%.
        assert_relative_eq!(pct.points[4].1, -100.0);
        for (date, v) in &pct.points[5..] {
            assert!(v.is_finite());
            assert!(*date > s.dates()[6]);
        }
    }

    #[test]
    fn short_input_has_no_output() {
        let pct = PercentChangeSeries::compute(&make_series(vec![1.0; 12]), 12).unwrap();
        assert!(pct.is_empty());
        assert!(pct.skipped.is_empty());
    }

    #[test]
    fn zero_period_is_invalid() {
        assert!(matches!(
            percent_changes(&[Some(1.0), Some(2.0)], 0),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn gaps_produce_missing_points() {
        let changes = percent_changes(&[Some(1.0), None, Some(2.0), Some(3.0)], 1).unwrap();
        assert_eq!(
            changes,
            vec![
                PointChange::Missing,
                PointChange::Missing,
                PointChange::Value(50.0)
            ]
        );
    }
}
