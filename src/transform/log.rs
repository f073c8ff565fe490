//! Natural-log transform for strictly positive series.
//!
//! Multiplicative growth becomes additive in log space, which is what the
//! additive-trend smoother expects.

use crate::error::{ForecastError, Result};

/// `ln(x)` for every value; fails on the first value `<= 0`.
pub fn log_transform(series: &[f64]) -> Result<Vec<f64>> {
    series
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if value > 0.0 {
                Ok(value.ln())
            } else {
                Err(ForecastError::NonPositiveValue { index, value })
            }
        })
        .collect()
}

/// Inverse of [`log_transform`].
pub fn inv_log_transform(transformed: &[f64]) -> Vec<f64> {
    transformed.iter().map(|y| y.exp()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn log_roundtrip_recovers_values() {
        let series = [1.0, 2.5, 100.0];
        let logged = log_transform(&series).unwrap();
        assert_relative_eq!(logged[0], 0.0);
        let back = inv_log_transform(&logged);
        for (a, b) in series.iter().zip(&back) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn log_rejects_zero_and_negative() {
        assert_eq!(
            log_transform(&[3.0, 0.0, -1.0]),
            Err(ForecastError::NonPositiveValue {
                index: 1,
                value: 0.0
            })
        );
    }
}
