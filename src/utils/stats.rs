//! Numeric helpers shared by the output stages.

/// Round to `decimals` places, half away from zero.
///
/// Non-finite values pass through unchanged.
///
/// # Example
/// ```
/// use price_outlook::utils::round_to;
///
/// assert_eq!(round_to(110.256, 2), 110.26);
/// assert_eq!(round_to(-1.005, 1), -1.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// [`round_to`] applied to every element.
pub fn round_all(values: &[f64], decimals: u32) -> Vec<f64> {
    values.iter().map(|&v| round_to(v, decimals)).collect()
}
