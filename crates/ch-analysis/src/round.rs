//! Decimal rounding for reported numbers.

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// [`round_to`] over an optional value.
pub fn round_opt(value: Option<f64>, places: u32) -> Option<f64> {
    value.map(|v| round_to(v, places))
}
