//! Numeric guards for single-bar math.
//!
//! Snapshots arrive unvalidated (flat ranges, zero previous close, zero price),
//! so every division in the engine goes through these helpers and nothing
//! non-finite reaches a result.

/// Largest magnitude accepted for an input price, volume or ratio. Values past
/// it are treated like NaN so that derived sums and products stay finite.
pub const MAX_MAGNITUDE: f64 = 1e15;

/// `num / den`, or `fallback` when the denominator is zero or the quotient
/// is not finite or past `MAX_MAGNITUDE`.
pub fn ratio_or(num: f64, den: f64, fallback: f64) -> f64 {
    if den == 0.0 {
        return fallback;
    }
    bounded_or(num / den, fallback)
}

/// Percent change from `base` to `value`; 0 when `base` is zero.
pub fn percent_change(value: f64, base: f64) -> f64 {
    ratio_or(value - base, base, 0.0) * 100.0
}

/// `value` when it is finite and within `MAX_MAGNITUDE`, else `fallback`.
pub fn bounded_or(value: f64, fallback: f64) -> f64 {
    if is_bounded(value) {
        value
    } else {
        fallback
    }
}

pub fn is_bounded(value: f64) -> bool {
    value.is_finite() && value.abs() <= MAX_MAGNITUDE
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}
