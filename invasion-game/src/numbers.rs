//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Round a ratio into a percentage clamped to `[0, 100]`.
///
/// Non-finite ratios (zero denominators) collapse to 0.
#[must_use]
pub fn percent_u8(numerator: f64, denominator: f64) -> u8 {
    if denominator <= 0.0 {
        return 0;
    }
    let ratio = numerator / denominator;
    if !ratio.is_finite() {
        return 0;
    }
    let pct = round_f64_to_i32(ratio * 100.0).clamp(0, 100);
    u8::try_from(pct).unwrap_or(0)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Floor a unit-interval draw into a 1-based die face.
#[must_use]
pub fn unit_to_die(unit: f64, sides: u8) -> u8 {
    let scaled = (unit.clamp(0.0, 1.0) * f64::from(sides)).floor();
    let face = cast::<f64, u8>(scaled).unwrap_or(0).saturating_add(1);
    face.min(sides)
}

/// Floor a unit-interval draw into an index below `len`.
#[must_use]
pub fn unit_to_index(unit: f64, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let scaled = (unit.clamp(0.0, 1.0) * usize_to_f64(len)).floor();
    Some(cast::<f64, usize>(scaled).unwrap_or(0).min(last))
}
