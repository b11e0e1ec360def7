//! Shared numeric constants

/// Microseconds in one minute; move times are kept in minutes
pub const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

/// Tolerance for treating a floating point quantity as zero
pub const EPSILON: f64 = 0.00001;

/// Whether a value is zero within [`EPSILON`]
#[inline]
pub fn fp_zero(value: f64) -> bool {
    value.abs() < EPSILON
}
