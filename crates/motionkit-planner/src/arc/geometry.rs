//! Arc geometry
//!
//! Angles are in radians, measured from the positive direction of the
//! second plane axis and increasing clockwise. Travel is positive for
//! clockwise arcs and negative for counterclockwise arcs.

use motionkit_core::constants::{fp_zero, MICROSECONDS_PER_MINUTE};
use motionkit_core::ArcError;
use motionkit_settings::ArcSettings;
use std::f64::consts::{PI, TAU};

/// Relative slack allowed on the radius discriminant when the requested
/// radius is exactly half the chord
const DISCRIMINANT_TOLERANCE: f64 = 1e-9;

/// Direction of travel around the arc center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

/// How the move duration is specified
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedSpec {
    /// Distance rate in mm/min
    UnitsPerMinute(f64),
    /// Total move time in minutes (G93)
    InverseTime(f64),
}

/// Segmentation limits applied to an arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLimits {
    /// Maximum chord-to-arc deviation in mm
    pub chordal_tolerance: f64,
    /// Shortest segment in mm
    pub min_segment_length: f64,
    /// Shortest segment duration in microseconds
    pub min_segment_time_us: f64,
}

impl From<&ArcSettings> for SegmentLimits {
    fn from(settings: &ArcSettings) -> Self {
        Self {
            chordal_tolerance: settings.chordal_tolerance,
            min_segment_length: settings.min_segment_length,
            min_segment_time_us: settings.min_segment_time_us,
        }
    }
}

/// Angle of the vector `(x, y)` from the positive y direction
///
/// Negative angles lie to the left of the y axis, positive to the right.
/// Fails when the vector has no direction.
pub fn theta(x: f64, y: f64) -> Result<f64, ArcError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(ArcError::specification(format!(
            "non-finite arc vector ({}, {})",
            x, y
        )));
    }
    if x == 0.0 && y == 0.0 {
        return Err(ArcError::specification(
            "arc center coincides with an end point",
        ));
    }

    // y == 0 gives x / 0 == +-inf and atan(+-inf) == +-PI/2
    let theta = (x / y.abs()).atan();
    if y > 0.0 {
        Ok(theta)
    } else if theta > 0.0 {
        Ok(PI - theta)
    } else {
        Ok(-PI - theta)
    }
}

/// Center offset of the circle of `radius` through the origin and `(x, y)`
///
/// `(x, y)` is the travel vector from the current position to the target.
/// The center sits on the perpendicular bisector of the chord. Clockwise
/// arcs take the center giving less than half a turn; counterclockwise
/// motion and a negative radius each move it to the other side.
pub fn offsets_from_radius(
    x: f64,
    y: f64,
    radius: f64,
    direction: ArcDirection,
) -> Result<(f64, f64), ArcError> {
    let chord = x.hypot(y);
    if !chord.is_finite() || chord == 0.0 {
        return Err(ArcError::specification(
            "radius format arc needs an end point distinct from the start",
        ));
    }

    let mut discriminant = 4.0 * radius * radius - x * x - y * y;
    if discriminant < 0.0 {
        if discriminant < -DISCRIMINANT_TOLERANCE * chord * chord {
            return Err(ArcError::FloatingPoint {
                radius: radius.abs(),
                half_chord: chord / 2.0,
            });
        }
        discriminant = 0.0;
    }

    // twice the center height above the chord midpoint, per unit chord
    let mut h_x2_div_d = -discriminant.sqrt() / chord;
    if direction == ArcDirection::CounterClockwise {
        h_x2_div_d = -h_x2_div_d;
    }
    // negative R selects the long way around
    if radius < 0.0 {
        h_x2_div_d = -h_x2_div_d;
    }

    Ok(((x - y * h_x2_div_d) / 2.0, (y + x * h_x2_div_d) / 2.0))
}

/// Signed angular travel from `theta_start` to `theta_end`
///
/// Travel is first taken clockwise in `[0, 2PI)`. Coincident angles, on either
/// side of the wrap, mean a full circle. Counterclockwise arcs are then
/// expressed as negative travel.
pub fn angular_travel(theta_start: f64, theta_end: f64, direction: ArcDirection) -> f64 {
    let mut travel = theta_end - theta_start;
    if travel < 0.0 {
        travel += TAU;
    }

    let full_circle = fp_zero(travel) || fp_zero(TAU - travel);
    match (direction, full_circle) {
        (ArcDirection::Clockwise, true) => TAU,
        (ArcDirection::CounterClockwise, true) => -TAU,
        (ArcDirection::Clockwise, false) => travel,
        (ArcDirection::CounterClockwise, false) => travel - TAU,
    }
}

/// Estimated arc duration in minutes
///
/// The time is never shorter than the slowest single axis allows, assuming
/// each plane axis may at some point carry the whole planar velocity. This
/// over-estimates for most arcs. `max_feed` holds the maximum rates of the
/// two plane axes and the helix axis; non-positive rates are ignored.
pub fn arc_time(
    linear_travel: f64,
    angular_travel: f64,
    radius: f64,
    feed: FeedSpec,
    max_feed: [f64; 3],
) -> f64 {
    let planar_travel = (angular_travel * radius).abs();

    let mut move_time = match feed {
        FeedSpec::InverseTime(minutes) => minutes,
        FeedSpec::UnitsPerMinute(rate) => planar_travel.hypot(linear_travel) / rate,
    };

    let axis_travel = [planar_travel, planar_travel, linear_travel.abs()];
    for (travel, rate) in axis_travel.iter().zip(max_feed.iter()) {
        if *rate > 0.0 {
            move_time = move_time.max(travel / rate);
        }
    }
    move_time
}

/// Number of segments for an arc, at least one
///
/// Takes the fewest segments that any of the chordal accuracy, minimum
/// segment length and minimum segment time constraints allows.
pub fn segment_count(length: f64, radius: f64, time: f64, limits: &SegmentLimits) -> u32 {
    let tolerance = limits.chordal_tolerance;
    let chord_squared = 4.0 * tolerance * (2.0 * radius - tolerance);
    // a radius under half the tolerance never deviates by more than the tolerance
    let for_accuracy = if chord_squared > 0.0 {
        length / chord_squared.sqrt()
    } else {
        f64::INFINITY
    };
    let for_distance = length / limits.min_segment_length;
    let for_time = time * MICROSECONDS_PER_MINUTE / limits.min_segment_time_us;

    let segments = for_accuracy.min(for_distance).min(for_time).floor();
    if segments >= 1.0 {
        segments as u32
    } else {
        1
    }
}
