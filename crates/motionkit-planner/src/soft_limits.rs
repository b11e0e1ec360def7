//! Soft travel limits
//!
//! Move targets are checked against each axis' configured travel range
//! before a move is committed. Axes without a range are never checked.

use motionkit_core::{ArcError, Axis, AxisVector, AXES};
use motionkit_settings::Config;

/// Soft limits configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SoftLimits {
    /// Travel range per axis, `None` when the axis is unlimited
    ranges: [Option<(f64, f64)>; AXES],
    /// Limits enabled
    enabled: bool,
}

impl SoftLimits {
    /// Build soft limits from machine configuration
    pub fn from_config(config: &Config) -> Self {
        let mut ranges = [None; AXES];
        for axis in Axis::ALL {
            let settings = config.axes.get(axis);
            if settings.has_travel_limits() {
                ranges[axis.index()] = Some((settings.travel_min, settings.travel_max));
            }
        }
        Self {
            ranges,
            enabled: config.soft_limits.enabled,
        }
    }

    /// Soft limits that accept every target
    pub fn disabled() -> Self {
        Self {
            ranges: [None; AXES],
            enabled: false,
        }
    }

    /// Whether limits are being enforced
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable enforcement
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Set or clear the travel range of one axis
    pub fn set_range(&mut self, axis: Axis, range: Option<(f64, f64)>) {
        self.ranges[axis.index()] = range;
    }

    /// Check a target, reporting the first axis out of range
    pub fn check(&self, target: &AxisVector) -> Result<(), ArcError> {
        match self.violations(target).into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    /// All axes of a target that are out of range
    pub fn violations(&self, target: &AxisVector) -> Vec<ArcError> {
        let mut violations = Vec::new();

        if !self.enabled {
            return violations;
        }

        for axis in Axis::ALL {
            let Some((min, max)) = self.ranges[axis.index()] else {
                continue;
            };
            let value = target[axis.index()];
            // NaN compares false against both bounds
            if !value.is_finite() || value < min || value > max {
                violations.push(ArcError::SoftLimit {
                    axis,
                    value,
                    min,
                    max,
                });
            }
        }

        violations
    }
}

impl Default for SoftLimits {
    fn default() -> Self {
        Self::disabled()
    }
}
