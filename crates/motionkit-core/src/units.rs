//! Unit conversion utilities
//!
//! Arc geometry is computed in canonical millimeters. Raw arc words
//! (I, J, K, R) arrive in whatever units mode (G20/G21) is active.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Units mode - modal group 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// G21 millimeters
    Millimeters,
    /// G20 inches
    Inches,
}

impl Units {
    /// Convert a value in these units to millimeters
    pub fn to_millimeters(self, value: f64) -> f64 {
        match self {
            Units::Millimeters => value,
            Units::Inches => value * MM_PER_INCH,
        }
    }

    /// Convert a millimeter value to these units
    pub fn from_millimeters(self, value_mm: f64) -> f64 {
        match self {
            Units::Millimeters => value_mm,
            Units::Inches => value_mm / MM_PER_INCH,
        }
    }

    /// Map a G-code number (20, 21) to a units mode
    pub fn from_gcode(code: u8) -> Option<Self> {
        match code {
            20 => Some(Units::Inches),
            21 => Some(Units::Millimeters),
            _ => None,
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::Millimeters
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeters => write!(f, "mm"),
            Self::Inches => write!(f, "in"),
        }
    }
}

/// Format a millimeter length for display in the given units
pub fn format_length(value_mm: f64, units: Units) -> String {
    format!("{:.3}", units.from_millimeters(value_mm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_millimeters() {
        assert_eq!(Units::Millimeters.to_millimeters(12.5), 12.5);
        assert!((Units::Inches.to_millimeters(1.0) - 25.4).abs() < 1e-12);
        assert!((Units::Inches.from_millimeters(50.8) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_gcode() {
        assert_eq!(Units::from_gcode(20), Some(Units::Inches));
        assert_eq!(Units::from_gcode(21), Some(Units::Millimeters));
        assert_eq!(Units::from_gcode(22), None);
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(25.4, Units::Inches), "1.000");
        assert_eq!(format_length(3.14159, Units::Millimeters), "3.142");
    }
}
