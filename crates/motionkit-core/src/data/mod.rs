//! Data models for axes, planes and motion modes
//!
//! This module provides:
//! - Axis identifiers with full 6-axis support (X, Y, Z, A, B, C)
//! - Per-axis value and flag vectors
//! - Arc plane selection (G17, G18, G19) and its axis assignment
//! - Motion mode (G0, G1, G2, G3)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of machine axes
pub const AXES: usize = 6;

/// One value per machine axis, indexed by [`Axis::index`]
pub type AxisVector = [f64; AXES];

/// One flag per machine axis, indexed by [`Axis::index`]
pub type AxisFlags = [bool; AXES];

/// Machine axis identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X linear axis
    X,
    /// Y linear axis
    Y,
    /// Z linear axis
    Z,
    /// A rotary axis (around X)
    A,
    /// B rotary axis (around Y)
    B,
    /// C rotary axis (around Z)
    C,
}

impl Axis {
    /// All axes in index order
    pub const ALL: [Axis; AXES] = [Axis::X, Axis::Y, Axis::Z, Axis::A, Axis::B, Axis::C];

    /// Position of this axis in an [`AxisVector`]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::A => 3,
            Axis::B => 4,
            Axis::C => 5,
        }
    }

    /// Look up an axis by its G-code letter
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            'A' => Some(Axis::A),
            'B' => Some(Axis::B),
            'C' => Some(Axis::C),
            _ => None,
        }
    }

    /// Whether this is a linear (millimeter) axis
    pub fn is_linear(self) -> bool {
        matches!(self, Axis::X | Axis::Y | Axis::Z)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::A => "A",
            Axis::B => "B",
            Axis::C => "C",
        };
        write!(f, "{}", letter)
    }
}

/// Axes of an arc plane
///
/// `axis_0` and `axis_1` span the plane, `axis_2` is normal to it and
/// carries the helix travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneAxes {
    /// First in-plane axis
    pub axis_0: Axis,
    /// Second in-plane axis
    pub axis_1: Axis,
    /// Linear axis normal to the plane
    pub axis_2: Axis,
}

/// Arc plane selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    /// G17
    XY,
    /// G18
    XZ,
    /// G19
    YZ,
}

impl Plane {
    /// Axis assignment for this plane
    pub const fn axes(self) -> PlaneAxes {
        match self {
            Plane::XY => PlaneAxes {
                axis_0: Axis::X,
                axis_1: Axis::Y,
                axis_2: Axis::Z,
            },
            Plane::XZ => PlaneAxes {
                axis_0: Axis::X,
                axis_1: Axis::Z,
                axis_2: Axis::Y,
            },
            Plane::YZ => PlaneAxes {
                axis_0: Axis::Y,
                axis_1: Axis::Z,
                axis_2: Axis::X,
            },
        }
    }

    /// Map a G-code number (17, 18, 19) to a plane
    pub fn from_gcode(code: u8) -> Option<Self> {
        match code {
            17 => Some(Plane::XY),
            18 => Some(Plane::XZ),
            19 => Some(Plane::YZ),
            _ => None,
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::XY
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::XY => write!(f, "XY plane (G17)"),
            Plane::XZ => write!(f, "XZ plane (G18)"),
            Plane::YZ => write!(f, "YZ plane (G19)"),
        }
    }
}

/// Motion mode - modal group 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// G0 rapid positioning
    Rapid,
    /// G1 linear feed
    Linear,
    /// G2 clockwise arc
    ClockwiseArc,
    /// G3 counterclockwise arc
    CounterClockwiseArc,
}

impl MotionMode {
    /// Map a G-code number (0..=3) to a motion mode
    pub fn from_gcode(code: u8) -> Option<Self> {
        match code {
            0 => Some(MotionMode::Rapid),
            1 => Some(MotionMode::Linear),
            2 => Some(MotionMode::ClockwiseArc),
            3 => Some(MotionMode::CounterClockwiseArc),
            _ => None,
        }
    }

    /// Whether this is one of the two arc modes
    pub fn is_arc(self) -> bool {
        matches!(
            self,
            MotionMode::ClockwiseArc | MotionMode::CounterClockwiseArc
        )
    }
}

impl Default for MotionMode {
    fn default() -> Self {
        Self::Rapid
    }
}

impl fmt::Display for MotionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionMode::Rapid => write!(f, "Rapid positioning (G0)"),
            MotionMode::Linear => write!(f, "Linear interpolation (G1)"),
            MotionMode::ClockwiseArc => write!(f, "Clockwise arc (G2)"),
            MotionMode::CounterClockwiseArc => write!(f, "Counter-clockwise arc (G3)"),
        }
    }
}
