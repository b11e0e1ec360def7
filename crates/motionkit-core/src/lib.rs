//! # motionkit Core
//!
//! Core types shared by the motionkit crates: machine axes, arc planes,
//! motion and units modes, numeric constants and error types.

pub mod constants;
pub mod data;
pub mod error;
pub mod units;

pub use data::{Axis, AxisFlags, AxisVector, MotionMode, Plane, PlaneAxes, AXES};

pub use error::{ArcError, Error, PlannerError, Result};

pub use units::Units;
