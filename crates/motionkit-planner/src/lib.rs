//! motionkit Planner Crate
//!
//! Turns circular and helical G2/G3 commands into runs of short straight
//! moves for a line planner.
//!
//! - [`arc`]: arc preparation, geometry and the non-blocking segment emitter
//! - [`machine`]: canonical machine model the arc reads from and commits to
//! - [`planner`]: the line planner seam and a bounded queue implementation
//! - [`soft_limits`]: travel limit checks on move targets

pub mod arc;
pub mod machine;
pub mod planner;
pub mod soft_limits;

pub use arc::{
    ArcCommand, ArcDirection, ArcSession, FeedSpec, MotionContext, RunState, SegmentLimits,
    StepResult,
};
pub use machine::{CanonicalMachine, CycleState, GcodeModel};
pub use planner::{LineMove, LinePlanner, PlannerQueue};
pub use soft_limits::SoftLimits;
