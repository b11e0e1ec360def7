//! Arc planning and execution
//!
//! An arc command is prepared once into an [`ArcSession`], then executed by
//! calling [`ArcSession::step`] from the control loop until it reports
//! [`StepResult::Done`]. Each step queues at most one straight segment.

pub mod geometry;
mod session;

pub use geometry::{ArcDirection, FeedSpec, SegmentLimits};
pub use session::{ArcSession, RunState};

use crate::machine::CanonicalMachine;
use crate::planner::LineMove;
use motionkit_core::{Axis, AxisFlags, AxisVector, MotionMode, AXES};

/// Outcome of one [`ArcSession::step`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Last segment queued, the session is idle again
    Done,
    /// Segments remain or the planner was busy; call again
    Retry,
    /// No arc in progress
    NoOp,
}

/// A G2/G3 command as handed over by the G-code interpreter
#[derive(Debug, Clone, PartialEq)]
pub struct ArcCommand {
    /// End position per axis, mm; only flagged axes are used
    pub target: AxisVector,
    /// Axes named in the command
    pub axis_flags: AxisFlags,
    /// Center offset along X, in the active units
    pub i: f64,
    /// Center offset along Y, in the active units
    pub j: f64,
    /// Center offset along Z, in the active units
    pub k: f64,
    /// Radius in the active units; zero selects center format, negative
    /// selects the arc longer than half a turn
    pub radius: f64,
    /// Clockwise or counterclockwise
    pub motion_mode: MotionMode,
}

impl ArcCommand {
    /// Create an empty arc command
    pub fn new(motion_mode: MotionMode) -> Self {
        Self {
            target: [0.0; AXES],
            axis_flags: [false; AXES],
            i: 0.0,
            j: 0.0,
            k: 0.0,
            radius: 0.0,
            motion_mode,
        }
    }

    /// Clockwise arc command (G2)
    pub fn clockwise() -> Self {
        Self::new(MotionMode::ClockwiseArc)
    }

    /// Counterclockwise arc command (G3)
    pub fn counter_clockwise() -> Self {
        Self::new(MotionMode::CounterClockwiseArc)
    }

    /// Set the end position of one axis
    pub fn with_axis(mut self, axis: Axis, value: f64) -> Self {
        self.target[axis.index()] = value;
        self.axis_flags[axis.index()] = true;
        self
    }

    /// Set the I, J, K center offsets
    pub fn with_offsets(mut self, i: f64, j: f64, k: f64) -> Self {
        self.i = i;
        self.j = j;
        self.k = k;
        self
    }

    /// Set the radius
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Whether any axis word is present
    pub fn has_axis_words(&self) -> bool {
        self.axis_flags.iter().any(|flag| *flag)
    }

    /// Direction of travel
    pub fn direction(&self) -> ArcDirection {
        match self.motion_mode {
            MotionMode::CounterClockwiseArc => ArcDirection::CounterClockwise,
            _ => ArcDirection::Clockwise,
        }
    }
}

/// Motion context captured when an arc is prepared
///
/// The G-code model may move on to later commands while the arc is still
/// draining, so every value the emitter needs is copied here.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionContext {
    /// Line number of the arc command
    pub line_number: u32,
    /// Resolved arc end point, all axes
    pub target: AxisVector,
    /// Work offsets in effect
    pub work_offset: AxisVector,
    /// Clockwise or counterclockwise
    pub motion_mode: MotionMode,
    /// Feed rate, mm/min
    pub feed_rate: f64,
    /// Inverse time mode (G93)
    pub inverse_feed_rate_mode: bool,
    /// Whole-arc time in inverse time mode, minutes
    pub inverse_feed_rate: f64,
    /// Maximum feed rate per axis
    pub feedrate_max: AxisVector,
    /// Duration of each segment, minutes
    pub move_time: f64,
    /// Free planner buffers required before a segment is queued
    pub planner_headroom: usize,
}

impl MotionContext {
    /// Snapshot the machine state for an arc ending at `target`
    pub fn capture(machine: &CanonicalMachine, target: AxisVector, motion_mode: MotionMode) -> Self {
        let model = machine.model();
        Self {
            line_number: model.line_number,
            target,
            work_offset: model.work_offset,
            motion_mode,
            feed_rate: model.feed_rate,
            inverse_feed_rate_mode: model.inverse_feed_rate_mode,
            inverse_feed_rate: model.inverse_feed_rate,
            feedrate_max: machine.feedrate_max(),
            move_time: 0.0,
            planner_headroom: machine.config().planner.buffer_headroom,
        }
    }

    /// How the arc duration is specified
    pub fn feed(&self) -> FeedSpec {
        if self.inverse_feed_rate_mode {
            FeedSpec::InverseTime(self.inverse_feed_rate)
        } else {
            FeedSpec::UnitsPerMinute(self.feed_rate)
        }
    }

    /// A planner move to `target` carrying this context
    pub fn line_move(&self, target: AxisVector) -> LineMove {
        LineMove {
            target,
            move_time: self.move_time,
            feed_rate: self.feed_rate,
            inverse_feed_rate_mode: self.inverse_feed_rate_mode,
            motion_mode: self.motion_mode,
            line_number: self.line_number,
        }
    }
}

impl Default for MotionContext {
    fn default() -> Self {
        Self {
            line_number: 0,
            target: [0.0; AXES],
            work_offset: [0.0; AXES],
            motion_mode: MotionMode::ClockwiseArc,
            feed_rate: 0.0,
            inverse_feed_rate_mode: false,
            inverse_feed_rate: 0.0,
            feedrate_max: [0.0; AXES],
            move_time: 0.0,
            planner_headroom: 0,
        }
    }
}
