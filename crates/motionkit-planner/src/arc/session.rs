//! Arc session
//!
//! Owns the state of the one arc that may be in flight. Preparation fills a
//! fresh session and only replaces the current one once every check has
//! passed, so a rejected command never leaves a half-built arc behind.

use super::geometry::{self, ArcDirection, SegmentLimits};
use super::{ArcCommand, MotionContext, StepResult};
use crate::machine::CanonicalMachine;
use crate::planner::LinePlanner;
use motionkit_core::constants::fp_zero;
use motionkit_core::{ArcError, AxisVector, Plane, PlaneAxes, AXES};
use tracing::{debug, trace, warn};

/// Lifecycle of an arc session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No arc in progress
    Idle,
    /// Segments are being emitted
    Running,
}

/// State of the arc in flight
#[derive(Debug, Clone)]
pub struct ArcSession {
    run_state: RunState,
    /// Plane axes, fixed for the session
    axes: PlaneAxes,
    /// Position after the last emitted segment
    position: AxisVector,
    /// Center offset from the start position, indexed by linear axis
    offset: [f64; 3],
    radius: f64,
    /// Angle of the last emitted point
    theta: f64,
    angular_travel: f64,
    linear_travel: f64,
    length: f64,
    /// Estimated arc time in minutes
    time: f64,
    segments: u32,
    /// Segments still to emit
    segment_count: u32,
    segment_theta: f64,
    segment_linear_travel: f64,
    center_0: f64,
    center_1: f64,
    context: MotionContext,
}

impl ArcSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self {
            run_state: RunState::Idle,
            axes: Plane::XY.axes(),
            position: [0.0; AXES],
            offset: [0.0; 3],
            radius: 0.0,
            theta: 0.0,
            angular_travel: 0.0,
            linear_travel: 0.0,
            length: 0.0,
            time: 0.0,
            segments: 0,
            segment_count: 0,
            segment_theta: 0.0,
            segment_linear_travel: 0.0,
            center_0: 0.0,
            center_1: 0.0,
            context: MotionContext::default(),
        }
    }

    /// Prepare an arc command for execution
    ///
    /// On success the session is running, a machine cycle has been started
    /// and the arc end point is the new model position. A command with no
    /// offsets, no radius and no axis words is accepted without effect.
    pub fn prepare(
        &mut self,
        machine: &mut CanonicalMachine,
        command: &ArcCommand,
    ) -> Result<(), ArcError> {
        let model = *machine.model();

        if !model.inverse_feed_rate_mode && fp_zero(model.feed_rate) {
            return Err(ArcError::FeedRate);
        }

        // an F or M word alone in arc mode
        if fp_zero(command.i)
            && fp_zero(command.j)
            && fp_zero(command.k)
            && fp_zero(command.radius)
            && !command.has_axis_words()
        {
            trace!("Arc command without motion on line {}", model.line_number);
            return Ok(());
        }

        if self.is_running() {
            return Err(ArcError::Busy);
        }

        let target = machine.resolve_target(&command.target, &command.axis_flags);
        let units = model.units;
        let mut arc = ArcSession {
            axes: model.plane.axes(),
            position: *machine.position(),
            offset: [
                units.to_millimeters(command.i),
                units.to_millimeters(command.j),
                units.to_millimeters(command.k),
            ],
            radius: units.to_millimeters(command.radius),
            context: MotionContext::capture(machine, target, command.motion_mode),
            ..Self::new()
        };

        let limits = SegmentLimits::from(&machine.config().arc);
        arc.compute(command.direction(), &limits)?;
        machine.test_soft_limits(&arc.context.target)?;

        machine.cycle_start();
        arc.run_state = RunState::Running;
        machine.set_model_position(&arc.context.target);

        debug!(
            "Arc prepared on line {}: radius={:.4} travel={:.4}rad helix={:.4} length={:.4} time={:.6}min segments={}",
            arc.context.line_number,
            arc.radius,
            arc.angular_travel,
            arc.linear_travel,
            arc.length,
            arc.time,
            arc.segments
        );

        *self = arc;
        Ok(())
    }

    /// Resolve center, travel, timing and segmentation
    fn compute(&mut self, direction: ArcDirection, limits: &SegmentLimits) -> Result<(), ArcError> {
        let a0 = self.axes.axis_0.index();
        let a1 = self.axes.axis_1.index();
        let a2 = self.axes.axis_2.index();
        let target = self.context.target;
        let position = self.position;

        // a radius overrides any I/J/K offsets
        if !fp_zero(self.radius) {
            let (offset_0, offset_1) = geometry::offsets_from_radius(
                target[a0] - position[a0],
                target[a1] - position[a1],
                self.radius,
                direction,
            )?;
            self.offset[a0] = offset_0;
            self.offset[a1] = offset_1;
            self.offset[a2] = 0.0;
        }

        self.theta = geometry::theta(-self.offset[a0], -self.offset[a1])?;
        let theta_end = geometry::theta(
            target[a0] - self.offset[a0] - position[a0],
            target[a1] - self.offset[a1] - position[a1],
        )?;
        self.angular_travel = geometry::angular_travel(self.theta, theta_end, direction);

        self.radius = self.offset[a0].hypot(self.offset[a1]);
        self.linear_travel = target[a2] - position[a2];

        self.length = (self.angular_travel * self.radius).hypot(self.linear_travel.abs());
        if self.length < limits.min_segment_length {
            return Err(ArcError::MinimumLengthMove {
                length: self.length,
                minimum: limits.min_segment_length,
            });
        }

        let feedrate_max = self.context.feedrate_max;
        self.time = geometry::arc_time(
            self.linear_travel,
            self.angular_travel,
            self.radius,
            self.context.feed(),
            [feedrate_max[a0], feedrate_max[a1], feedrate_max[a2]],
        );

        self.segments = geometry::segment_count(self.length, self.radius, self.time, limits);
        self.segment_count = self.segments;
        let segments = f64::from(self.segments);
        self.segment_theta = self.angular_travel / segments;
        self.segment_linear_travel = self.linear_travel / segments;
        self.context.move_time = self.time / segments;

        self.center_0 = position[a0] - self.theta.sin() * self.radius;
        self.center_1 = position[a1] - self.theta.cos() * self.radius;
        Ok(())
    }

    /// Emit the next segment if the planner has room
    ///
    /// Never blocks. Returns [`StepResult::Retry`] while segments remain or
    /// the planner lacks headroom, [`StepResult::Done`] after the last
    /// segment and [`StepResult::NoOp`] when no arc is running.
    pub fn step<P: LinePlanner + ?Sized>(&mut self, planner: &mut P) -> StepResult {
        if self.run_state == RunState::Idle {
            return StepResult::NoOp;
        }
        if planner.buffers_available() < self.context.planner_headroom {
            return StepResult::Retry;
        }

        let theta = self.theta + self.segment_theta;
        let target = if self.segment_count <= 1 {
            // land exactly on the committed end point
            self.context.target
        } else {
            let mut target = self.context.target;
            target[self.axes.axis_0.index()] = self.center_0 + theta.sin() * self.radius;
            target[self.axes.axis_1.index()] = self.center_1 + theta.cos() * self.radius;
            let a2 = self.axes.axis_2.index();
            target[a2] = self.position[a2] + self.segment_linear_travel;
            target
        };

        if let Err(e) = planner.aline(self.context.line_move(target)) {
            warn!(
                "Arc segment {}/{} rejected by planner: {}",
                self.segments - self.segment_count + 1,
                self.segments,
                e
            );
            return StepResult::Retry;
        }

        self.theta = theta;
        self.position = target;
        self.segment_count -= 1;
        trace!(
            "Arc segment {}/{} to {:?}",
            self.segments - self.segment_count,
            self.segments,
            target
        );

        if self.segment_count > 0 {
            return StepResult::Retry;
        }
        self.run_state = RunState::Idle;
        debug!("Arc on line {} complete", self.context.line_number);
        StepResult::Done
    }

    /// Stop the arc, discarding remaining segments
    ///
    /// The position is left at the last emitted segment. Safe to call when
    /// no arc is running.
    pub fn abort(&mut self) {
        if self.is_running() {
            debug!(
                "Arc on line {} aborted with {} segments remaining",
                self.context.line_number, self.segment_count
            );
        }
        self.run_state = RunState::Idle;
        self.segment_count = 0;
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn plane_axes(&self) -> PlaneAxes {
        self.axes
    }

    /// Position after the last emitted segment
    pub fn position(&self) -> &AxisVector {
        &self.position
    }

    /// Center offset from the start position, indexed by linear axis
    pub fn offset(&self) -> [f64; 3] {
        self.offset
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Arc center in plane coordinates
    pub fn center(&self) -> (f64, f64) {
        (self.center_0, self.center_1)
    }

    /// Angle of the last emitted point
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Signed angular travel in radians, clockwise positive
    pub fn angular_travel(&self) -> f64 {
        self.angular_travel
    }

    /// Travel along the helix axis
    pub fn linear_travel(&self) -> f64 {
        self.linear_travel
    }

    /// Path length in mm
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Estimated time in minutes
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Segments still to be emitted
    pub fn segment_count(&self) -> u32 {
        self.segment_count
    }

    pub fn segment_theta(&self) -> f64 {
        self.segment_theta
    }

    pub fn segment_linear_travel(&self) -> f64 {
        self.segment_linear_travel
    }

    /// Context captured when the arc was prepared
    pub fn context(&self) -> &MotionContext {
        &self.context
    }
}

impl Default for ArcSession {
    fn default() -> Self {
        Self::new()
    }
}
