//! Canonical machine model
//!
//! Holds the G-code modal state, the model position (where the machine will
//! be once every queued move has run), the machine configuration and the
//! cycle state. Arc preparation reads a snapshot of this state and commits
//! the arc end point back into it.

use crate::soft_limits::SoftLimits;
use motionkit_core::{ArcError, Axis, AxisFlags, AxisVector, MotionMode, Plane, Units, AXES};
use motionkit_settings::Config;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// G-code modal state consumed by the motion core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GcodeModel {
    /// Line number of the command being executed (N word)
    pub line_number: u32,
    /// Motion mode - group 1
    pub motion_mode: MotionMode,
    /// Plane selection - group 2
    pub plane: Plane,
    /// Units mode - group 6
    pub units: Units,
    /// Feed rate in mm/min
    pub feed_rate: f64,
    /// Inverse time feed mode (G93)
    pub inverse_feed_rate_mode: bool,
    /// Move time in minutes when in inverse time mode
    pub inverse_feed_rate: f64,
    /// Work coordinate offsets in effect, mm
    pub work_offset: AxisVector,
}

impl Default for GcodeModel {
    fn default() -> Self {
        Self {
            line_number: 0,
            motion_mode: MotionMode::default(),
            plane: Plane::default(),
            units: Units::default(),
            feed_rate: 0.0,
            inverse_feed_rate_mode: false,
            inverse_feed_rate: 0.0,
            work_offset: [0.0; AXES],
        }
    }
}

/// Machine cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No cycle in progress
    Off,
    /// Motion cycle running
    Started,
}

/// Canonical machine
#[derive(Debug, Clone)]
pub struct CanonicalMachine {
    /// Machine configuration
    config: Config,
    /// Travel limits derived from `config`
    soft_limits: SoftLimits,
    /// G-code modal state
    model: GcodeModel,
    /// Model position in mm
    position: AxisVector,
    /// Cycle state
    cycle: CycleState,
}

impl CanonicalMachine {
    /// Create a machine at the origin with the given configuration
    pub fn new(config: Config) -> Self {
        let soft_limits = SoftLimits::from_config(&config);
        Self {
            config,
            soft_limits,
            model: GcodeModel::default(),
            position: [0.0; AXES],
            cycle: CycleState::Off,
        }
    }

    /// Machine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Soft limits in effect
    pub fn soft_limits(&self) -> &SoftLimits {
        &self.soft_limits
    }

    /// Mutable soft limits
    pub fn soft_limits_mut(&mut self) -> &mut SoftLimits {
        &mut self.soft_limits
    }

    /// G-code modal state
    pub fn model(&self) -> &GcodeModel {
        &self.model
    }

    /// Mutable G-code modal state
    pub fn model_mut(&mut self) -> &mut GcodeModel {
        &mut self.model
    }

    /// Model position
    pub fn position(&self) -> &AxisVector {
        &self.position
    }

    /// Set the model position, e.g. after homing
    pub fn set_position(&mut self, position: AxisVector) {
        self.position = position;
    }

    /// Cycle state
    pub fn cycle_state(&self) -> CycleState {
        self.cycle
    }

    /// Maximum feed rate of every axis
    pub fn feedrate_max(&self) -> AxisVector {
        let mut rates = [0.0; AXES];
        for axis in Axis::ALL {
            rates[axis.index()] = self.config.axes.get(axis).feedrate_max;
        }
        rates
    }

    /// Resolve a command target against the model position
    ///
    /// Axes named in the command take the commanded value; all others stay
    /// where they are.
    pub fn resolve_target(&self, target: &AxisVector, flags: &AxisFlags) -> AxisVector {
        let mut resolved = self.position;
        for (i, value) in target.iter().enumerate() {
            if flags[i] {
                resolved[i] = *value;
            }
        }
        resolved
    }

    /// Check a target against the soft limits
    pub fn test_soft_limits(&self, target: &AxisVector) -> Result<(), ArcError> {
        self.soft_limits.check(target)
    }

    /// Start a motion cycle if one is not already running
    pub fn cycle_start(&mut self) {
        if self.cycle == CycleState::Off {
            debug!("Cycle start");
            self.cycle = CycleState::Started;
        }
    }

    /// End the motion cycle
    pub fn cycle_end(&mut self) {
        if self.cycle == CycleState::Started {
            debug!("Cycle end");
            self.cycle = CycleState::Off;
        }
    }

    /// Commit a successfully planned move end point as the model position
    pub fn set_model_position(&mut self, target: &AxisVector) {
        self.position = *target;
    }
}
