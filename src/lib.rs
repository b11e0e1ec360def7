//! # motionkit
//!
//! Arc motion planning for CNC controllers. Circular and helical G2/G3
//! moves are expanded into short straight segments for a line planner,
//! one segment per call so the control loop is never blocked.
//!
//! ## Architecture
//!
//! motionkit is organized as a workspace with multiple crates:
//!
//! 1. **motionkit-core** - Axes, planes, modes, units, constants, error types
//! 2. **motionkit-settings** - Machine configuration and its TOML/JSON persistence
//! 3. **motionkit-planner** - Canonical machine, soft limits, planner queue, arcs
//! 4. **motionkit** - G-code block reader, program runner and the CLI binary
//!
//! ## Features
//!
//! - **Center and radius format arcs** in the XY, XZ and YZ planes
//! - **Helical motion** along the axis normal to the arc plane
//! - **Segmentation** bounded by chordal tolerance, segment length and segment time
//! - **Inverse time feed** (G93) and inch units (G20)
//! - **Soft limits** checked before an arc is committed

pub mod gcode;
pub mod runner;

pub use motionkit_core::{
    ArcError, Axis, AxisFlags, AxisVector, Error, MotionMode, Plane, PlannerError, Result, Units,
    AXES,
};
pub use motionkit_planner::{
    ArcCommand, ArcSession, CanonicalMachine, LineMove, LinePlanner, PlannerQueue, RunState,
    StepResult,
};
pub use motionkit_settings::Config;

pub use gcode::{format_move, parse_block, Block, ParseError};
pub use runner::{RunStats, Runner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout for emitted moves
/// - RUST_LOG environment variable support, `info` when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
