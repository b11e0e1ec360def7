//! motionkit Settings Crate
//!
//! Handles machine configuration: arc segmentation, planner buffers,
//! per-axis limits, and their persistence to JSON or TOML files.

pub mod config;
pub mod error;

pub use config::{ArcSettings, AxesSettings, AxisSettings, Config, PlannerSettings, SoftLimitSettings};
pub use error::{SettingsError, SettingsResult};
