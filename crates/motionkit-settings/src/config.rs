//! Machine configuration for motionkit
//!
//! Provides configuration file handling, defaults, and validation.
//! Supports JSON and TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - Arc settings (chordal tolerance, minimum segment length and time)
//! - Planner settings (buffer pool size, headroom kept free for arcs)
//! - Per-axis settings (maximum feed rate, travel range)
//! - Soft limit enable

use crate::error::{SettingsError, SettingsResult};
use motionkit_core::Axis;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Arc segmentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcSettings {
    /// Maximum deviation between a segment chord and the true arc, in mm
    pub chordal_tolerance: f64,
    /// Shortest segment an arc may be cut into, in mm
    pub min_segment_length: f64,
    /// Shortest time a segment may take, in microseconds
    pub min_segment_time_us: f64,
}

impl Default for ArcSettings {
    fn default() -> Self {
        Self {
            chordal_tolerance: 0.01,
            min_segment_length: 0.1,
            min_segment_time_us: 10_000.0,
        }
    }
}

/// Line planner buffer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Number of move buffers in the planner queue
    pub buffer_pool_size: usize,
    /// Free buffers required before an arc segment is queued
    pub buffer_headroom: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            buffer_pool_size: 28,
            buffer_headroom: 4,
        }
    }
}

/// Settings for a single axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSettings {
    /// Maximum feed rate in mm/min (degrees/min for rotary axes)
    pub feedrate_max: f64,
    /// Minimum soft travel limit
    pub travel_min: f64,
    /// Maximum soft travel limit; equal to `travel_min` disables the limit
    pub travel_max: f64,
}

impl AxisSettings {
    fn linear(feedrate_max: f64, travel_min: f64, travel_max: f64) -> Self {
        Self {
            feedrate_max,
            travel_min,
            travel_max,
        }
    }

    fn rotary(feedrate_max: f64) -> Self {
        Self {
            feedrate_max,
            travel_min: 0.0,
            travel_max: 0.0,
        }
    }

    /// Whether this axis has a usable travel range
    pub fn has_travel_limits(&self) -> bool {
        self.travel_max > self.travel_min
    }
}

/// Per-axis settings for all six axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesSettings {
    pub x: AxisSettings,
    pub y: AxisSettings,
    pub z: AxisSettings,
    pub a: AxisSettings,
    pub b: AxisSettings,
    pub c: AxisSettings,
}

impl AxesSettings {
    /// Settings for one axis
    pub fn get(&self, axis: Axis) -> &AxisSettings {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::A => &self.a,
            Axis::B => &self.b,
            Axis::C => &self.c,
        }
    }

    /// Mutable settings for one axis
    pub fn get_mut(&mut self, axis: Axis) -> &mut AxisSettings {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
            Axis::A => &mut self.a,
            Axis::B => &mut self.b,
            Axis::C => &mut self.c,
        }
    }
}

impl Default for AxesSettings {
    fn default() -> Self {
        Self {
            x: AxisSettings::linear(5000.0, 0.0, 220.0),
            y: AxisSettings::linear(5000.0, 0.0, 220.0),
            z: AxisSettings::linear(1200.0, -100.0, 0.0),
            a: AxisSettings::rotary(36000.0),
            b: AxisSettings::rotary(36000.0),
            c: AxisSettings::rotary(36000.0),
        }
    }
}

/// Soft limit settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftLimitSettings {
    /// Check move targets against axis travel ranges
    pub enabled: bool,
}

/// Complete machine configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Arc segmentation settings
    #[serde(default)]
    pub arc: ArcSettings,
    /// Planner buffer settings
    #[serde(default)]
    pub planner: PlannerSettings,
    /// Soft limit settings
    #[serde(default)]
    pub soft_limits: SoftLimitSettings,
    /// Per-axis settings
    #[serde(default)]
    pub axes: AxesSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location in the platform config directory
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("motionkit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("platform config directory not found".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            Some("toml") => toml::from_str(&std::fs::read_to_string(path)?)?,
            _ => {
                return Err(SettingsError::LoadError(
                    "Config file must be .json or .toml".to_string(),
                ))
            }
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => {
                return Err(SettingsError::SaveError(
                    "Config file must be .json or .toml".to_string(),
                ))
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        // Arc settings
        if !is_positive(self.arc.chordal_tolerance) {
            return Err(SettingsError::invalid("arc.chordal_tolerance", "must be > 0"));
        }
        if !is_positive(self.arc.min_segment_length) {
            return Err(SettingsError::invalid("arc.min_segment_length", "must be > 0"));
        }
        if !is_positive(self.arc.min_segment_time_us) {
            return Err(SettingsError::invalid("arc.min_segment_time_us", "must be > 0"));
        }

        // Planner settings
        if self.planner.buffer_pool_size == 0 {
            return Err(SettingsError::invalid("planner.buffer_pool_size", "must be > 0"));
        }
        if self.planner.buffer_headroom >= self.planner.buffer_pool_size {
            return Err(SettingsError::invalid(
                "planner.buffer_headroom",
                "must be smaller than the buffer pool size",
            ));
        }

        // Axis settings
        for axis in Axis::ALL {
            let settings = self.axes.get(axis);
            if !is_positive(settings.feedrate_max) {
                return Err(SettingsError::invalid(
                    format!("axes.{}.feedrate_max", axis.to_string().to_lowercase()),
                    "must be > 0",
                ));
            }
            if settings.travel_min > settings.travel_max {
                return Err(SettingsError::invalid(
                    format!("axes.{}.travel_min", axis.to_string().to_lowercase()),
                    "must not exceed travel_max",
                ));
            }
        }

        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
