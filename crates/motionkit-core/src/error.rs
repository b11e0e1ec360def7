//! Error handling for motionkit
//!
//! Provides error types for each layer of the motion core:
//! - Arc errors (arc command preparation and geometry)
//! - Planner errors (line segment queue submission)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::data::Axis;
use thiserror::Error;

/// Arc error type
///
/// Every failure an arc command can produce while it is being prepared.
/// None of these leave an arc armed for execution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArcError {
    /// Feed rate is zero and inverse time mode is off
    #[error("Feed rate is zero and inverse time mode is not active")]
    FeedRate,

    /// Arc geometry leaves the start or end angle undefined
    #[error("Arc specification error: {reason}")]
    ArcSpecification {
        /// What made the geometry degenerate.
        reason: String,
    },

    /// Requested radius cannot span the chord between start and end points
    #[error("Arc radius {radius:.4} is smaller than half the chord length {half_chord:.4}")]
    FloatingPoint {
        /// The requested radius in millimeters.
        radius: f64,
        /// Half the distance between current and target position.
        half_chord: f64,
    },

    /// Arc path is shorter than the minimum segment length
    #[error("Arc length {length:.4}mm is below the minimum segment length {minimum:.4}mm")]
    MinimumLengthMove {
        /// The computed path length in millimeters.
        length: f64,
        /// The configured minimum segment length.
        minimum: f64,
    },

    /// Arc end point violates a configured travel limit
    #[error("Soft limit exceeded on {axis}: {value:.3} outside [{min:.3}, {max:.3}]")]
    SoftLimit {
        /// The axis that exceeded its travel range.
        axis: Axis,
        /// The offending target value.
        value: f64,
        /// Configured minimum travel.
        min: f64,
        /// Configured maximum travel.
        max: f64,
    },

    /// Another arc is still being executed
    #[error("An arc is already in progress")]
    Busy,
}

impl ArcError {
    /// Create an arc specification error from a reason
    pub fn specification(reason: impl Into<String>) -> Self {
        ArcError::ArcSpecification {
            reason: reason.into(),
        }
    }
}

/// Planner error type
///
/// Raised by a downstream line planner when it cannot accept a segment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// No free buffer for the move
    #[error("Planner buffer full ({capacity} buffers in use)")]
    BufferFull {
        /// Total number of planner buffers.
        capacity: usize,
    },

    /// The move carries a non-finite coordinate or time
    #[error("Invalid move: {reason}")]
    InvalidMove {
        /// Why the move was refused.
        reason: String,
    },
}

/// Main error type for motionkit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Arc preparation error
    #[error(transparent)]
    Arc(#[from] ArcError),

    /// Planner error
    #[error(transparent)]
    Planner(#[from] PlannerError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is an arc error
    pub fn is_arc_error(&self) -> bool {
        matches!(self, Error::Arc(_))
    }

    /// Check if this is a soft limit violation
    pub fn is_soft_limit(&self) -> bool {
        matches!(self, Error::Arc(ArcError::SoftLimit { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
