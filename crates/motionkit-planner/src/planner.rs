//! Line planner interface and buffered planner queue
//!
//! Arcs reach the motion system as a run of short straight moves. The
//! [`LinePlanner`] trait is the seam to whatever schedules those moves;
//! [`PlannerQueue`] is a bounded in-memory implementation with the same
//! buffer accounting a firmware planner pool has.
//!
//! # Features
//! - Fixed buffer pool with free-buffer query for flow control
//! - Move validation before queueing
//! - FIFO draining by the consumer

use motionkit_core::{AxisVector, MotionMode, PlannerError};
use motionkit_settings::PlannerSettings;
use std::collections::VecDeque;
use tracing::trace;

/// A single straight move handed to the line planner
#[derive(Debug, Clone, PartialEq)]
pub struct LineMove {
    /// Absolute end position of the move, all axes, mm
    pub target: AxisVector,
    /// Duration of this move in minutes
    pub move_time: f64,
    /// Feed rate in effect, mm/min
    pub feed_rate: f64,
    /// Whether the feed rate was given in inverse time (G93)
    pub inverse_feed_rate_mode: bool,
    /// Motion mode of the originating command
    pub motion_mode: MotionMode,
    /// Line number of the originating command
    pub line_number: u32,
}

/// Downstream consumer of straight line moves
pub trait LinePlanner {
    /// Number of free move buffers
    fn buffers_available(&self) -> usize;

    /// Queue one move
    fn aline(&mut self, line: LineMove) -> Result<(), PlannerError>;
}

/// Bounded FIFO of planned moves
#[derive(Debug, Clone)]
pub struct PlannerQueue {
    /// Queued moves awaiting execution
    moves: VecDeque<LineMove>,
    /// Number of buffers in the pool
    capacity: usize,
    /// Moves accepted since creation
    total_queued: u64,
}

impl PlannerQueue {
    /// Create a queue with `capacity` buffers
    pub fn new(capacity: usize) -> Self {
        Self {
            moves: VecDeque::with_capacity(capacity),
            capacity,
            total_queued: 0,
        }
    }

    /// Create a queue sized from planner settings
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self::new(settings.buffer_pool_size)
    }

    /// Total number of buffers
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued moves
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether no moves are queued
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Moves accepted since creation
    pub fn total_queued(&self) -> u64 {
        self.total_queued
    }

    /// Take the oldest queued move, freeing its buffer
    pub fn pop_move(&mut self) -> Option<LineMove> {
        self.moves.pop_front()
    }
}

impl LinePlanner for PlannerQueue {
    fn buffers_available(&self) -> usize {
        self.capacity.saturating_sub(self.moves.len())
    }

    fn aline(&mut self, line: LineMove) -> Result<(), PlannerError> {
        if self.moves.len() >= self.capacity {
            return Err(PlannerError::BufferFull {
                capacity: self.capacity,
            });
        }
        if let Some(value) = line.target.iter().find(|v| !v.is_finite()) {
            return Err(PlannerError::InvalidMove {
                reason: format!("non-finite target coordinate {}", value),
            });
        }
        if !line.move_time.is_finite() || line.move_time < 0.0 {
            return Err(PlannerError::InvalidMove {
                reason: format!("bad move time {}", line.move_time),
            });
        }

        trace!(
            "Queued move to {:?} in {:.6} min ({} free)",
            line.target,
            line.move_time,
            self.buffers_available() - 1
        );
        self.moves.push_back(line);
        self.total_queued += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x: f64) -> LineMove {
        LineMove {
            target: [x, 0.0, 0.0, 0.0, 0.0, 0.0],
            move_time: 0.01,
            feed_rate: 600.0,
            inverse_feed_rate_mode: false,
            motion_mode: MotionMode::Linear,
            line_number: 1,
        }
    }

    #[test]
    fn test_buffer_accounting() {
        let mut queue = PlannerQueue::new(3);
        assert_eq!(queue.buffers_available(), 3);

        queue.aline(line(1.0)).unwrap();
        queue.aline(line(2.0)).unwrap();
        assert_eq!(queue.buffers_available(), 1);
        assert_eq!(queue.len(), 2);

        let first = queue.pop_move().unwrap();
        assert_eq!(first.target[0], 1.0);
        assert_eq!(queue.buffers_available(), 2);
        assert_eq!(queue.total_queued(), 2);
    }

    #[test]
    fn test_full_queue_rejects() {
        let mut queue = PlannerQueue::new(1);
        queue.aline(line(1.0)).unwrap();
        assert_eq!(
            queue.aline(line(2.0)),
            Err(PlannerError::BufferFull { capacity: 1 })
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_invalid_move_rejected() {
        let mut queue = PlannerQueue::new(4);
        assert!(matches!(
            queue.aline(line(f64::NAN)),
            Err(PlannerError::InvalidMove { .. })
        ));

        let mut bad_time = line(1.0);
        bad_time.move_time = -1.0;
        assert!(queue.aline(bad_time).is_err());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_from_settings() {
        let queue = PlannerQueue::from_settings(&PlannerSettings::default());
        assert_eq!(queue.capacity(), 28);
    }
}
