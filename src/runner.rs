//! Program runner
//!
//! Executes parsed blocks against the canonical machine. Straight moves go
//! to the planner queue directly; arcs are prepared once and then stepped
//! until done. Whenever the arc cannot make progress the oldest queued move
//! is handed to the output sink, which stands in for the motion executor
//! freeing a buffer.

use crate::gcode::Block;
use motionkit_core::constants::fp_zero;
use motionkit_core::units::format_length;
use motionkit_core::{Axis, AxisFlags, AxisVector, Error, MotionMode, PlannerError, Result, AXES};
use motionkit_planner::{
    ArcCommand, ArcSession, CanonicalMachine, LineMove, LinePlanner, PlannerQueue, StepResult,
};
use motionkit_settings::Config;
use tracing::{debug, info};

/// Counters for an executed program
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    /// Blocks executed
    pub blocks: usize,
    /// Arcs prepared and completed
    pub arcs: usize,
    /// Segments emitted for arcs
    pub arc_segments: u64,
    /// Straight G0/G1 moves
    pub straight_moves: usize,
    /// Total path length in mm
    pub distance: f64,
}

/// Drives the machine, arc session and planner queue for a program
#[derive(Debug, Clone)]
pub struct Runner {
    machine: CanonicalMachine,
    arc: ArcSession,
    queue: PlannerQueue,
    stats: RunStats,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        let queue = PlannerQueue::from_settings(&config.planner);
        Self {
            machine: CanonicalMachine::new(config),
            arc: ArcSession::new(),
            queue,
            stats: RunStats::default(),
        }
    }

    pub fn machine(&self) -> &CanonicalMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut CanonicalMachine {
        &mut self.machine
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Execute one block, handing completed moves to `sink`
    pub fn execute<F>(&mut self, block: &Block, sink: &mut F) -> Result<()>
    where
        F: FnMut(LineMove) -> std::io::Result<()>,
    {
        self.stats.blocks += 1;
        self.apply_modal(block)?;

        let mode = self.machine.model().motion_mode;
        if mode.is_arc() {
            // bare arc-mode blocks still get the feed rate check
            self.run_arc(block, mode, sink)?;
        } else if block.has_axis_words() {
            self.straight_move(block, mode, sink)?;
        }
        Ok(())
    }

    /// Flush every queued move and end the cycle
    pub fn finish<F>(&mut self, sink: &mut F) -> Result<()>
    where
        F: FnMut(LineMove) -> std::io::Result<()>,
    {
        while self.drain_one(sink)? {}
        self.machine.cycle_end();
        debug!("Planner accepted {} moves", self.queue.total_queued());

        let stats = self.stats;
        info!(
            "Program complete: {} blocks, {} arcs in {} segments, {} straight moves, path {} {}",
            stats.blocks,
            stats.arcs,
            stats.arc_segments,
            stats.straight_moves,
            format_length(stats.distance, self.machine.model().units),
            self.machine.model().units
        );
        Ok(())
    }

    fn apply_modal(&mut self, block: &Block) -> Result<()> {
        let model = self.machine.model_mut();
        if let Some(line_number) = block.line_number {
            model.line_number = line_number;
        }
        if let Some(units) = block.units {
            model.units = units;
        }
        if let Some(plane) = block.plane {
            model.plane = plane;
        }
        if let Some(inverse_time) = block.inverse_time {
            model.inverse_feed_rate_mode = inverse_time;
        }
        if let Some(mode) = block.motion_mode {
            model.motion_mode = mode;
        }

        if let Some(f) = block.f {
            if model.inverse_feed_rate_mode {
                // G93 F is moves per minute
                if f <= 0.0 {
                    return Err(Error::other(format!(
                        "inverse time feed rate must be positive, got F{}",
                        f
                    )));
                }
                model.inverse_feed_rate = 1.0 / f;
            } else {
                if f < 0.0 {
                    return Err(Error::other(format!("negative feed rate F{}", f)));
                }
                model.feed_rate = model.units.to_millimeters(f);
            }
        }
        Ok(())
    }

    /// Axis words in mm (degrees for rotary axes) with work offsets applied
    fn command_target(&self, block: &Block) -> (AxisVector, AxisFlags) {
        let model = self.machine.model();
        let mut target = [0.0; AXES];
        let mut flags = [false; AXES];
        for axis in Axis::ALL {
            let i = axis.index();
            if let Some(value) = block.axes[i] {
                let value = if axis.is_linear() {
                    model.units.to_millimeters(value)
                } else {
                    value
                };
                target[i] = value + model.work_offset[i];
                flags[i] = true;
            }
        }
        (target, flags)
    }

    fn run_arc<F>(&mut self, block: &Block, mode: MotionMode, sink: &mut F) -> Result<()>
    where
        F: FnMut(LineMove) -> std::io::Result<()>,
    {
        let (target, axis_flags) = self.command_target(block);
        let command = ArcCommand {
            target,
            axis_flags,
            i: block.i.unwrap_or(0.0),
            j: block.j.unwrap_or(0.0),
            k: block.k.unwrap_or(0.0),
            radius: block.r.unwrap_or(0.0),
            motion_mode: mode,
        };

        self.arc.prepare(&mut self.machine, &command)?;
        if !self.arc.is_running() {
            return Ok(());
        }

        loop {
            let remaining = self.arc.segment_count();
            match self.arc.step(&mut self.queue) {
                StepResult::Done => break,
                StepResult::NoOp => return Ok(()),
                StepResult::Retry if self.arc.segment_count() < remaining => {}
                StepResult::Retry => {
                    if !self.drain_one(sink)? {
                        let line = self.arc.context().line_number;
                        self.arc.abort();
                        return Err(Error::other(format!(
                            "planner refused arc segment on line {} with an empty queue",
                            line
                        )));
                    }
                }
            }
        }

        self.stats.arcs += 1;
        self.stats.arc_segments += u64::from(self.arc.segments());
        self.stats.distance += self.arc.length();
        Ok(())
    }

    fn straight_move<F>(&mut self, block: &Block, mode: MotionMode, sink: &mut F) -> Result<()>
    where
        F: FnMut(LineMove) -> std::io::Result<()>,
    {
        let (target, flags) = self.command_target(block);
        let target = self.machine.resolve_target(&target, &flags);
        let start = *self.machine.position();
        let model = *self.machine.model();
        let feedrate_max = self.machine.feedrate_max();

        let distance = Axis::ALL
            .iter()
            .filter(|axis| axis.is_linear())
            .map(|axis| (target[axis.index()] - start[axis.index()]).powi(2))
            .sum::<f64>()
            .sqrt();

        if target
            .iter()
            .zip(start.iter())
            .all(|(end, begin)| fp_zero(end - begin))
        {
            debug!("Zero length move on line {} skipped", model.line_number);
            return Ok(());
        }

        // slowest single axis bounds every move
        let mut move_time = 0.0_f64;
        for ((end, begin), rate) in target.iter().zip(start.iter()).zip(feedrate_max.iter()) {
            if *rate > 0.0 {
                move_time = move_time.max((end - begin).abs() / rate);
            }
        }

        if mode == MotionMode::Linear {
            if model.inverse_feed_rate_mode {
                move_time = move_time.max(model.inverse_feed_rate);
            } else if fp_zero(model.feed_rate) {
                return Err(Error::other(format!(
                    "feed rate is zero for G1 on line {}",
                    model.line_number
                )));
            } else {
                move_time = move_time.max(distance / model.feed_rate);
            }
        }

        self.machine.test_soft_limits(&target)?;
        while self.queue.buffers_available() == 0 {
            if !self.drain_one(sink)? {
                return Err(PlannerError::BufferFull {
                    capacity: self.queue.capacity(),
                }
                .into());
            }
        }
        self.queue.aline(LineMove {
            target,
            move_time,
            feed_rate: model.feed_rate,
            inverse_feed_rate_mode: model.inverse_feed_rate_mode,
            motion_mode: mode,
            line_number: model.line_number,
        })?;

        self.machine.cycle_start();
        self.machine.set_model_position(&target);
        self.stats.straight_moves += 1;
        self.stats.distance += distance;
        Ok(())
    }

    /// Hand the oldest queued move to the sink; false when the queue is empty
    fn drain_one<F>(&mut self, sink: &mut F) -> Result<bool>
    where
        F: FnMut(LineMove) -> std::io::Result<()>,
    {
        match self.queue.pop_move() {
            Some(line) => {
                sink(line)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::parse_block;
    use motionkit_core::{ArcError, Units};
    use motionkit_planner::CycleState;

    fn run_program(runner: &mut Runner, program: &str) -> Result<Vec<LineMove>> {
        let mut emitted = Vec::new();
        let mut sink = |line: LineMove| -> std::io::Result<()> {
            emitted.push(line);
            Ok(())
        };
        for text in program.lines() {
            let block = parse_block(text).unwrap();
            runner.execute(&block, &mut sink)?;
        }
        runner.finish(&mut sink)?;
        Ok(emitted)
    }

    #[test]
    fn test_half_circle_program() {
        let mut runner = Runner::new(Config::new());
        let lines = run_program(&mut runner, "G21 G17 F600\nG2 X10 Y0 I5 J0").unwrap();

        assert_eq!(lines.len(), 24);
        assert_eq!(lines.last().unwrap().target[..3], [10.0, 0.0, 0.0]);
        let stats = runner.stats();
        assert_eq!(stats.arcs, 1);
        assert_eq!(stats.arc_segments, 24);
        assert_eq!(runner.machine().cycle_state(), CycleState::Off);
    }

    #[test]
    fn test_moves_emitted_in_order() {
        let mut runner = Runner::new(Config::new());
        let program = "G0 X10 Y10\nG1 X20 F1000\nG3 X20 Y30 J10\nG1 Y40";
        let lines = run_program(&mut runner, program).unwrap();

        assert_eq!(lines[0].target[..2], [10.0, 10.0]);
        assert_eq!(lines[0].motion_mode, MotionMode::Rapid);
        assert_eq!(lines[1].target[..2], [20.0, 10.0]);
        let last = lines.last().unwrap();
        assert_eq!(last.target[..2], [20.0, 40.0]);
        assert_eq!(runner.stats().straight_moves, 3);
        assert!(lines
            .iter()
            .filter(|line| line.motion_mode == MotionMode::CounterClockwiseArc)
            .all(|line| line.target[0] >= 20.0 - 1e-9));
    }

    #[test]
    fn test_inch_program() {
        let mut runner = Runner::new(Config::new());
        let lines = run_program(&mut runner, "G20 F10\nG2 X1 I0.5").unwrap();

        let last = lines.last().unwrap();
        assert!((last.target[0] - 25.4).abs() < 1e-9);
        assert!((last.feed_rate - 254.0).abs() < 1e-9);
        assert_eq!(runner.machine().model().units, Units::Inches);
    }

    #[test]
    fn test_zero_feed_arc_fails() {
        let mut runner = Runner::new(Config::new());
        let err = run_program(&mut runner, "G2 X10 I5").unwrap_err();
        assert!(matches!(err, Error::Arc(ArcError::FeedRate)));
    }

    #[test]
    fn test_modal_only_block_in_arc_mode() {
        let mut runner = Runner::new(Config::new());
        let lines = run_program(&mut runner, "F300\nG2\nG18\nF400").unwrap();
        assert!(lines.is_empty());
        assert_eq!(runner.machine().model().feed_rate, 400.0);
        assert_eq!(runner.stats().arcs, 0);
    }

    #[test]
    fn test_bare_arc_mode_block_needs_feed() {
        let mut runner = Runner::new(Config::new());
        let err = run_program(&mut runner, "G2").unwrap_err();
        assert!(matches!(err, Error::Arc(ArcError::FeedRate)));
    }

    #[test]
    fn test_short_straight_move_committed() {
        let mut runner = Runner::new(Config::new());
        let lines = run_program(&mut runner, "F600\nG1 X0.04").unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].target[0], 0.04);
        assert!((lines[0].move_time - 0.04 / 600.0).abs() < 1e-12);
        assert_eq!(runner.machine().position()[0], 0.04);
    }

    #[test]
    fn test_short_rapid_then_arc_starts_from_it() {
        let mut runner = Runner::new(Config::new());
        let lines = run_program(&mut runner, "F600\nG0 X0.02\nG2 X10.02 I5").unwrap();

        assert_eq!(lines[0].motion_mode, MotionMode::Rapid);
        assert_eq!(lines[0].target[0], 0.02);
        assert_eq!(lines.last().unwrap().target[0], 10.02);
    }

    #[test]
    fn test_zero_length_move_skipped() {
        let mut runner = Runner::new(Config::new());
        let lines = run_program(&mut runner, "F600\nG1 X0 Y0").unwrap();
        assert!(lines.is_empty());
        assert_eq!(runner.stats().straight_moves, 0);
    }

    #[test]
    fn test_empty_buffer_pool_fails() {
        let mut config = Config::new();
        config.planner.buffer_pool_size = 0;
        config.planner.buffer_headroom = 0;
        let mut runner = Runner::new(config);

        let err = run_program(&mut runner, "G0 X10").unwrap_err();
        assert!(matches!(
            err,
            Error::Planner(PlannerError::BufferFull { capacity: 0 })
        ));
        assert_eq!(runner.machine().position()[0], 0.0);

        let err = run_program(&mut runner, "F600\nG2 X10 I5").unwrap_err();
        assert!(err.to_string().contains("empty queue"));
    }

    #[test]
    fn test_inverse_time_arc() {
        let mut runner = Runner::new(Config::new());
        let lines = run_program(&mut runner, "G93\nG2 X10 I5 F2").unwrap();
        let total: f64 = lines.iter().map(|line| line.move_time).sum();
        assert!((total - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_long_arc_uses_queue_backpressure() {
        let mut config = Config::new();
        config.planner.buffer_pool_size = 6;
        config.planner.buffer_headroom = 2;
        let mut runner = Runner::new(config);
        let lines = run_program(&mut runner, "F600\nG2 X100 I50").unwrap();
        assert!(lines.len() > 6);
        assert_eq!(lines.last().unwrap().target[0], 100.0);
    }
}
