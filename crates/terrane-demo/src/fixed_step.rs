//! Fixed-timestep driver for the streaming loop.
//!
//! Wall-clock time is accumulated and consumed in fixed 60 Hz steps, so the
//! observer moves the same way regardless of how long streaming work takes.

use std::time::Instant;

use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longer frames are clamped to this, trading slowdown for a bounded step count.
pub const MAX_FRAME_TIME: f64 = 0.25;

pub struct FixedStep {
    previous_time: Instant,
    accumulator: f64,
    total_sim_time: f64,
    step_count: u64,
}

impl FixedStep {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            total_sim_time: 0.0,
            step_count: 0,
        }
    }

    /// Measures the time since the previous call and runs the steps it covers.
    ///
    /// `update_fn(fixed_dt, total_sim_time)` is called zero or more times.
    pub fn tick(&mut self, update_fn: impl FnMut(f64, f64)) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(frame_time, update_fn)
    }

    /// Runs the steps covered by an explicit `frame_time` in seconds.
    pub fn advance(&mut self, mut frame_time: f64, mut update_fn: impl FnMut(f64, f64)) -> u32 {
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }
        self.accumulator += frame_time.max(0.0);

        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT, self.total_sim_time);
            self.total_sim_time += FIXED_DT;
            self.accumulator -= FIXED_DT;
            self.step_count += 1;
            steps += 1;
        }
        steps
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new()
    }
}
