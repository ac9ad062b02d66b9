//! Fixed-timestep frame clock
//!
//! Wall-clock time goes into an accumulator once per frame; the host then
//! drains it in `SIM_DT_US` slices. Long stalls are capped so the simulation
//! never tries to catch up more than `MAX_SUBSTEPS` steps in one frame.

use std::time::Instant;

use crate::consts::{MAX_SUBSTEPS, SIM_DT_US};

pub struct FrameClock {
    pub fixed_dt_us: u64,
    accumulator_us: u64,
    last_instant: Instant,
    pub steps_this_frame: u32,
    pub frame_count: u64,
    /// Total wall time fed in, after capping (microseconds)
    pub total_us: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            fixed_dt_us: SIM_DT_US,
            accumulator_us: 0,
            last_instant: Instant::now(),
            steps_this_frame: 0,
            frame_count: 0,
            total_us: 0,
        }
    }

    /// Longest frame the accumulator will accept
    pub fn max_frame_us(&self) -> u64 {
        self.fixed_dt_us * MAX_SUBSTEPS as u64
    }

    /// Measure the wall-clock delta since the previous frame
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt_us = now.duration_since(self.last_instant).as_micros() as u64;
        self.last_instant = now;
        self.feed(real_dt_us);
    }

    /// Start a frame with an explicit delta
    pub fn feed(&mut self, real_dt_us: u64) {
        let max = self.max_frame_us();
        let dt_us = if real_dt_us > max {
            log::warn!(
                "Frame took {:.1}ms, capping to {}ms",
                real_dt_us as f64 / 1000.0,
                max / 1000
            );
            max
        } else {
            real_dt_us
        };

        self.accumulator_us += dt_us;
        self.total_us += dt_us;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    /// True while another fixed step is due this frame
    pub fn should_step(&mut self) -> bool {
        if self.accumulator_us >= self.fixed_dt_us && self.steps_this_frame < MAX_SUBSTEPS {
            self.accumulator_us -= self.fixed_dt_us;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
