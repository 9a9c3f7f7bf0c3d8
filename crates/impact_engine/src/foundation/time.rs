//! Simulation time management
//!
//! The collision core never reads ambient wall-clock state. The driving
//! world advances a [`SimulationClock`] once per fixed step and passes it
//! into every body operation, which keeps stepping deterministic and
//! testable without a live loop.

/// Fixed-step simulation clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    time_step: f32,
    current_time: f32,
    step_count: u64,
}

impl SimulationClock {
    /// Create a clock with the given fixed time step, in seconds
    pub fn new(time_step: f32) -> Self {
        Self {
            time_step,
            current_time: 0.0,
            step_count: 0,
        }
    }

    /// Advance the clock by one fixed step
    pub fn advance(&mut self) {
        self.current_time += self.time_step;
        self.step_count += 1;
    }

    /// Get the fixed step duration in seconds
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Get the monotonically increasing simulation time in seconds
    pub fn now(&self) -> f32 {
        self.current_time
    }

    /// Get the number of steps taken so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Seconds of simulation time elapsed since `stamp`
    pub fn elapsed_since(&self, stamp: f32) -> f32 {
        self.current_time - stamp
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
