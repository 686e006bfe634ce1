//! Lightweight performance timing utilities.
//!
//! Timers are plain values owned by whoever runs the work; results are
//! reported through `tracing` rather than stdout.

use std::time::Instant;

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Elapsed time in seconds without stopping.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and return elapsed time in seconds.
    pub fn stop(self) -> f64 {
        self.elapsed()
    }

    /// Stop the timer, emit a debug event and return elapsed seconds.
    pub fn stop_and_log(self) -> f64 {
        let elapsed = self.elapsed();
        tracing::debug!(phase = self.label, elapsed_s = elapsed, "phase finished");
        elapsed
    }
}

/// Wall-clock breakdown of one solver run.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunTimings {
    pub assembly_s: f64,
    pub steady_solve_s: f64,
    pub wake_s: f64,
    pub kutta_s: f64,
    pub post_s: f64,
    pub steps: usize,
}

impl RunTimings {
    pub fn total_s(&self) -> f64 {
        self.assembly_s + self.steady_solve_s + self.wake_s + self.kutta_s + self.post_s
    }

    /// Average wall time of one unsteady step (wake + Kutta solve).
    pub fn average_step_s(&self) -> f64 {
        if self.steps > 0 {
            (self.wake_s + self.kutta_s) / self.steps as f64
        } else {
            0.0
        }
    }

    /// Emit a formatted summary at info level.
    pub fn log_summary(&self) {
        tracing::info!(
            assembly_s = self.assembly_s,
            steady_solve_s = self.steady_solve_s,
            wake_s = self.wake_s,
            kutta_s = self.kutta_s,
            post_s = self.post_s,
            steps = self.steps,
            avg_step_s = self.average_step_s(),
            "run timing summary"
        );
    }
}
