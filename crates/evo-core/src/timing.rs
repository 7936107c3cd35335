//! Lightweight wall-clock timing.
//!
//! Timers report through `tracing` at debug level, so they cost nothing
//! beyond an `Instant::now()` unless a subscriber asks for them.

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

    /// Elapsed time in seconds.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer, log the result and return the elapsed seconds.
    pub fn stop_and_log(self, work_items: usize) -> f64 {
        let elapsed = self.elapsed_s();
        tracing::debug!(
            label = self.label,
            elapsed_s = elapsed,
            work_items,
            "timing"
        );
        elapsed
    }
}
