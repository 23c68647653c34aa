//! Phase timers.
//!
//! A `Timer` measures one phase of a run (load, build, evaluate, save) and
//! reports the elapsed time through `tracing` when stopped.

use std::time::Instant;

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

    /// Elapsed seconds without stopping.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer, log the phase duration and return it in seconds.
    pub fn stop(self) -> f64 {
        let elapsed = self.elapsed_s();
        tracing::debug!(phase = self.label, elapsed_s = elapsed, "phase finished");
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_is_monotonic() {
        let t = Timer::start("test");
        let a = t.elapsed_s();
        let b = t.stop();
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
