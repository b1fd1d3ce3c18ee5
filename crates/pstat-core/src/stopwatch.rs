/// Stopwatch: elapsed-time measurement for throughput reports.
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
    /// Frozen elapsed time once [`Stopwatch::stop`] has been called.
    stopped: Option<Duration>,
}

impl Stopwatch {
    /// A stopwatch that is already running.
    pub fn start_new() -> Self {
        Self {
            start: Instant::now(),
            stopped: None,
        }
    }

    /// Reset to zero and start running again.
    pub fn restart(&mut self) {
        self.start = Instant::now();
        self.stopped = None;
    }

    /// Freeze the elapsed time and return it. Later calls return the same value.
    pub fn stop(&mut self) -> Duration {
        *self.stopped.get_or_insert_with(|| self.start.elapsed())
    }

    /// Time since start, or the frozen value if stopped.
    pub fn elapsed(&self) -> Duration {
        self.stopped.unwrap_or_else(|| self.start.elapsed())
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// `count` per second over the elapsed time; 0.0 if no time has passed.
    pub fn rate(&self, count: u64) -> f64 {
        let secs = self.elapsed_secs();
        if secs > 0.0 {
            count as f64 / secs
        } else {
            0.0
        }
    }

    pub fn is_running(&self) -> bool {
        self.stopped.is_none()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start_new()
    }
}
