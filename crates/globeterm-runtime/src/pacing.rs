#![forbid(unsafe_code)]

//! Fixed-rate frame pacing on the monotonic clock.

use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            frame_start: now,
        }
    }

    /// Mark the start of a frame.
    pub fn begin(&mut self, now: Instant) {
        self.frame_start = now;
    }

    /// Time left in the current frame: `max(0, interval - elapsed)`.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.frame_start))
    }

    /// Sleep out the rest of the frame.
    pub fn wait(&self) {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }
}
