#![forbid(unsafe_code)]

//! Resize debouncing.
//!
//! Rapid resize notifications are coalesced: only the latest size is applied,
//! once `delay` has passed without a new notification, or at the latest
//! `deadline` after the first notification of the burst.

use std::time::{Duration, Instant};

pub const RESIZE_DELAY: Duration = Duration::from_millis(100);
pub const RESIZE_DEADLINE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    deadline: Duration,
    applied: (u16, u16),
    pending: Option<(u16, u16)>,
    first_event: Option<Instant>,
    last_event: Option<Instant>,
}

impl ResizeDebouncer {
    pub fn new(initial_size: (u16, u16)) -> Self {
        Self::with_timing(initial_size, RESIZE_DELAY, RESIZE_DEADLINE)
    }

    pub fn with_timing(initial_size: (u16, u16), delay: Duration, deadline: Duration) -> Self {
        Self {
            delay,
            deadline,
            applied: initial_size,
            pending: None,
            first_event: None,
            last_event: None,
        }
    }

    /// Record a size observation.
    ///
    /// Observing the size already on screen with nothing pending is a no-op.
    pub fn handle_resize_at(&mut self, width: u16, height: u16, now: Instant) {
        if self.pending.is_none() && (width, height) == self.applied {
            return;
        }
        self.pending = Some((width, height));
        self.last_event = Some(now);
        self.first_event.get_or_insert(now);
    }

    /// Returns the size to apply once the window has closed.
    pub fn tick_at(&mut self, now: Instant) -> Option<(u16, u16)> {
        let size = self.pending?;
        let first = self.first_event?;
        let last = self.last_event?;
        let quiet = now.saturating_duration_since(last) >= self.delay;
        let forced = now.saturating_duration_since(first) >= self.deadline;
        if !(quiet || forced) {
            return None;
        }
        tracing::debug!(
            width = size.0,
            height = size.1,
            forced = forced && !quiet,
            waited_ms = now.saturating_duration_since(first).as_millis() as u64,
            "resize applied"
        );
        self.applied = size;
        self.pending = None;
        self.first_event = None;
        self.last_event = None;
        Some(size)
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The size most recently applied.
    #[inline]
    pub fn applied(&self) -> (u16, u16) {
        self.applied
    }
}
