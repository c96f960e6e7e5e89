//! Resize debouncing.
//!
//! Surface resizes arrive in bursts while a window edge is dragged. The
//! viewport is redrawn only once the size has been stable for the debounce
//! delay.

use std::time::Duration;
use web_time::Instant;

use crate::constants::DEFAULT_RESIZE_DEBOUNCE_MS;

/// Collapses bursts of resize events into one redraw.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    /// Quiet period after the last resize.
    delay: Duration,

    /// Latest size and when it was reported.
    pending: Option<((u32, u32), Instant)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_RESIZE_DEBOUNCE_MS))
    }
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a resize. Restarts the quiet period.
    pub fn notify(&mut self, width: u32, height: u32, now: Instant) {
        log::trace!("Resize to {}x{} scheduled", width, height);
        self.pending = Some(((width, height), now));
    }

    /// Check whether a redraw is due.
    ///
    /// Returns the settled size once the delay has elapsed since the last
    /// resize, and clears the pending state.
    pub fn poll(&mut self, now: Instant) -> Option<(u32, u32)> {
        let (size, at) = self.pending?;
        if now.saturating_duration_since(at) < self.delay {
            return None;
        }
        self.pending = None;
        Some(size)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
