//! Debounce, throttle and animation-frame coalescing.
//!
//! All primitives take the current time explicitly. The owner decides when
//! to poll them, which keeps behaviour deterministic under test and makes
//! cancellation a plain `cancel()` on destroy.

use std::time::{Duration, Instant};

/// Fires once after input has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create an idle debouncer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Register input at `now`, pushing the deadline back.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Consume the pending fire if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a fire is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending fire is due.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drop any pending fire.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Fires at most once per `interval`, keeping a trailing fire for input
/// that arrives inside the window.
#[derive(Debug, Clone)]
pub struct Throttler {
    interval: Duration,
    last_fired: Option<Instant>,
    trailing: Option<Instant>,
}

impl Throttler {
    /// Create an idle throttler.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            trailing: None,
        }
    }

    /// Register input at `now`. Returns `true` if it fires immediately.
    pub fn trigger(&mut self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                self.trailing = Some(last + self.interval);
                false
            }
            _ => {
                self.last_fired = Some(now);
                self.trailing = None;
                true
            }
        }
    }

    /// Consume a due trailing fire.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.trailing {
            Some(due) if due <= now => {
                self.trailing = None;
                self.last_fired = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Whether a trailing fire is pending.
    pub fn is_pending(&self) -> bool {
        self.trailing.is_some()
    }

    /// Drop any trailing fire.
    pub fn cancel(&mut self) {
        self.trailing = None;
    }
}

/// Coalesces requests onto the next animation frame.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    requested: bool,
}

impl FrameScheduler {
    /// Create with no frame requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a frame. Returns `true` if this is the first request since the last frame.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.requested, true)
    }

    /// Consume the request when the frame runs.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }

    /// Whether a frame is pending.
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Drop the pending frame.
    pub fn cancel(&mut self) {
        self.requested = false;
    }
}
