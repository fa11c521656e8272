//! Event coordinator: rate-limits the bus events that drive centering.
//!
//! Resize is debounced, sidebar changes are throttled with a trailing fire,
//! layout and offset notifications pass straight through.

use std::time::Instant;

use crate::config::constants::{RESIZE_DEBOUNCE, SIDEBAR_THROTTLE};
use crate::events::{Debouncer, LayoutEvent, Throttler};
use crate::sidebar::SidebarState;

/// An event that survived rate limiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Settled viewport width.
    Viewport(u32),
    /// Latest sidebar state.
    Sidebar(SidebarState),
    /// Layout shifted; recompute unconditionally.
    Layout,
    /// New dynamic offset.
    Offset(String),
}

/// Debounces resizes and throttles sidebar changes into [`Trigger`]s.
#[derive(Debug)]
pub struct EventCoordinator {
    resize: Debouncer,
    sidebar: Throttler,
    latest_width: Option<u32>,
    latest_sidebar: Option<SidebarState>,
}

impl Default for EventCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCoordinator {
    /// Coordinator with no pending triggers.
    pub fn new() -> Self {
        Self {
            resize: Debouncer::new(RESIZE_DEBOUNCE),
            sidebar: Throttler::new(SIDEBAR_THROTTLE),
            latest_width: None,
            latest_sidebar: None,
        }
    }

    /// Feed one bus event. Returns a trigger when it fires immediately.
    pub fn handle(&mut self, event: &LayoutEvent, now: Instant) -> Option<Trigger> {
        match event {
            LayoutEvent::ViewportChanged { width } => {
                self.latest_width = Some(*width);
                self.resize.trigger(now);
                None
            }
            LayoutEvent::SidebarChanged(state) => {
                self.latest_sidebar = Some(*state);
                if self.sidebar.trigger(now) {
                    self.latest_sidebar.take().map(Trigger::Sidebar)
                } else {
                    None
                }
            }
            LayoutEvent::LayoutInvalidated => Some(Trigger::Layout),
            LayoutEvent::CenteringOffsetChanged { offset } => Some(Trigger::Offset(offset.clone())),
        }
    }

    /// Fire due debounced/throttled events.
    pub fn tick(&mut self, now: Instant) -> Vec<Trigger> {
        let mut fired = Vec::new();
        if self.resize.poll(now) {
            if let Some(width) = self.latest_width.take() {
                fired.push(Trigger::Viewport(width));
            }
        }
        if self.sidebar.poll(now) {
            if let Some(state) = self.latest_sidebar.take() {
                fired.push(Trigger::Sidebar(state));
            }
        }
        fired
    }

    /// Drop every pending fire.
    pub fn cancel(&mut self) {
        self.resize.cancel();
        self.sidebar.cancel();
        self.latest_width = None;
        self.latest_sidebar = None;
    }
}
