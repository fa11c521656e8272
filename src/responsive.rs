//! Responsive Config Manager.
//!
//! Maps viewport width to one of three fixed breakpoint profiles and
//! notifies subscribers when the profile meaningfully changes. Raw resize
//! and orientation events are coalesced onto the next animation frame.

use crate::config::constants::{DESKTOP_MIN_WIDTH, MOBILE_MAX_WIDTH};
use crate::events::{FrameScheduler, ListenerSet, SubscriptionId};

/// Breakpoint profile type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// `width ≤ 479`
    Mobile,
    /// `480 ≤ width ≤ 1023`
    Tablet,
    /// `width ≥ 1024`
    Desktop,
}

impl ProfileKind {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Mobile => "mobile",
            ProfileKind::Tablet => "tablet",
            ProfileKind::Desktop => "desktop",
        }
    }
}

/// Pagination and sizing parameters for one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsiveProfile {
    /// Profile type.
    pub kind: ProfileKind,
    /// Items shown per page.
    pub items_per_page: usize,
    /// Page buttons in the visible window.
    pub max_visible_pages: usize,
    /// Text labels on prev/next buttons.
    pub show_labels: bool,
    /// Button edge length in pixels.
    pub button_size: u32,
    /// Gap between buttons in pixels.
    pub spacing: u32,
    /// Button font size in pixels.
    pub font_size: u32,
    /// Narrowest width (inclusive).
    pub min_width: u32,
    /// Widest width (inclusive).
    pub max_width: u32,
}

/// Mobile profile.
pub const MOBILE_PROFILE: ResponsiveProfile = ResponsiveProfile {
    kind: ProfileKind::Mobile,
    items_per_page: 10,
    max_visible_pages: 3,
    show_labels: false,
    button_size: 36,
    spacing: 4,
    font_size: 14,
    min_width: 0,
    max_width: MOBILE_MAX_WIDTH,
};

/// Tablet profile.
pub const TABLET_PROFILE: ResponsiveProfile = ResponsiveProfile {
    kind: ProfileKind::Tablet,
    items_per_page: 15,
    max_visible_pages: 5,
    show_labels: true,
    button_size: 40,
    spacing: 6,
    font_size: 15,
    min_width: MOBILE_MAX_WIDTH + 1,
    max_width: DESKTOP_MIN_WIDTH - 1,
};

/// Desktop profile.
pub const DESKTOP_PROFILE: ResponsiveProfile = ResponsiveProfile {
    kind: ProfileKind::Desktop,
    items_per_page: 20,
    max_visible_pages: 7,
    show_labels: true,
    button_size: 44,
    spacing: 8,
    font_size: 16,
    min_width: DESKTOP_MIN_WIDTH,
    max_width: u32::MAX,
};

/// Profile for a viewport width.
pub fn profile_for_width(width: u32) -> ResponsiveProfile {
    if width <= MOBILE_MAX_WIDTH {
        MOBILE_PROFILE
    } else if width < DESKTOP_MIN_WIDTH {
        TABLET_PROFILE
    } else {
        DESKTOP_PROFILE
    }
}

/// Tracks the current profile and its subscribers.
#[derive(Debug)]
pub struct ResponsiveConfigManager {
    current: ResponsiveProfile,
    pending_width: Option<u32>,
    frame: FrameScheduler,
    listeners: ListenerSet<ResponsiveProfile>,
}

impl ResponsiveConfigManager {
    /// Create with the profile for `width`.
    pub fn new(width: u32) -> Self {
        Self {
            current: profile_for_width(width),
            pending_width: None,
            frame: FrameScheduler::new(),
            listeners: ListenerSet::new(),
        }
    }

    /// The stored profile.
    pub fn current(&self) -> &ResponsiveProfile {
        &self.current
    }

    /// Record a resize or orientation change; the recompute waits for [`on_frame`](Self::on_frame).
    pub fn on_resize(&mut self, width: u32) {
        self.pending_width = Some(width);
        self.frame.request();
    }

    /// Whether a recompute is scheduled for the next frame.
    pub fn has_pending_frame(&self) -> bool {
        self.frame.is_requested()
    }

    /// Run the coalesced recompute for the latest recorded width.
    pub fn on_frame(&mut self) -> Option<ResponsiveProfile> {
        if !self.frame.take() {
            return None;
        }
        let width = self.pending_width.take()?;
        self.update_config(width)
    }

    /// Recompute for `width`, notifying listeners only when the profile
    /// type or visible page count changes. Returns the new profile if so.
    pub fn update_config(&mut self, width: u32) -> Option<ResponsiveProfile> {
        let next = profile_for_width(width);
        if next.kind == self.current.kind && next.max_visible_pages == self.current.max_visible_pages
        {
            return None;
        }

        tracing::debug!(
            from = self.current.kind.as_str(),
            to = next.kind.as_str(),
            width,
            "responsive profile changed"
        );
        self.current = next;
        self.listeners.notify(&next);
        Some(next)
    }

    /// Register a profile-change listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ResponsiveProfile) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Cancel the pending frame and drop every listener.
    pub fn dispose(&mut self) {
        self.frame.cancel();
        self.pending_width = None;
        self.listeners.clear();
    }
}
