//! Position calculator.
//!
//! A pure mapping from `(registration, context)` to inline style writes,
//! memoised in a bounded LRU keyed by a hash of both inputs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;

use super::registry::{ElementRegistration, PositioningRule, VerticalAnchor};
use crate::config::constants::{
    CENTERING_MOBILE_MAX_WIDTH, POSITION_CACHE_CAPACITY, SIDEBAR_COLLAPSED_WIDTH,
    SIDEBAR_EXPANDED_WIDTH,
};
use crate::sidebar::SidebarState;

/// Device type used to pick a positioning rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Narrow viewport.
    Mobile,
    /// Everything wider.
    Desktop,
}

impl DeviceType {
    /// Device type for a viewport width.
    pub fn for_width(width: u32) -> Self {
        if width <= CENTERING_MOBILE_MAX_WIDTH {
            DeviceType::Mobile
        } else {
            DeviceType::Desktop
        }
    }
}

/// Inputs shared by every registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CenteringContext {
    /// Device class of the viewport.
    pub device_type: DeviceType,
    /// Whether the sidebar is collapsed.
    pub sidebar_collapsed: bool,
    /// Dynamic horizontal offset (CSS length).
    pub centering_offset: String,
    /// Viewport width in pixels.
    pub screen_width: u32,
}

impl CenteringContext {
    /// Context for `sidebar`, using `offset` or the sidebar-derived default.
    pub fn new(sidebar: SidebarState, offset: Option<&str>) -> Self {
        let device_type = DeviceType::for_width(sidebar.screen_width);
        let centering_offset = offset
            .map(str::to_string)
            .unwrap_or_else(|| default_offset(device_type, sidebar.is_collapsed));
        Self {
            device_type,
            sidebar_collapsed: sidebar.is_collapsed,
            centering_offset,
            screen_width: sidebar.screen_width,
        }
    }
}

/// Half the sidebar width on desktop, nothing on mobile.
pub fn default_offset(device_type: DeviceType, sidebar_collapsed: bool) -> String {
    let width = match (device_type, sidebar_collapsed) {
        (DeviceType::Mobile, _) => 0,
        (DeviceType::Desktop, false) => SIDEBAR_EXPANDED_WIDTH,
        (DeviceType::Desktop, true) => SIDEBAR_COLLAPSED_WIDTH,
    };
    format!("{}px", width / 2)
}

/// One inline style write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleValue {
    /// Write this value.
    Set(String),
    /// Remove the property.
    Clear,
}

/// Ordered style writes for one element.
pub type StyleMap = Vec<(&'static str, StyleValue)>;

/// Every property the manager may write.
pub const MANAGED_PROPERTIES: [&str; 7] = [
    "position",
    "left",
    "top",
    "bottom",
    "transform",
    "z-index",
    "--centering-offset",
];

/// Styles that undo everything the manager may have written.
pub fn cleared_styles() -> StyleMap {
    MANAGED_PROPERTIES
        .iter()
        .map(|&property| (property, StyleValue::Clear))
        .collect()
}

fn set(value: impl Into<String>) -> StyleValue {
    StyleValue::Set(value.into())
}

/// Compute the style writes for `registration` under `context`.
pub fn compute_styles(registration: &ElementRegistration, context: &CenteringContext) -> StyleMap {
    let rule = match context.device_type {
        DeviceType::Mobile => &registration.positioning.mobile,
        DeviceType::Desktop => &registration.positioning.desktop,
    };
    let z_index = registration
        .z_index
        .map_or(StyleValue::Clear, |z| set(z.to_string()));
    let left = if registration.use_centering_offset && context.device_type == DeviceType::Desktop {
        format!("calc(50% + {})", context.centering_offset)
    } else {
        "50%".to_string()
    };

    match rule {
        PositioningRule::FixedCenter { anchor } => {
            let (top, bottom, transform) = match anchor {
                VerticalAnchor::Top(top) => (set(top.as_str()), StyleValue::Clear, "translateX(-50%)"),
                VerticalAnchor::Bottom(bottom) => {
                    (StyleValue::Clear, set(bottom.as_str()), "translateX(-50%)")
                }
                VerticalAnchor::Middle => (set("50%"), StyleValue::Clear, "translate(-50%, -50%)"),
            };
            vec![
                ("position", set("fixed")),
                ("left", set(left)),
                ("top", top),
                ("bottom", bottom),
                ("transform", set(transform)),
                ("z-index", z_index),
                ("--centering-offset", StyleValue::Clear),
            ]
        }
        PositioningRule::FixedTop { top } => vec![
            ("position", set("fixed")),
            ("left", set(left)),
            ("top", set(top.as_str())),
            ("bottom", StyleValue::Clear),
            ("transform", set("translateX(-50%)")),
            ("z-index", z_index),
            ("--centering-offset", StyleValue::Clear),
        ],
        PositioningRule::CssControlled { base_offset } => {
            let offset = if registration.use_centering_offset {
                context.centering_offset.clone()
            } else if context.sidebar_collapsed {
                "0px".to_string()
            } else {
                base_offset.clone()
            };
            vec![
                ("position", StyleValue::Clear),
                ("left", StyleValue::Clear),
                ("top", StyleValue::Clear),
                ("bottom", StyleValue::Clear),
                ("transform", StyleValue::Clear),
                ("z-index", z_index),
                ("--centering-offset", set(offset)),
            ]
        }
    }
}

/// Memoising wrapper around [`compute_styles`].
#[derive(Debug)]
pub struct PositionCalculator {
    cache: LruCache<u64, StyleMap>,
    hits: u64,
    misses: u64,
}

impl Default for PositionCalculator {
    fn default() -> Self {
        Self::new(POSITION_CACHE_CAPACITY)
    }
}

impl PositionCalculator {
    /// Calculator remembering up to `capacity` results (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Styles for `registration` under `context`.
    pub fn compute(&mut self, registration: &ElementRegistration, context: &CenteringContext) -> StyleMap {
        let mut hasher = DefaultHasher::new();
        registration.hash(&mut hasher);
        context.hash(&mut hasher);
        let key = hasher.finish();

        if let Some(styles) = self.cache.get(&key) {
            self.hits += 1;
            return styles.clone();
        }
        self.misses += 1;
        let styles = compute_styles(registration, context);
        self.cache.put(key, styles.clone());
        styles
    }

    /// Forget every memoised result.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of memoised results.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing is memoised.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
