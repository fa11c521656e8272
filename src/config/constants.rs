//! Layout, timing and breakpoint tables.
//!
//! Centralized location for all numeric tuning values so that the
//! pagination, responsive and centering subsystems agree on them.

use std::time::Duration;

// ===== Breakpoints =====

/// Widest viewport (inclusive, in CSS pixels) that still selects the mobile profile.
pub const MOBILE_MAX_WIDTH: u32 = 479;

/// Narrowest viewport that selects the desktop profile.
pub const DESKTOP_MIN_WIDTH: u32 = 1024;

/// Widest viewport for which floating elements use their mobile positioning rule.
///
/// Centering distinguishes only two device types; tablets position like desktops.
pub const CENTERING_MOBILE_MAX_WIDTH: u32 = 768;

// ===== Sidebar geometry =====

/// Sidebar width when expanded.
pub const SIDEBAR_EXPANDED_WIDTH: u32 = 260;

/// Sidebar width when collapsed to its icon rail.
pub const SIDEBAR_COLLAPSED_WIDTH: u32 = 64;

/// CSS selector of the sidebar element.
pub const SIDEBAR_SELECTOR: &str = "#sidebar";

/// Class toggled on the sidebar when collapsed.
pub const SIDEBAR_COLLAPSED_CLASS: &str = "collapsed";

/// Attribute mirrored on the sidebar when collapsed.
pub const SIDEBAR_COLLAPSED_ATTR: &str = "data-collapsed";

// ===== Timing =====

/// Resize events are debounced by this delay before centering recomputes.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Sidebar mutations trigger at most one centering recompute per interval.
pub const SIDEBAR_THROTTLE: Duration = Duration::from_millis(100);

/// Delay applied by `layoutChange` emitters before dispatching.
pub const LAYOUT_CHANGE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Debounce for page-number button activation.
pub const PAGE_CLICK_DEBOUNCE: Duration = Duration::from_millis(150);

/// Debounce for previous/next button activation.
pub const NAV_CLICK_DEBOUNCE: Duration = Duration::from_millis(100);

/// The `processing` class is removed this long after the page action completes.
pub const PROCESSING_CLEAR_DELAY: Duration = Duration::from_millis(200);

/// Worker round-trips give up after this long.
pub const WORKER_TIMEOUT: Duration = Duration::from_secs(10);

// ===== Capacities =====

/// Maximum pooled elements kept per pagination element role.
pub const PAGINATION_POOL_CAPACITY: usize = 20;

/// Maximum memoized style computations in the centering position cache.
pub const POSITION_CACHE_CAPACITY: usize = 50;

// ===== Pagination defaults =====

/// Items per page before any responsive profile has been applied.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Visible page buttons before any responsive profile has been applied.
pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 5;

// ===== Virtual scroll =====

/// Height of a single result row in pixels.
pub const RESULT_ROW_HEIGHT: u32 = 44;

/// Height of the scrollable result viewport in pixels.
pub const RESULT_VIEWPORT_HEIGHT: u32 = 880;

/// Rows materialized above and below the visible window.
pub const VIRTUAL_OVERSCAN: usize = 5;

// ===== Cache keys =====

/// Key holding the serialized bookmark tree.
pub const CACHE_KEY_DATA: &str = "bookmarksData";

/// Key holding the serialized flat index.
pub const CACHE_KEY_INDEX: &str = "bookmarksIndex";

/// Key holding the tree hash.
pub const CACHE_KEY_HASH: &str = "bookmarksHash";

// ===== Element ids =====

/// Container the pagination control is rendered into.
pub const PAGINATION_CONTAINER_SELECTOR: &str = "#pagination";

/// Container for the result list.
pub const RESULTS_CONTAINER_SELECTOR: &str = "#bookmark-list";
