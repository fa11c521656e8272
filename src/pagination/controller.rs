//! Pagination Controller.
//!
//! Owns the [`PaginationState`] and is its only writer. Every page, item
//! count or configuration change produces a fully recomputed state value.

use crate::config::constants::{DEFAULT_ITEMS_PER_PAGE, DEFAULT_MAX_VISIBLE_PAGES};
use crate::model::error::ValidationError;
use crate::responsive::ResponsiveProfile;

/// Pagination parameters for one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaginationConfig {
    /// Items per page (> 0).
    pub items_per_page: usize,
    /// Page buttons in the sliding window (> 0).
    pub max_visible_pages: usize,
    /// Show jump-to-first/last buttons outside the window.
    pub show_first_last: bool,
    /// Show previous/next buttons.
    pub show_prev_next: bool,
    /// Follow responsive profile changes.
    pub responsive: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
            show_first_last: true,
            show_prev_next: true,
            responsive: true,
        }
    }
}

impl PaginationConfig {
    /// Validated constructor; flags take their defaults.
    ///
    /// # Errors
    ///
    /// `ZeroPageSize` or `ZeroVisiblePages` for zero sizes.
    pub fn new(items_per_page: usize, max_visible_pages: usize) -> Result<Self, ValidationError> {
        let config = Self {
            items_per_page,
            max_visible_pages,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the size invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.items_per_page == 0 {
            return Err(ValidationError::ZeroPageSize);
        }
        if self.max_visible_pages == 0 {
            return Err(ValidationError::ZeroVisiblePages);
        }
        Ok(())
    }
}

/// Derived pagination state.
///
/// # Invariants
/// - `1 <= current_page <= max(total_pages, 1)`
/// - `start_index <= end_index <= total_items`
/// - `visible_pages` is a contiguous ascending run of
///   `min(max_visible_pages, total_pages)` pages containing `current_page`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaginationState {
    /// 1-based current page.
    pub current_page: usize,
    /// Items being paginated.
    pub total_items: usize,
    /// `ceil(total_items / items_per_page)`.
    pub total_pages: usize,
    /// First item of the current page.
    pub start_index: usize,
    /// One past the last item of the current page.
    pub end_index: usize,
    /// Page numbers shown as buttons.
    pub visible_pages: Vec<usize>,
    /// Some pages fall outside the window.
    pub has_ellipsis: bool,
    /// A previous page exists.
    pub has_previous: bool,
    /// A next page exists.
    pub has_next: bool,
}

impl PaginationState {
    /// Item range of the current page.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_index..self.end_index
    }
}

/// Sliding window of page numbers around `current_page`.
///
/// Keeps `max_visible` pages whenever `total_pages` allows it by shifting the
/// window backward near the end.
pub fn visible_window(current_page: usize, total_pages: usize, max_visible: usize) -> Vec<usize> {
    if total_pages == 0 || max_visible == 0 {
        return Vec::new();
    }
    if total_pages <= max_visible {
        return (1..=total_pages).collect();
    }
    let half = max_visible / 2;
    let mut start = current_page.saturating_sub(half).max(1);
    let end = (start + max_visible - 1).min(total_pages);
    if end - start + 1 < max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }
    (start..=end).collect()
}

/// Compute the state for `total_items` at `current_page`.
///
/// The page is clamped into `[1, max(total_pages, 1)]` without error.
///
/// # Errors
///
/// `NegativeTotal` for negative totals; config size errors from
/// [`PaginationConfig::validate`].
pub fn calculate_pagination(
    config: &PaginationConfig,
    total_items: i64,
    current_page: i64,
) -> Result<PaginationState, ValidationError> {
    config.validate()?;
    let total_items =
        usize::try_from(total_items).map_err(|_| ValidationError::NegativeTotal(total_items))?;

    let total_pages = total_items.div_ceil(config.items_per_page);
    let last_page = total_pages.max(1) as i64;
    let current_page = current_page.clamp(1, last_page) as usize;

    let start_index = ((current_page - 1) * config.items_per_page).min(total_items);
    let end_index = (start_index + config.items_per_page).min(total_items);

    Ok(PaginationState {
        current_page,
        total_items,
        total_pages,
        start_index,
        end_index,
        visible_pages: visible_window(current_page, total_pages, config.max_visible_pages),
        has_ellipsis: total_pages > config.max_visible_pages,
        has_previous: current_page > 1,
        has_next: current_page < total_pages,
    })
}

type PageChangeCallback = Box<dyn FnMut(usize)>;
type ConfigChangeCallback = Box<dyn FnMut(&PaginationConfig)>;

/// Page-state machine.
pub struct PaginationController {
    config: PaginationConfig,
    state: PaginationState,
    on_page_change: Option<PageChangeCallback>,
    on_config_change: Option<ConfigChangeCallback>,
}

impl std::fmt::Debug for PaginationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PaginationController {
    /// Controller over zero items.
    ///
    /// # Errors
    ///
    /// Config size errors.
    pub fn new(config: PaginationConfig) -> Result<Self, ValidationError> {
        let state = calculate_pagination(&config, 0, 1)?;
        Ok(Self {
            config,
            state,
            on_page_change: None,
            on_config_change: None,
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Callback invoked synchronously with the new page after each applied change.
    pub fn set_on_page_change<F>(&mut self, callback: F)
    where
        F: FnMut(usize) + 'static,
    {
        self.on_page_change = Some(Box::new(callback));
    }

    /// Callback invoked after a responsive profile rewrote the config.
    pub fn set_on_config_change<F>(&mut self, callback: F)
    where
        F: FnMut(&PaginationConfig) + 'static,
    {
        self.on_config_change = Some(Box::new(callback));
    }

    /// Compute a state with this controller's config without storing it.
    pub fn calculate_pagination(
        &self,
        total_items: i64,
        current_page: i64,
    ) -> Result<PaginationState, ValidationError> {
        calculate_pagination(&self.config, total_items, current_page)
    }

    /// Change the item count, keeping the current page (clamped).
    pub fn set_total_items(&mut self, total_items: i64) -> Result<&PaginationState, ValidationError> {
        self.state = self.calculate_pagination(total_items, self.state.current_page as i64)?;
        Ok(&self.state)
    }

    /// Change the item count and return to page 1.
    pub fn reset(&mut self, total_items: i64) -> Result<&PaginationState, ValidationError> {
        self.state = self.calculate_pagination(total_items, 1)?;
        Ok(&self.state)
    }

    /// Replace the configuration and re-derive the state.
    pub fn update_config(&mut self, config: PaginationConfig) -> Result<&PaginationState, ValidationError> {
        let state = calculate_pagination(
            &config,
            self.state.total_items as i64,
            self.state.current_page as i64,
        )?;
        self.config = config;
        self.state = state;
        Ok(&self.state)
    }

    /// Move to `page`.
    ///
    /// Returns `false` without side effects if `page` is out of range or
    /// already current; otherwise recomputes state, invokes the page
    /// callback and returns `true`.
    pub fn handle_page_change(&mut self, page: i64) -> bool {
        if page < 1 || page as usize > self.state.total_pages {
            tracing::debug!(page, total_pages = self.state.total_pages, "page change rejected");
            return false;
        }
        let page = page as usize;
        if page == self.state.current_page {
            return false;
        }

        match self.calculate_pagination(self.state.total_items as i64, page as i64) {
            Ok(state) => self.state = state,
            Err(err) => {
                tracing::warn!(error = %err, "page change failed");
                return false;
            }
        }
        if let Some(callback) = self.on_page_change.as_mut() {
            callback(page);
        }
        true
    }

    /// Next page.
    pub fn go_to_next_page(&mut self) -> bool {
        self.handle_page_change(self.state.current_page as i64 + 1)
    }

    /// Previous page.
    pub fn go_to_previous_page(&mut self) -> bool {
        self.handle_page_change(self.state.current_page as i64 - 1)
    }

    /// First page.
    pub fn go_to_first_page(&mut self) -> bool {
        self.handle_page_change(1)
    }

    /// Last page.
    pub fn go_to_last_page(&mut self) -> bool {
        self.handle_page_change(self.state.total_pages as i64)
    }

    /// Adopt a responsive profile's page sizes.
    ///
    /// No-op unless `responsive` is enabled. The new page is the one holding
    /// the first item of the old page, so the user's position survives a
    /// page-size change. Returns whether the config changed.
    pub fn apply_profile(&mut self, profile: &ResponsiveProfile) -> bool {
        if !self.config.responsive {
            return false;
        }
        let config = PaginationConfig {
            items_per_page: profile.items_per_page,
            max_visible_pages: profile.max_visible_pages,
            ..self.config
        };
        if config == self.config {
            return false;
        }

        let anchor_page = self.state.start_index / config.items_per_page.max(1) + 1;
        match calculate_pagination(&config, self.state.total_items as i64, anchor_page as i64) {
            Ok(state) => {
                self.config = config;
                self.state = state;
            }
            Err(err) => {
                tracing::warn!(error = %err, "responsive profile rejected");
                return false;
            }
        }
        if let Some(callback) = self.on_config_change.as_mut() {
            callback(&self.config);
        }
        true
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
