//! Virtual-scroll window arithmetic.

use crate::config::constants::{RESULT_ROW_HEIGHT, RESULT_VIEWPORT_HEIGHT, VIRTUAL_OVERSCAN};

/// Fixed-height row windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualWindow {
    /// Height of one row in pixels. Zero is treated as one.
    pub item_height: u32,
    /// Height of the scroll viewport in pixels.
    pub viewport_height: u32,
    /// Extra rows kept above and below the visible ones.
    pub overscan: usize,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self::new(RESULT_ROW_HEIGHT, RESULT_VIEWPORT_HEIGHT, VIRTUAL_OVERSCAN)
    }
}

/// Rows to materialize and the spacer heights around them.
///
/// # Invariants
/// - `start <= end <= total`
/// - `offset_top + rendered rows + offset_bottom` spans the full list height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSlice {
    /// First rendered row (inclusive).
    pub start: usize,
    /// Last rendered row (exclusive).
    pub end: usize,
    /// Spacer height above the rendered rows.
    pub offset_top: u64,
    /// Spacer height below the rendered rows.
    pub offset_bottom: u64,
}

impl WindowSlice {
    /// Rendered row indices.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Number of rendered rows.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether no row is rendered.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl VirtualWindow {
    /// Window over rows of `item_height` in a `viewport_height` viewport.
    pub fn new(item_height: u32, viewport_height: u32, overscan: usize) -> Self {
        Self {
            item_height,
            viewport_height,
            overscan,
        }
    }

    fn row_height(&self) -> u64 {
        u64::from(self.item_height.max(1))
    }

    /// Rows that fit in the viewport, counting a partial row.
    pub fn visible_count(&self) -> usize {
        let rows = u64::from(self.viewport_height).div_ceil(self.row_height());
        usize::try_from(rows).unwrap_or(usize::MAX)
    }

    /// Full list height for `total` rows.
    pub fn total_height(&self, total: usize) -> u64 {
        self.row_height().saturating_mul(total as u64)
    }

    /// Slice of `total` rows to render at `scroll_top`.
    ///
    /// Scrolling past the end pins the window to the last rows.
    pub fn slice(&self, total: usize, scroll_top: u64) -> WindowSlice {
        if total == 0 {
            return WindowSlice::default();
        }
        let visible = self.visible_count();
        let first = usize::try_from(scroll_top / self.row_height())
            .unwrap_or(usize::MAX)
            .min(total.saturating_sub(visible));
        let start = first.saturating_sub(self.overscan);
        let end = first
            .saturating_add(visible)
            .saturating_add(self.overscan)
            .min(total);
        WindowSlice {
            start,
            end,
            offset_top: self.row_height() * start as u64,
            offset_bottom: self.row_height() * (total - end) as u64,
        }
    }
}
