//! Pagination Renderer.
//!
//! Turns a [`PaginationState`] into a row of pooled button elements inside
//! the pagination container, and turns delegated clicks and key presses
//! back into page numbers. Rendering never fails outward: errors are
//! logged and the row is replaced by a fallback message.

use std::time::Instant;

use thiserror::Error;

use super::controller::{PaginationConfig, PaginationState};
use super::pool::ElementPool;
use crate::config::constants::{
    NAV_CLICK_DEBOUNCE, PAGE_CLICK_DEBOUNCE, PAGINATION_CONTAINER_SELECTOR,
    PAGINATION_POOL_CAPACITY, PROCESSING_CLEAR_DELAY,
};
use crate::dom::{DomError, Document, NodeId, Selector};
use crate::events::Debouncer;
use crate::responsive::{ResponsiveProfile, DESKTOP_PROFILE};

const BUTTON_CLASS: &str = "pagination-btn";
const PROCESSING_CLASS: &str = "processing";
const DISABLED_CLASS: &str = "disabled";
const FALLBACK_CLASS: &str = "pagination-error";
const FALLBACK_MESSAGE: &str = "分页加载失败，请刷新页面重试";

/// Render failures, handled internally by the fallback path.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Document operation failed.
    #[error(transparent)]
    Dom(#[from] DomError),

    /// The container element is not in the document.
    #[error("pagination container '{0}' not found")]
    MissingContainer(String),
}

/// Pool key for rendered elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// Previous-page button.
    Prev,
    /// Next-page button.
    Next,
    /// Numbered page button.
    Page,
    /// Gap marker.
    Ellipsis,
}

/// One slot of the pagination row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationItem {
    /// Previous-page button targeting `target`.
    Prev {
        /// Page the button leads to.
        target: usize,
        /// False on the first page.
        enabled: bool,
    },
    /// Next-page button targeting `target`.
    Next {
        /// Page the button leads to.
        target: usize,
        /// False on the last page.
        enabled: bool,
    },
    /// Numbered page button.
    Page {
        /// 1-based page number.
        page: usize,
        /// Whether this is the current page.
        current: bool,
    },
    /// Gap marker.
    Ellipsis,
}

impl PaginationItem {
    /// Pool role for this slot.
    pub fn role(&self) -> ElementRole {
        match self {
            PaginationItem::Prev { .. } => ElementRole::Prev,
            PaginationItem::Next { .. } => ElementRole::Next,
            PaginationItem::Page { .. } => ElementRole::Page,
            PaginationItem::Ellipsis => ElementRole::Ellipsis,
        }
    }

    /// Page the slot navigates to, if any.
    pub fn target(&self) -> Option<usize> {
        match *self {
            PaginationItem::Prev { target, .. } | PaginationItem::Next { target, .. } => Some(target),
            PaginationItem::Page { page, .. } => Some(page),
            PaginationItem::Ellipsis => None,
        }
    }

    fn is_enabled(&self) -> bool {
        match *self {
            PaginationItem::Prev { enabled, .. } | PaginationItem::Next { enabled, .. } => enabled,
            PaginationItem::Page { .. } => true,
            PaginationItem::Ellipsis => false,
        }
    }
}

/// Row layout for `state`.
///
/// `[prev?] [first?] [ellipsis?] [window] [ellipsis?] [last?] [next?]`.
/// First/last jump buttons appear only when some pages fall outside the
/// window and the window does not already contain them. Empty when there
/// is at most one page.
pub fn layout_items(state: &PaginationState, config: &PaginationConfig) -> Vec<PaginationItem> {
    let mut items = Vec::new();
    let total = state.total_pages;
    let (Some(&first), Some(&last)) = (state.visible_pages.first(), state.visible_pages.last())
    else {
        return items;
    };
    if total <= 1 {
        return items;
    }
    let jumps = config.show_first_last && total > config.max_visible_pages;

    if config.show_prev_next {
        items.push(PaginationItem::Prev {
            target: state.current_page.saturating_sub(1).max(1),
            enabled: state.has_previous,
        });
    }
    if jumps && first != 1 {
        items.push(PaginationItem::Page {
            page: 1,
            current: false,
        });
    }
    if first > 2 {
        items.push(PaginationItem::Ellipsis);
    }
    items.extend(state.visible_pages.iter().map(|&page| PaginationItem::Page {
        page,
        current: page == state.current_page,
    }));
    if last + 1 < total {
        items.push(PaginationItem::Ellipsis);
    }
    if jumps && last != total {
        items.push(PaginationItem::Page {
            page: total,
            current: false,
        });
    }
    if config.show_prev_next {
        items.push(PaginationItem::Next {
            target: (state.current_page + 1).min(total),
            enabled: state.has_next,
        });
    }
    items
}

/// Visual options derived from the responsive profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Text labels on prev/next instead of arrows.
    pub show_labels: bool,
    /// Button edge length in pixels.
    pub button_size: u32,
    /// Gap between buttons in pixels.
    pub spacing: u32,
    /// Font size in pixels.
    pub font_size: u32,
}

impl RenderOptions {
    /// Options for `profile`.
    pub fn from_profile(profile: &ResponsiveProfile) -> Self {
        Self {
            show_labels: profile.show_labels,
            button_size: profile.button_size,
            spacing: profile.spacing,
            font_size: profile.font_size,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_profile(&DESKTOP_PROFILE)
    }
}

/// Keys handled by the delegated key handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Focus the previous button.
    Left,
    /// Focus the next button.
    Right,
    /// Same as `Right`.
    Tab,
    /// Same as `Left`.
    ShiftTab,
    /// Focus the first button.
    Home,
    /// Focus the last button.
    End,
    /// Activate the focused button.
    Enter,
    /// Same as `Enter`.
    Space,
}

#[derive(Debug, Clone, Copy)]
struct PendingClick {
    page: usize,
}

#[derive(Debug, Clone, Copy)]
struct ProcessingMark {
    role: ElementRole,
    page: usize,
    clear_at: Option<Instant>,
}

impl ProcessingMark {
    fn matches(&self, item: &PaginationItem) -> bool {
        item.role() == self.role
            && (self.role != ElementRole::Page || item.target() == Some(self.page))
    }
}

type Signature = (PaginationState, PaginationConfig, RenderOptions);

fn reset_element(doc: &mut Document, node: NodeId) -> Result<(), DomError> {
    for name in [
        "class",
        "aria-label",
        "aria-current",
        "aria-disabled",
        "aria-hidden",
        "tabindex",
        "data-page",
    ] {
        doc.remove_attribute(node, name)?;
    }
    doc.set_text(node, "")
}

fn is_disabled(doc: &Document, node: NodeId) -> bool {
    doc.has_class(node, DISABLED_CLASS) || doc.attribute(node, "aria-disabled").as_deref() == Some("true")
}

/// Renders the pagination row and interprets user input on it.
#[derive(Debug)]
pub struct PaginationRenderer {
    container_selector: String,
    options: RenderOptions,
    root: Option<NodeId>,
    fallback: Option<NodeId>,
    rendered: Vec<(PaginationItem, NodeId)>,
    pool: ElementPool<ElementRole>,
    signature: Option<Signature>,
    button_selector: Selector,
    page_debounce: Debouncer,
    nav_debounce: Debouncer,
    pending: Option<PendingClick>,
    processing: Option<ProcessingMark>,
}

impl Default for PaginationRenderer {
    fn default() -> Self {
        Self::new(PAGINATION_CONTAINER_SELECTOR)
    }
}

impl PaginationRenderer {
    /// Renderer placing its root inside the element matching `container_selector`.
    pub fn new(container_selector: impl Into<String>) -> Self {
        Self {
            container_selector: container_selector.into(),
            options: RenderOptions::default(),
            root: None,
            fallback: None,
            rendered: Vec::new(),
            pool: ElementPool::new(PAGINATION_POOL_CAPACITY, reset_element),
            signature: None,
            button_selector: Selector::class(BUTTON_CLASS),
            page_debounce: Debouncer::new(PAGE_CLICK_DEBOUNCE),
            nav_debounce: Debouncer::new(NAV_CLICK_DEBOUNCE),
            pending: None,
            processing: None,
        }
    }

    /// The `nav.pagination` root, once rendered.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The fallback message element, if the last render failed.
    pub fn fallback(&self) -> Option<NodeId> {
        self.fallback
    }

    /// Rendered slots in row order.
    pub fn items(&self) -> impl Iterator<Item = (PaginationItem, NodeId)> + '_ {
        self.rendered.iter().copied()
    }

    /// Current visual options.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Replace the visual options; takes effect on the next render.
    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Pool backing the rendered elements.
    pub fn pool(&self) -> &ElementPool<ElementRole> {
        &self.pool
    }

    /// Whether a debounced click is waiting to fire.
    pub fn has_pending_click(&self) -> bool {
        self.pending.is_some()
    }

    /// Render `state`. Unchanged inputs leave the document untouched.
    pub fn render(&mut self, doc: &mut Document, state: &PaginationState, config: &PaginationConfig) {
        let signature = (state.clone(), *config, self.options);
        let root_live = self.root.is_some_and(|root| doc.is_connected(root));
        if root_live && self.signature.as_ref() == Some(&signature) {
            return;
        }

        match self.try_render(doc, state, config) {
            Ok(()) => self.signature = Some(signature),
            Err(err) => {
                tracing::warn!(error = %err, "pagination render failed; showing fallback");
                self.signature = None;
                self.render_fallback(doc);
            }
        }
    }

    fn try_render(
        &mut self,
        doc: &mut Document,
        state: &PaginationState,
        config: &PaginationConfig,
    ) -> Result<(), RenderError> {
        let root = self.ensure_root(doc)?;
        self.remove_fallback(doc);
        self.release_rendered(doc)?;

        doc.set_style(root, "--pagination-button-size", &format!("{}px", self.options.button_size))?;
        doc.set_style(root, "--pagination-spacing", &format!("{}px", self.options.spacing))?;
        doc.set_style(root, "--pagination-font-size", &format!("{}px", self.options.font_size))?;

        if state.total_pages <= 1 {
            doc.set_attribute(root, "hidden", "")?;
            return Ok(());
        }
        doc.remove_attribute(root, "hidden")?;

        for item in layout_items(state, config) {
            let tag = if item.role() == ElementRole::Ellipsis { "span" } else { "button" };
            let node = self.pool.acquire(doc, item.role(), tag);
            self.rendered.push((item, node));
            self.configure(doc, node, &item)?;
            doc.append_child(root, node)?;
        }
        Ok(())
    }

    fn ensure_root(&mut self, doc: &mut Document) -> Result<NodeId, RenderError> {
        if let Some(root) = self.root {
            if doc.is_connected(root) {
                return Ok(root);
            }
            self.drop_root(doc);
        }

        let container = doc
            .query_selector(&self.container_selector)?
            .ok_or_else(|| RenderError::MissingContainer(self.container_selector.clone()))?;
        let root = doc.create_element("nav");
        doc.add_class(root, "pagination")?;
        doc.set_attribute(root, "role", "navigation")?;
        doc.set_attribute(root, "aria-label", "分页导航")?;
        doc.append_child(container, root)?;
        self.root = Some(root);
        Ok(root)
    }

    fn configure(&self, doc: &mut Document, node: NodeId, item: &PaginationItem) -> Result<(), DomError> {
        let labels = self.options.show_labels;
        match *item {
            PaginationItem::Ellipsis => {
                doc.add_class(node, "pagination-ellipsis")?;
                doc.set_attribute(node, "aria-hidden", "true")?;
                return doc.set_text(node, "…");
            }
            PaginationItem::Prev { target, .. } => {
                doc.set_attribute(node, "class", "pagination-btn pagination-prev")?;
                doc.set_attribute(node, "aria-label", "上一页")?;
                doc.set_attribute(node, "data-page", &target.to_string())?;
                doc.set_text(node, if labels { "上一页" } else { "‹" })?;
            }
            PaginationItem::Next { target, .. } => {
                doc.set_attribute(node, "class", "pagination-btn pagination-next")?;
                doc.set_attribute(node, "aria-label", "下一页")?;
                doc.set_attribute(node, "data-page", &target.to_string())?;
                doc.set_text(node, if labels { "下一页" } else { "›" })?;
            }
            PaginationItem::Page { page, current } => {
                doc.set_attribute(node, "class", "pagination-btn pagination-page")?;
                doc.set_attribute(node, "aria-label", &format!("第 {page} 页"))?;
                doc.set_attribute(node, "data-page", &page.to_string())?;
                doc.set_text(node, &page.to_string())?;
                if current {
                    doc.add_class(node, "active")?;
                    doc.set_attribute(node, "aria-current", "page")?;
                }
            }
        }

        if item.is_enabled() {
            doc.set_attribute(node, "tabindex", "0")?;
        } else {
            doc.add_class(node, DISABLED_CLASS)?;
            doc.set_attribute(node, "aria-disabled", "true")?;
            doc.set_attribute(node, "tabindex", "-1")?;
        }
        if self.processing.is_some_and(|mark| mark.matches(item)) {
            doc.add_class(node, PROCESSING_CLASS)?;
        }
        Ok(())
    }

    fn release_rendered(&mut self, doc: &mut Document) -> Result<(), DomError> {
        for (item, node) in std::mem::take(&mut self.rendered) {
            self.pool.release(doc, item.role(), node)?;
        }
        Ok(())
    }

    fn drop_root(&mut self, doc: &mut Document) {
        if let Some(root) = self.root.take() {
            // Rendered children go with the root's subtree.
            let _ = doc.drop_node(root);
        }
        self.rendered.clear();
    }

    fn render_fallback(&mut self, doc: &mut Document) {
        self.drop_root(doc);
        if self.fallback.is_some_and(|node| doc.is_connected(node)) {
            return;
        }
        let container = match doc.query_selector(&self.container_selector) {
            Ok(Some(container)) => container,
            Ok(None) | Err(_) => {
                tracing::debug!(selector = %self.container_selector, "no container for pagination fallback");
                return;
            }
        };
        let node = doc.create_element("div");
        let built = doc
            .add_class(node, FALLBACK_CLASS)
            .and_then(|()| doc.set_attribute(node, "role", "alert"))
            .and_then(|()| doc.set_text(node, FALLBACK_MESSAGE))
            .and_then(|()| doc.append_child(container, node));
        match built {
            Ok(()) => self.fallback = Some(node),
            Err(err) => {
                tracing::warn!(error = %err, "pagination fallback failed");
                let _ = doc.drop_node(node);
            }
        }
    }

    fn remove_fallback(&mut self, doc: &mut Document) {
        if let Some(node) = self.fallback.take() {
            let _ = doc.drop_node(node);
        }
    }

    // ===== Interaction =====

    /// Delegated click on `target` or any of its descendants-of-button.
    ///
    /// Returns whether the click was accepted. Accepted clicks mark the
    /// button `processing` and are debounced; [`poll`](Self::poll) yields
    /// the page once the debounce elapses.
    pub fn handle_click(&mut self, doc: &mut Document, target: NodeId, now: Instant) -> bool {
        let Some(button) = doc.closest(target, &self.button_selector) else {
            return false;
        };
        let Some(item) = self
            .rendered
            .iter()
            .find(|(_, node)| *node == button)
            .map(|(item, _)| *item)
        else {
            return false;
        };
        if is_disabled(doc, button) || doc.has_class(button, PROCESSING_CLASS) {
            tracing::debug!(?item, "ignoring click on inactive pagination button");
            return false;
        }
        if matches!(item, PaginationItem::Page { current: true, .. }) {
            return false;
        }
        let Some(page) = doc
            .attribute(button, "data-page")
            .and_then(|value| value.parse::<usize>().ok())
        else {
            return false;
        };

        if let Some(previous) = self.processing.take() {
            self.clear_processing(doc, previous);
        }
        if let Err(err) = doc.add_class(button, PROCESSING_CLASS) {
            tracing::warn!(error = %err, "cannot mark pagination button");
        }
        self.processing = Some(ProcessingMark {
            role: item.role(),
            page,
            clear_at: None,
        });
        self.pending = Some(PendingClick { page });

        if item.role() == ElementRole::Page {
            self.nav_debounce.cancel();
            self.page_debounce.trigger(now);
        } else {
            self.page_debounce.cancel();
            self.nav_debounce.trigger(now);
        }
        true
    }

    /// Fire a due debounced click, returning the requested page.
    ///
    /// The `processing` mark is cleared by [`tick`](Self::tick) once the
    /// clear delay has passed after this call.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let fired = self.page_debounce.poll(now) || self.nav_debounce.poll(now);
        if !fired {
            return None;
        }
        let pending = self.pending.take()?;
        if let Some(mark) = self.processing.as_mut() {
            mark.clear_at = Some(now + PROCESSING_CLEAR_DELAY);
        }
        Some(pending.page)
    }

    /// Clear an expired `processing` mark. Returns whether one was cleared.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) -> bool {
        match self.processing {
            Some(mark) if mark.clear_at.is_some_and(|at| at <= now) => {
                self.processing = None;
                self.clear_processing(doc, mark);
                true
            }
            _ => false,
        }
    }

    fn clear_processing(&self, doc: &mut Document, mark: ProcessingMark) {
        for (item, node) in &self.rendered {
            if mark.matches(item) {
                if let Err(err) = doc.remove_class(*node, PROCESSING_CLASS) {
                    tracing::debug!(error = %err, "processing mark already gone");
                }
            }
        }
    }

    /// Delegated key handling. Returns whether the key was consumed.
    pub fn handle_key(&mut self, doc: &mut Document, key: NavKey, now: Instant) -> bool {
        let buttons: Vec<NodeId> = self
            .rendered
            .iter()
            .filter(|(item, node)| item.role() != ElementRole::Ellipsis && !is_disabled(doc, *node))
            .map(|(_, node)| *node)
            .collect();
        let count = buttons.len();
        if count == 0 {
            return false;
        }
        let focused = doc
            .focused()
            .and_then(|node| buttons.iter().position(|&b| b == node));

        let index = match key {
            NavKey::Left | NavKey::ShiftTab => focused.map_or(count - 1, |i| (i + count - 1) % count),
            NavKey::Right | NavKey::Tab => focused.map_or(0, |i| (i + 1) % count),
            NavKey::Home => 0,
            NavKey::End => count - 1,
            NavKey::Enter | NavKey::Space => {
                return match focused {
                    Some(i) => self.handle_click(doc, buttons[i], now),
                    None => false,
                };
            }
        };
        match doc.focus(buttons[index]) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "cannot move pagination focus");
                false
            }
        }
    }

    /// Remove every element this renderer created and cancel pending work.
    pub fn dispose(&mut self, doc: &mut Document) {
        self.page_debounce.cancel();
        self.nav_debounce.cancel();
        self.pending = None;
        self.processing = None;
        self.drop_root(doc);
        self.remove_fallback(doc);
        self.pool.clear(doc);
        self.signature = None;
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
