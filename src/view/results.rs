//! Result list rendering.

use crate::dom::{Document, NodeId};
use crate::model::index::{EntryId, EntryKind, IndexEntry};
use crate::pagination::RenderError;
use crate::worker::SearchHit;

use super::virtual_window::{VirtualWindow, WindowSlice};

/// Class of bookmark rows.
pub const BOOKMARK_CLASS: &str = "bookmark-item";
/// Class of folder rows.
pub const FOLDER_CLASS: &str = "folder-item";
/// Class of the spacers standing in for off-screen rows.
pub const SPACER_CLASS: &str = "virtual-spacer";
/// Class of the placeholder shown for an empty list.
pub const EMPTY_CLASS: &str = "empty-state";
/// Placeholder text for an empty list.
pub const EMPTY_MESSAGE: &str = "没有找到书签";

/// One row of the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    /// Folder or bookmark.
    pub kind: EntryKind,
    /// Index id, when known.
    pub id: Option<EntryId>,
    /// Display title.
    pub title: String,
    /// Bookmark URL.
    pub url: Option<String>,
    /// Ancestor titles joined by `/`.
    pub path: String,
    /// Direct children of a folder.
    pub children_count: usize,
}

impl From<&IndexEntry> for ResultItem {
    fn from(entry: &IndexEntry) -> Self {
        Self {
            kind: entry.kind,
            id: Some(entry.id),
            title: entry.title.clone(),
            url: (!entry.is_folder()).then(|| entry.url.clone()),
            path: entry.path.clone(),
            children_count: entry.children_count,
        }
    }
}

impl From<SearchHit> for ResultItem {
    fn from(hit: SearchHit) -> Self {
        Self {
            kind: hit.kind,
            id: None,
            title: hit.title,
            url: hit.url,
            path: hit.path,
            children_count: 0,
        }
    }
}

/// Renders a page of results into the list container, windowed.
#[derive(Debug)]
pub struct ResultsView {
    container_selector: String,
    window: VirtualWindow,
    scroll_top: u64,
    slice: WindowSlice,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self::new(crate::config::constants::RESULTS_CONTAINER_SELECTOR, VirtualWindow::default())
    }
}

impl ResultsView {
    /// View rendering into `container_selector`.
    pub fn new(container_selector: impl Into<String>, window: VirtualWindow) -> Self {
        Self {
            container_selector: container_selector.into(),
            window,
            scroll_top: 0,
            slice: WindowSlice::default(),
        }
    }

    /// Windowing parameters.
    pub fn window(&self) -> VirtualWindow {
        self.window
    }

    /// Slice rendered last.
    pub fn slice(&self) -> WindowSlice {
        self.slice
    }

    /// Current scroll offset.
    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    /// Set the scroll offset; takes effect on the next render.
    pub fn set_scroll_top(&mut self, scroll_top: u64) {
        self.scroll_top = scroll_top;
    }

    /// Replace the container's content with the windowed `items`.
    ///
    /// # Errors
    ///
    /// `MissingContainer` when the container is absent, `Dom` on a failed write.
    pub fn render(&mut self, doc: &mut Document, items: &[ResultItem]) -> Result<WindowSlice, RenderError> {
        let container = doc
            .query_selector(&self.container_selector)?
            .ok_or_else(|| RenderError::MissingContainer(self.container_selector.clone()))?;
        for child in doc.take_children(container)? {
            doc.drop_node(child)?;
        }

        if items.is_empty() {
            let empty = doc.create_element("div");
            doc.set_attribute(empty, "class", EMPTY_CLASS)?;
            doc.set_text(empty, EMPTY_MESSAGE)?;
            doc.append_child(container, empty)?;
            self.slice = WindowSlice::default();
            return Ok(self.slice);
        }

        let slice = self.window.slice(items.len(), self.scroll_top);
        append_spacer(doc, container, slice.offset_top)?;
        for item in &items[slice.range()] {
            let row = create_row(doc, item)?;
            doc.append_child(container, row)?;
        }
        append_spacer(doc, container, slice.offset_bottom)?;

        tracing::trace!(rows = slice.len(), total = items.len(), "results rendered");
        self.slice = slice;
        Ok(slice)
    }
}

fn append_spacer(doc: &mut Document, container: NodeId, height: u64) -> Result<(), RenderError> {
    if height == 0 {
        return Ok(());
    }
    let spacer = doc.create_element("div");
    doc.set_attribute(spacer, "class", SPACER_CLASS)?;
    doc.set_attribute(spacer, "aria-hidden", "true")?;
    doc.set_style(spacer, "height", &format!("{height}px"))?;
    doc.append_child(container, spacer)?;
    Ok(())
}

fn create_row(doc: &mut Document, item: &ResultItem) -> Result<NodeId, RenderError> {
    let row = match item.kind {
        EntryKind::Folder => {
            let row = doc.create_element("div");
            doc.set_attribute(row, "class", FOLDER_CLASS)?;
            if let Some(id) = item.id {
                doc.set_attribute(row, "data-id", &id.to_string())?;
            }
            doc.set_attribute(row, "data-count", &item.children_count.to_string())?;
            row
        }
        EntryKind::Bookmark => {
            let row = doc.create_element("a");
            doc.set_attribute(row, "class", BOOKMARK_CLASS)?;
            doc.set_attribute(row, "href", item.url.as_deref().unwrap_or_default())?;
            doc.set_attribute(row, "target", "_blank")?;
            doc.set_attribute(row, "rel", "noopener noreferrer")?;
            row
        }
    };
    if !item.path.is_empty() {
        doc.set_attribute(row, "title", &item.path)?;
    }
    doc.set_text(row, &item.title)?;
    Ok(row)
}
