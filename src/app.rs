//! Application root.
//!
//! [`App`] owns every service and the document they render into. Input
//! arrives through explicit calls (`resize`, `click`, `key`, `tick`,
//! `frame`); layout notifications travel over the internal [`EventBus`]
//! and are routed to the subsystems that care about them. Nothing here is
//! global: `create` wires the services and `dispose` tears them down.

use std::collections::HashMap;
use std::time::Instant;

use crate::cache::{BookmarkCache, FileStore, KeyValueStore};
use crate::centering::{
    CenteringManager, ElementRegistration, FlushReport, Positioning, PositioningRule,
    VerticalAnchor,
};
use crate::config::constants::{
    DEFAULT_ITEMS_PER_PAGE, DEFAULT_MAX_VISIBLE_PAGES, PAGINATION_CONTAINER_SELECTOR,
    RESULTS_CONTAINER_SELECTOR, SIDEBAR_COLLAPSED_ATTR, SIDEBAR_COLLAPSED_CLASS, SIDEBAR_SELECTOR,
    WORKER_TIMEOUT,
};
use crate::config::ResolvedConfig;
use crate::dom::{Document, DomError, NodeId, Selector};
use crate::events::{EventBus, LayoutChangeEmitter, LayoutEvent};
use crate::model::error::{AppError, LoadError, ValidationError, WorkerError};
use crate::model::index::{EntryId, EntryKind, IndexEntry};
use crate::pagination::{
    NavKey, PaginationConfig, PaginationController, PaginationRenderer, PaginationState,
    RenderOptions,
};
use crate::query::{HistoryMirror, SearchParams};
use crate::responsive::{ResponsiveConfigManager, ResponsiveProfile};
use crate::sidebar::SidebarStateMonitor;
use crate::source::{BookmarkSource, LoadOrigin};
use crate::view::results::FOLDER_CLASS;
use crate::view::{ErrorPanel, ResultItem, ResultsView};
use crate::worker::search::search_worker;
use crate::worker::{LoadedBookmarks, SearchHit, SearchRequest, SearchResponse};
use crate::worker::LazyWorker;

/// Boxed store so the cache backend can be chosen at runtime.
pub type DynStore = Box<dyn KeyValueStore>;

/// What the result list is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Children of a folder; `None` is the top level.
    Folder(Option<EntryId>),
    /// Hits for a keyword.
    Search(String),
}

/// Build the document skeleton the app renders into: a sidebar, the result
/// list and the pagination container.
pub fn page_skeleton(sidebar_collapsed: bool) -> Result<Document, DomError> {
    let mut doc = Document::new();
    let body = doc.body();

    let sidebar = doc.create_element("aside");
    doc.set_attribute(sidebar, "id", "sidebar")?;
    if sidebar_collapsed {
        doc.add_class(sidebar, SIDEBAR_COLLAPSED_CLASS)?;
    }
    doc.append_child(body, sidebar)?;

    let main = doc.create_element("main");
    doc.append_child(body, main)?;
    for selector in [RESULTS_CONTAINER_SELECTOR, PAGINATION_CONTAINER_SELECTOR] {
        let container = doc.create_element("div");
        doc.set_attribute(container, "id", selector.trim_start_matches('#'))?;
        doc.append_child(main, container)?;
    }
    Ok(doc)
}

fn default_registrations() -> Vec<(&'static str, ElementRegistration)> {
    vec![(
        "pagination",
        ElementRegistration::new(
            PAGINATION_CONTAINER_SELECTOR,
            Positioning {
                mobile: PositioningRule::FixedCenter {
                    anchor: VerticalAnchor::Bottom("16px".to_string()),
                },
                desktop: PositioningRule::FixedCenter {
                    anchor: VerticalAnchor::Bottom("24px".to_string()),
                },
            },
        )
        .with_z_index(100)
        .with_centering_offset(),
    )]
}

fn pagination_config(
    config: &ResolvedConfig,
    profile: &ResponsiveProfile,
) -> Result<PaginationConfig, ValidationError> {
    let (items_per_page, max_visible_pages) = if config.responsive {
        (profile.items_per_page, profile.max_visible_pages)
    } else {
        (DEFAULT_ITEMS_PER_PAGE, DEFAULT_MAX_VISIBLE_PAGES)
    };
    Ok(PaginationConfig {
        show_first_last: config.show_first_last,
        show_prev_next: config.show_prev_next,
        responsive: config.responsive,
        ..PaginationConfig::new(items_per_page, max_visible_pages)?
    })
}

fn page_arg(page: usize) -> i64 {
    i64::try_from(page).unwrap_or(i64::MAX)
}

/// Root context owning every service.
pub struct App {
    config: ResolvedConfig,
    doc: Document,
    bus: EventBus,
    layout_emitter: LayoutChangeEmitter,
    responsive: ResponsiveConfigManager,
    sidebar: SidebarStateMonitor,
    centering: CenteringManager,
    controller: PaginationController,
    renderer: PaginationRenderer,
    results: ResultsView,
    error_panel: ErrorPanel,
    history: HistoryMirror,
    source: BookmarkSource<DynStore>,
    search_worker: LazyWorker<SearchRequest, SearchResponse>,
    folder_selector: Selector,
    bookmarks: Option<LoadedBookmarks>,
    mode: Mode,
    items: Vec<ResultItem>,
    disposed: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("mode", &self.mode)
            .field("items", &self.items.len())
            .field("state", self.controller.state())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Wire every service over `doc`, caching in `config.cache_dir` when enabled.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` if the derived pagination config is invalid.
    pub fn create(config: ResolvedConfig, doc: Document) -> Result<Self, AppError> {
        let store = config
            .use_cache
            .then(|| Box::new(FileStore::new(config.cache_dir.clone())) as DynStore);
        Self::create_with_store(config, doc, store)
    }

    /// Like [`create`](Self::create) with an explicit cache store.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` if the derived pagination config is invalid.
    pub fn create_with_store(
        config: ResolvedConfig,
        mut doc: Document,
        store: Option<DynStore>,
    ) -> Result<Self, AppError> {
        let width = config.viewport_width;
        let responsive = ResponsiveConfigManager::new(width);
        let profile = *responsive.current();
        let controller = PaginationController::new(pagination_config(&config, &profile)?)?;

        let mut renderer = PaginationRenderer::default();
        if config.responsive {
            renderer.set_options(RenderOptions::from_profile(&profile));
        }

        let sidebar = SidebarStateMonitor::new(&mut doc, width);
        let mut centering = CenteringManager::new(sidebar.state());
        for (key, registration) in default_registrations() {
            centering.register(key, registration);
        }

        let bus = EventBus::new();
        let layout_emitter = LayoutChangeEmitter::new(bus.sender());
        let source = BookmarkSource::new(config.data_path.clone(), store.map(BookmarkCache::new));

        tracing::info!(
            data = %config.data_path.display(),
            width,
            profile = profile.kind.as_str(),
            cache = config.use_cache,
            "app created"
        );

        Ok(Self {
            config,
            doc,
            bus,
            layout_emitter,
            responsive,
            sidebar,
            centering,
            controller,
            renderer,
            results: ResultsView::default(),
            error_panel: ErrorPanel::new(),
            history: HistoryMirror::default(),
            source,
            search_worker: search_worker(),
            folder_selector: Selector::class(FOLDER_CLASS),
            bookmarks: None,
            mode: Mode::Folder(None),
            items: Vec::new(),
            disposed: false,
        })
    }

    // ===== Accessors =====

    /// Resolved configuration.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The document rendered into.
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Mutable document, for hosts that edit it directly.
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Current pagination state.
    pub fn state(&self) -> &PaginationState {
        self.controller.state()
    }

    /// Current pagination config.
    pub fn pagination_config(&self) -> &PaginationConfig {
        self.controller.config()
    }

    /// Active responsive profile.
    pub fn profile(&self) -> &ResponsiveProfile {
        self.responsive.current()
    }

    /// Centering manager.
    pub fn centering(&self) -> &CenteringManager {
        &self.centering
    }

    /// Mirrored location history.
    pub fn history(&self) -> &HistoryMirror {
        &self.history
    }

    /// Loaded bookmarks.
    pub fn bookmarks(&self) -> Option<&LoadedBookmarks> {
        self.bookmarks.as_ref()
    }

    /// What the list shows.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Every item of the current listing.
    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    /// Items on the current page.
    pub fn page_items(&self) -> &[ResultItem] {
        self.items.get(self.controller.state().range()).unwrap_or_default()
    }

    /// Whether the load error panel is shown.
    pub fn has_error(&self) -> bool {
        self.error_panel.is_visible(&self.doc)
    }

    /// Whether [`dispose`](Self::dispose) ran.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ===== Data =====

    /// Seed the history from a location query (`?q=..&page=..`). Applied by
    /// the next [`load`](Self::load).
    pub fn restore_location(&mut self, query: &str) {
        self.history = HistoryMirror::from_location(query);
    }

    /// Load bookmarks, then show the mirrored search or the top level.
    ///
    /// # Errors
    ///
    /// The load error when neither the resource nor the cache could be
    /// used; the error panel is shown in that case.
    pub fn load(&mut self) -> Result<LoadOrigin, LoadError> {
        match self.source.load() {
            Ok(outcome) => {
                self.error_panel.hide(&mut self.doc);
                if let Some(reason) = &outcome.fallback_reason {
                    tracing::warn!(error = %reason, "using cached bookmarks");
                }
                tracing::info!(
                    entries = outcome.bookmarks.index.len(),
                    origin = ?outcome.origin,
                    "bookmarks ready"
                );
                self.bookmarks = Some(outcome.bookmarks);
                self.restore_view();
                Ok(outcome.origin)
            }
            Err(err) => {
                if let Err(dom_err) = self.error_panel.show(&mut self.doc, &err.user_message()) {
                    tracing::warn!(error = %dom_err, "cannot show error panel");
                }
                Err(err)
            }
        }
    }

    fn restore_view(&mut self) {
        let params = self.history.current().clone();
        match params.q.as_deref() {
            Some(keyword) => {
                if let Err(err) = self.search(keyword) {
                    tracing::warn!(keyword, error = %err, "cannot restore search");
                }
            }
            None => {
                self.open_folder(None);
            }
        }
        if let Some(page) = params.page.filter(|&page| page > 1) {
            self.go_to_page(page);
        }
    }

    /// Search titles and URLs for `keyword` on the search worker.
    ///
    /// Returns to page 1 and mirrors `q`/`page`. A blank keyword shows the
    /// top level instead. Returns the hit count.
    ///
    /// # Errors
    ///
    /// Worker failures; the worker is discarded and rebuilt on next use,
    /// and the current listing is kept.
    pub fn search(&mut self, keyword: &str) -> Result<usize, WorkerError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.open_folder(None);
            return Ok(self.items.len());
        }

        let tree = self
            .bookmarks
            .as_ref()
            .map(|loaded| loaded.tree.clone())
            .unwrap_or_default();
        let request = SearchRequest::Search {
            keyword: keyword.to_string(),
            bookmarks: tree,
        };
        let response = match self
            .search_worker
            .request(request)
            .and_then(|pending| pending.wait(WORKER_TIMEOUT))
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(keyword, error = %err, "search failed");
                self.search_worker.discard();
                return Err(err);
            }
        };
        // One request per worker; the next search starts a fresh thread.
        self.search_worker.terminate();

        let mut seen: HashMap<(String, String), usize> = HashMap::new();
        let items: Vec<ResultItem> = response
            .into_hits()
            .into_iter()
            .map(|hit| {
                let nth = match hit.kind {
                    EntryKind::Folder => {
                        let count = seen.entry((hit.title.clone(), hit.path.clone())).or_default();
                        *count += 1;
                        *count - 1
                    }
                    EntryKind::Bookmark => 0,
                };
                self.item_from_hit(hit, nth)
            })
            .collect();
        let count = items.len();
        tracing::debug!(keyword, hits = count, "search results shown");

        self.mode = Mode::Search(keyword.to_string());
        self.show_items(items);
        self.mirror(Some(keyword.to_string()), 1);
        Ok(count)
    }

    // Folder hits carry no id. Hits and the index are both in preorder, so
    // the `nth` hit with a given title and path is the `nth` such folder.
    fn item_from_hit(&self, hit: SearchHit, nth: usize) -> ResultItem {
        let entry = match (&self.bookmarks, hit.kind) {
            (Some(loaded), EntryKind::Folder) => loaded
                .index
                .folders()
                .filter(|entry| entry.title == hit.title && entry.path == hit.path)
                .nth(nth),
            _ => None,
        };
        match entry {
            Some(entry) => ResultItem::from(entry),
            None => ResultItem::from(hit),
        }
    }

    /// List the children of folder `id` (`None` for the top level).
    ///
    /// Returns `false` for unknown ids, non-folders, or before a load.
    pub fn open_folder(&mut self, id: Option<EntryId>) -> bool {
        let Some(loaded) = self.bookmarks.as_ref() else {
            return false;
        };
        if let Some(id) = id {
            if !loaded.index.get(id).is_some_and(|entry| entry.is_folder()) {
                tracing::debug!(id, "not a folder");
                return false;
            }
        }
        let items = loaded
            .index
            .children_of(id)
            .into_iter()
            .map(ResultItem::from)
            .collect();

        self.mode = Mode::Folder(id);
        self.show_items(items);
        self.mirror(None, 1);
        true
    }

    /// Folder chain from the top level to the open folder. Empty at the top
    /// level and while searching.
    pub fn breadcrumb(&self) -> Vec<&IndexEntry> {
        match (&self.mode, &self.bookmarks) {
            (Mode::Folder(Some(id)), Some(loaded)) => loaded.index.breadcrumb(*id),
            _ => Vec::new(),
        }
    }

    fn show_items(&mut self, items: Vec<ResultItem>) {
        self.items = items;
        if let Err(err) = self.controller.reset(page_arg(self.items.len())) {
            tracing::warn!(error = %err, "cannot paginate listing");
        }
        self.results.set_scroll_top(0);
        self.render_page();
    }

    fn mirror(&mut self, q: Option<String>, page: usize) {
        let mut params: SearchParams = self.history.current().clone();
        params.q = q;
        params.page = Some(page);
        self.history.replace(params);
    }

    // ===== Paging =====

    /// Move to `page`. Returns whether the page changed.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if !self.controller.handle_page_change(page_arg(page)) {
            return false;
        }
        self.results.set_scroll_top(0);
        self.render_page();
        let q = self.history.current().q.clone();
        self.mirror(q, page);
        true
    }

    fn render_page(&mut self) {
        let state = self.controller.state().clone();
        let config = *self.controller.config();
        self.renderer.render(&mut self.doc, &state, &config);
        self.render_results();
    }

    fn render_results(&mut self) {
        let range = self.controller.state().range();
        let slice = self.items.get(range).unwrap_or_default();
        if let Err(err) = self.results.render(&mut self.doc, slice) {
            tracing::warn!(error = %err, "cannot render results");
        }
    }

    /// Scroll the result list, re-rendering its virtual window.
    pub fn scroll_results(&mut self, scroll_top: u64) {
        self.results.set_scroll_top(scroll_top);
        self.render_results();
    }

    // ===== Input =====

    /// Delegated click on `target`. Returns whether it was handled.
    ///
    /// Pagination clicks are debounced and complete on a later
    /// [`tick`](Self::tick); folder rows open immediately.
    pub fn click(&mut self, target: NodeId, now: Instant) -> bool {
        if self.renderer.handle_click(&mut self.doc, target, now) {
            return true;
        }
        let Some(row) = self.doc.closest(target, &self.folder_selector) else {
            return false;
        };
        match self
            .doc
            .attribute(row, "data-id")
            .and_then(|id| id.parse::<EntryId>().ok())
        {
            Some(id) => self.open_folder(Some(id)),
            None => false,
        }
    }

    /// Delegated key press on the pagination row.
    pub fn key(&mut self, key: NavKey, now: Instant) -> bool {
        self.renderer.handle_key(&mut self.doc, key, now)
    }

    /// Viewport resized or rotated.
    pub fn resize(&mut self, width: u32, now: Instant) {
        self.bus.publish(LayoutEvent::ViewportChanged { width });
        self.process_events(now);
    }

    /// Collapse or expand the sidebar element. Returns `false` without one.
    pub fn set_sidebar_collapsed(&mut self, collapsed: bool, now: Instant) -> bool {
        let sidebar = match self.doc.query_selector(SIDEBAR_SELECTOR) {
            Ok(Some(node)) => node,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(error = %err, "invalid sidebar selector");
                return false;
            }
        };
        let written = self
            .doc
            .toggle_class(sidebar, SIDEBAR_COLLAPSED_CLASS, collapsed)
            .and_then(|()| {
                self.doc.set_attribute(
                    sidebar,
                    SIDEBAR_COLLAPSED_ATTR,
                    if collapsed { "true" } else { "false" },
                )
            });
        if let Err(err) = written {
            tracing::warn!(error = %err, "cannot toggle sidebar");
            return false;
        }
        self.poll_sidebar(now);
        true
    }

    /// Override the dynamic centering offset (a CSS length).
    pub fn set_centering_offset(&mut self, offset: &str, now: Instant) {
        self.bus.publish(LayoutEvent::CenteringOffsetChanged {
            offset: offset.to_string(),
        });
        self.process_events(now);
    }

    /// Report a layout shift; published once input goes quiet.
    pub fn notify_layout_change(&mut self, now: Instant) {
        self.layout_emitter.notify(now);
    }

    // ===== Scheduling =====

    /// Fire due timers and complete pending page actions.
    pub fn tick(&mut self, now: Instant) {
        self.layout_emitter.tick(now);
        self.poll_sidebar(now);
        self.centering.tick(now);
        if let Some(page) = self.renderer.poll(now) {
            self.go_to_page(page);
        }
        self.renderer.tick(&mut self.doc, now);
    }

    /// Run animation-frame work: responsive and sidebar width updates, then
    /// the batched centering style writes.
    ///
    /// Sidebar changes detected here reach the centering manager on the
    /// next [`tick`](Self::tick).
    pub fn frame(&mut self) -> FlushReport {
        if let Some(profile) = self.responsive.on_frame() {
            self.apply_profile(&profile);
        }
        if let Some(state) = self.sidebar.on_frame() {
            self.bus.publish(LayoutEvent::SidebarChanged(state));
        }
        self.centering.flush_frame(&mut self.doc)
    }

    fn apply_profile(&mut self, profile: &ResponsiveProfile) {
        if !self.config.responsive {
            return;
        }
        self.renderer.set_options(RenderOptions::from_profile(profile));
        if self.controller.apply_profile(profile) {
            let page = self.controller.state().current_page;
            let q = self.history.current().q.clone();
            self.mirror(q, page);
        }
        self.results.set_scroll_top(0);
        self.render_page();
    }

    fn poll_sidebar(&mut self, now: Instant) {
        if let Some(state) = self.sidebar.poll_mutations(&mut self.doc) {
            self.bus.publish(LayoutEvent::SidebarChanged(state));
        }
        self.process_events(now);
    }

    fn process_events(&mut self, now: Instant) {
        for event in self.bus.drain() {
            if let LayoutEvent::ViewportChanged { width } = event {
                self.responsive.on_resize(width);
                self.sidebar.on_resize(width);
            }
            self.centering.on_event(&event, now);
        }
    }

    // ===== Lifecycle =====

    /// Cancel timers and frames, clear centering styles, drop workers.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.renderer.dispose(&mut self.doc);
        self.centering.dispose(&mut self.doc);
        self.sidebar.dispose(&mut self.doc);
        self.responsive.dispose();
        self.layout_emitter.cancel();
        self.search_worker.terminate();
        self.error_panel.hide(&mut self.doc);
        self.bus.drain();
        self.disposed = true;
        tracing::debug!("app disposed");
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
