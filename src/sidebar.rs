//! Sidebar State Monitor.
//!
//! Combines frame-coalesced viewport width tracking with attribute
//! observation on the sidebar element. Listeners fire only when either
//! field actually changes.

use crate::config::constants::{
    SIDEBAR_COLLAPSED_ATTR, SIDEBAR_COLLAPSED_CLASS, SIDEBAR_SELECTOR,
};
use crate::dom::{Document, NodeId, ObserverId};
use crate::events::{FrameScheduler, ListenerSet, SubscriptionId};

/// Observed sidebar state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SidebarState {
    /// Sidebar collapsed to its icon rail (or absent).
    pub is_collapsed: bool,
    /// Viewport width in CSS pixels.
    pub screen_width: u32,
}

/// Read the collapse flag from the sidebar element.
pub fn read_collapsed(doc: &Document, sidebar: NodeId) -> bool {
    doc.has_class(sidebar, SIDEBAR_COLLAPSED_CLASS)
        || doc.attribute(sidebar, SIDEBAR_COLLAPSED_ATTR).as_deref() == Some("true")
}

/// Tracks `{is_collapsed, screen_width}` for one sidebar element.
#[derive(Debug)]
pub struct SidebarStateMonitor {
    state: SidebarState,
    sidebar: Option<NodeId>,
    observer: Option<ObserverId>,
    pending_width: Option<u32>,
    frame: FrameScheduler,
    listeners: ListenerSet<SidebarState>,
}

impl SidebarStateMonitor {
    /// Attach to the default sidebar element.
    pub fn new(doc: &mut Document, screen_width: u32) -> Self {
        Self::with_selector(doc, SIDEBAR_SELECTOR, screen_width)
    }

    /// Attach to the element matching `selector`.
    ///
    /// Without a matching element the monitor reports a collapsed sidebar
    /// permanently and never observes attributes.
    pub fn with_selector(doc: &mut Document, selector: &str, screen_width: u32) -> Self {
        let sidebar = match doc.query_selector(selector) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(selector, error = %err, "invalid sidebar selector");
                None
            }
        };

        let observer = sidebar.and_then(|node| {
            doc.observe_attributes(node, &["class", SIDEBAR_COLLAPSED_ATTR])
                .map_err(|err| tracing::warn!(error = %err, "cannot observe sidebar"))
                .ok()
        });

        if sidebar.is_none() {
            tracing::debug!(selector, "sidebar not found; assuming collapsed");
        }

        let is_collapsed = sidebar.map_or(true, |node| read_collapsed(doc, node));
        Self {
            state: SidebarState {
                is_collapsed,
                screen_width,
            },
            sidebar,
            observer,
            pending_width: None,
            frame: FrameScheduler::new(),
            listeners: ListenerSet::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SidebarState {
        self.state
    }

    /// Whether a sidebar element was found.
    pub fn is_attached(&self) -> bool {
        self.sidebar.is_some()
    }

    /// Record a viewport width change; applied on the next frame.
    pub fn on_resize(&mut self, width: u32) {
        self.pending_width = Some(width);
        self.frame.request();
    }

    /// Apply the coalesced width change.
    pub fn on_frame(&mut self) -> Option<SidebarState> {
        if !self.frame.take() {
            return None;
        }
        let width = self.pending_width.take()?;
        self.apply(SidebarState {
            screen_width: width,
            ..self.state
        })
    }

    /// Process pending attribute mutations on the sidebar.
    pub fn poll_mutations(&mut self, doc: &mut Document) -> Option<SidebarState> {
        let (observer, sidebar) = (self.observer?, self.sidebar?);
        if doc.take_records(observer).is_empty() {
            return None;
        }
        self.apply(SidebarState {
            is_collapsed: read_collapsed(doc, sidebar),
            ..self.state
        })
    }

    fn apply(&mut self, next: SidebarState) -> Option<SidebarState> {
        if next == self.state {
            return None;
        }
        self.state = next;
        self.listeners.notify(&next);
        Some(next)
    }

    /// Register a change listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SidebarState) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Disconnect the observer, cancel the pending frame, drop listeners.
    pub fn dispose(&mut self, doc: &mut Document) {
        if let Some(observer) = self.observer.take() {
            doc.disconnect(observer);
        }
        self.frame.cancel();
        self.pending_width = None;
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn doc_with_sidebar() -> (Document, NodeId) {
        let mut doc = Document::new();
        let sidebar = doc.create_element("aside");
        doc.set_attribute(sidebar, "id", "sidebar").unwrap();
        doc.append_child(doc.body(), sidebar).unwrap();
        (doc, sidebar)
    }

    #[test]
    fn missing_sidebar_reports_collapsed_forever() {
        let mut doc = Document::new();
        let mut monitor = SidebarStateMonitor::new(&mut doc, 1280);
        assert!(!monitor.is_attached());
        assert!(monitor.state().is_collapsed);
        assert_eq!(monitor.poll_mutations(&mut doc), None);
    }

    #[test]
    fn class_toggle_is_observed() {
        let (mut doc, sidebar) = doc_with_sidebar();
        let mut monitor = SidebarStateMonitor::new(&mut doc, 1280);
        assert!(!monitor.state().is_collapsed);

        doc.add_class(sidebar, "collapsed").unwrap();
        assert_eq!(
            monitor.poll_mutations(&mut doc),
            Some(SidebarState {
                is_collapsed: true,
                screen_width: 1280
            })
        );
        assert_eq!(monitor.poll_mutations(&mut doc), None, "records drained");
    }

    #[test]
    fn data_attribute_counts_as_collapsed() {
        let (mut doc, sidebar) = doc_with_sidebar();
        let mut monitor = SidebarStateMonitor::new(&mut doc, 1280);
        doc.set_attribute(sidebar, "data-collapsed", "true").unwrap();
        assert!(monitor.poll_mutations(&mut doc).unwrap().is_collapsed);
    }

    #[test]
    fn unrelated_class_changes_do_not_notify() {
        let (mut doc, sidebar) = doc_with_sidebar();
        let count = Rc::new(RefCell::new(0));
        let mut monitor = SidebarStateMonitor::new(&mut doc, 1280);
        let sink = Rc::clone(&count);
        monitor.subscribe(move |_| *sink.borrow_mut() += 1);

        doc.add_class(sidebar, "shadow").unwrap();
        assert_eq!(monitor.poll_mutations(&mut doc), None);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn width_changes_are_frame_coalesced() {
        let (mut doc, _) = doc_with_sidebar();
        let mut monitor = SidebarStateMonitor::new(&mut doc, 1280);

        monitor.on_resize(900);
        monitor.on_resize(1000);
        assert_eq!(monitor.on_frame().map(|s| s.screen_width), Some(1000));
        assert_eq!(monitor.on_frame(), None);

        monitor.on_resize(1000);
        assert_eq!(monitor.on_frame(), None, "unchanged width does not notify");
    }

    #[test]
    fn dispose_disconnects_observer() {
        let (mut doc, sidebar) = doc_with_sidebar();
        let mut monitor = SidebarStateMonitor::new(&mut doc, 1280);
        monitor.dispose(&mut doc);
        doc.add_class(sidebar, "collapsed").unwrap();
        assert_eq!(monitor.poll_mutations(&mut doc), None);
    }
}
