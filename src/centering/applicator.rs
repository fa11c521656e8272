//! Batched style writes.
//!
//! Style changes are queued per selector and written in one pass when the
//! next frame runs. Element lookups are cached until the element leaves
//! the document.

use std::collections::HashMap;

use super::calculator::{StyleMap, StyleValue};
use crate::dom::{DomError, Document, NodeId};
use crate::events::FrameScheduler;

/// Outcome of a flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Elements whose styles were written.
    pub applied: usize,
    /// Queued elements that could not be found or written.
    pub skipped: usize,
}

/// Queues and applies inline styles.
#[derive(Debug, Default)]
pub struct StyleApplicator {
    nodes: HashMap<String, NodeId>,
    queue: Vec<(String, StyleMap)>,
    frame: FrameScheduler,
}

impl StyleApplicator {
    /// Applicator with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `styles` for `selector`, replacing any queued write for it.
    pub fn queue(&mut self, selector: &str, styles: StyleMap) {
        match self.queue.iter_mut().find(|(s, _)| s == selector) {
            Some((_, queued)) => *queued = styles,
            None => self.queue.push((selector.to_string(), styles)),
        }
        self.frame.request();
    }

    /// Whether writes are waiting for a frame.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Run the frame: apply every queued write in queue order.
    pub fn flush(&mut self, doc: &mut Document) -> FlushReport {
        if !self.frame.take() {
            return FlushReport::default();
        }
        let mut report = FlushReport::default();
        for (selector, styles) in std::mem::take(&mut self.queue) {
            match self.write(doc, &selector, &styles) {
                Ok(true) => report.applied += 1,
                Ok(false) => {
                    tracing::debug!(selector = %selector, "centered element not in document");
                    report.skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(selector = %selector, error = %err, "failed to apply centering styles");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Apply `styles` to `selector` immediately.
    ///
    /// Returns `Ok(false)` when no element matches.
    pub fn write(&mut self, doc: &mut Document, selector: &str, styles: &StyleMap) -> Result<bool, DomError> {
        let Some(node) = self.lookup(doc, selector)? else {
            return Ok(false);
        };
        for (property, value) in styles {
            match value {
                StyleValue::Set(value) => doc.set_style(node, property, value)?,
                StyleValue::Clear => doc.remove_style(node, property)?,
            }
        }
        Ok(true)
    }

    /// Element for `selector`, cached while it stays connected.
    pub fn lookup(&mut self, doc: &Document, selector: &str) -> Result<Option<NodeId>, DomError> {
        if let Some(&node) = self.nodes.get(selector) {
            if doc.is_connected(node) {
                return Ok(Some(node));
            }
            self.nodes.remove(selector);
        }
        let found = doc.query_selector(selector)?;
        if let Some(node) = found {
            self.nodes.insert(selector.to_string(), node);
        }
        Ok(found)
    }

    /// Drop the cached lookup and any queued write for `selector`.
    pub fn forget(&mut self, selector: &str) {
        self.nodes.remove(selector);
        self.queue.retain(|(s, _)| s != selector);
    }

    /// Drop all queued writes and the pending frame.
    pub fn cancel(&mut self) {
        self.queue.clear();
        self.frame.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(id: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.set_attribute(node, "id", id).unwrap();
        doc.append_child(doc.body(), node).unwrap();
        (doc, node)
    }

    #[test]
    fn writes_wait_for_the_frame() {
        let (mut doc, node) = doc_with("toolbar");
        let mut applicator = StyleApplicator::new();
        applicator.queue("#toolbar", vec![("left", StyleValue::Set("50%".into()))]);
        assert_eq!(doc.style(node, "left"), None);

        let report = applicator.flush(&mut doc);
        assert_eq!(report, FlushReport { applied: 1, skipped: 0 });
        assert_eq!(doc.style(node, "left"), Some("50%"));
        assert_eq!(applicator.flush(&mut doc), FlushReport::default());
    }

    #[test]
    fn later_queue_replaces_earlier_write() {
        let (mut doc, node) = doc_with("toolbar");
        let mut applicator = StyleApplicator::new();
        applicator.queue("#toolbar", vec![("top", StyleValue::Set("1px".into()))]);
        applicator.queue("#toolbar", vec![("top", StyleValue::Set("2px".into()))]);
        assert_eq!(applicator.flush(&mut doc).applied, 1);
        assert_eq!(doc.style(node, "top"), Some("2px"));
    }

    #[test]
    fn missing_and_invalid_selectors_are_skipped() {
        let (mut doc, node) = doc_with("toolbar");
        let mut applicator = StyleApplicator::new();
        applicator.queue("#ghost", vec![("top", StyleValue::Clear)]);
        applicator.queue("a b", vec![("top", StyleValue::Clear)]);
        applicator.queue("#toolbar", vec![("top", StyleValue::Set("0".into()))]);

        let report = applicator.flush(&mut doc);
        assert_eq!(report, FlushReport { applied: 1, skipped: 2 });
        assert_eq!(doc.style(node, "top"), Some("0"));
    }

    #[test]
    fn lookup_cache_is_invalidated_when_element_leaves() {
        let (mut doc, old) = doc_with("toolbar");
        let mut applicator = StyleApplicator::new();
        assert_eq!(applicator.lookup(&doc, "#toolbar").unwrap(), Some(old));

        doc.drop_node(old).unwrap();
        let replacement = doc.create_element("div");
        doc.set_attribute(replacement, "id", "toolbar").unwrap();
        doc.append_child(doc.body(), replacement).unwrap();
        assert_eq!(applicator.lookup(&doc, "#toolbar").unwrap(), Some(replacement));
    }

    #[test]
    fn cancel_drops_queued_writes() {
        let (mut doc, node) = doc_with("toolbar");
        let mut applicator = StyleApplicator::new();
        applicator.queue("#toolbar", vec![("top", StyleValue::Set("1px".into()))]);
        applicator.cancel();
        assert!(!applicator.has_pending());
        applicator.flush(&mut doc);
        assert_eq!(doc.style(node, "top"), None);
    }
}
