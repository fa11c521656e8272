//! Element pool keyed by role.
//!
//! Released elements are detached and reset, then kept on a per-role free
//! list up to `capacity`; anything beyond that is dropped from the document.

use std::collections::HashMap;
use std::hash::Hash;

use crate::dom::{DomError, Document, NodeId};

/// Clears an element before it returns to the free list.
pub type ResetPolicy = fn(&mut Document, NodeId) -> Result<(), DomError>;

/// Recycles document elements per role.
#[derive(Debug)]
pub struct ElementPool<R> {
    capacity: usize,
    reset: ResetPolicy,
    free: HashMap<R, Vec<NodeId>>,
}

impl<R: Copy + Eq + Hash> ElementPool<R> {
    /// Pool keeping at most `capacity` free elements per role.
    pub fn new(capacity: usize, reset: ResetPolicy) -> Self {
        Self {
            capacity,
            reset,
            free: HashMap::new(),
        }
    }

    /// A clean element for `role`, reusing a free one when available.
    pub fn acquire(&mut self, doc: &mut Document, role: R, tag: &str) -> NodeId {
        if let Some(free) = self.free.get_mut(&role) {
            while let Some(node) = free.pop() {
                if doc.contains(node) {
                    return node;
                }
            }
        }
        doc.create_element(tag)
    }

    /// Return an element to the pool.
    ///
    /// # Errors
    ///
    /// Propagates document errors from detaching or resetting.
    pub fn release(&mut self, doc: &mut Document, role: R, node: NodeId) -> Result<(), DomError> {
        doc.detach(node)?;
        (self.reset)(doc, node)?;
        let free = self.free.entry(role).or_default();
        if free.len() < self.capacity {
            free.push(node);
            Ok(())
        } else {
            doc.drop_node(node)
        }
    }

    /// Free elements held for `role`.
    pub fn available(&self, role: R) -> usize {
        self.free.get(&role).map_or(0, Vec::len)
    }

    /// Maximum free elements per role.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every pooled element from the document.
    pub fn clear(&mut self, doc: &mut Document) {
        for (_, nodes) in self.free.drain() {
            for node in nodes {
                let _ = doc.drop_node(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Role {
        A,
        B,
    }

    fn reset(doc: &mut Document, node: NodeId) -> Result<(), DomError> {
        doc.set_attribute(node, "class", "")?;
        doc.set_text(node, "")
    }

    #[test]
    fn released_elements_are_reset_and_reused_per_role() {
        let mut doc = Document::new();
        let mut pool = ElementPool::new(2, reset);

        let node = pool.acquire(&mut doc, Role::A, "button");
        doc.append_child(doc.body(), node).unwrap();
        doc.add_class(node, "active").unwrap();
        doc.set_text(node, "3").unwrap();

        pool.release(&mut doc, Role::A, node).unwrap();
        assert!(!doc.is_connected(node));
        assert_eq!(pool.available(Role::A), 1);
        assert_eq!(pool.available(Role::B), 0);

        let other = pool.acquire(&mut doc, Role::B, "span");
        assert_ne!(other, node, "roles do not share free lists");

        let reused = pool.acquire(&mut doc, Role::A, "button");
        assert_eq!(reused, node);
        assert!(!doc.has_class(reused, "active"));
        assert_eq!(doc.text(reused), Some(""));
    }

    #[test]
    fn capacity_bounds_free_list() {
        let mut doc = Document::new();
        let mut pool = ElementPool::new(2, reset);
        let nodes: Vec<NodeId> = (0..4).map(|_| pool.acquire(&mut doc, Role::A, "b")).collect();

        for &node in &nodes {
            pool.release(&mut doc, Role::A, node).unwrap();
        }
        assert_eq!(pool.available(Role::A), 2);
        assert!(!doc.contains(nodes[2]) && !doc.contains(nodes[3]), "overflow dropped");
    }

    #[test]
    fn externally_dropped_elements_are_skipped() {
        let mut doc = Document::new();
        let mut pool = ElementPool::new(4, reset);
        let node = pool.acquire(&mut doc, Role::A, "b");
        pool.release(&mut doc, Role::A, node).unwrap();
        doc.drop_node(node).unwrap();

        let fresh = pool.acquire(&mut doc, Role::A, "b");
        assert_ne!(fresh, node);
        assert!(doc.contains(fresh));
    }
}
