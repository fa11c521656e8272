//! In-memory document tree.
//!
//! A small element arena standing in for the browser document: elements
//! with tag, classes, attributes, inline styles and text, a focus pointer,
//! simple selectors, and attribute mutation observers. Every fallible
//! operation returns [`DomError`] so render paths can fall back instead of
//! panicking.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use thiserror::Error;

pub mod selector;

pub use selector::Selector;

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena slot.
    pub fn get(&self) -> usize {
        self.0
    }
}

/// Handle to an attribute observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// Document operation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    /// The node was dropped or never existed.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Appending would create a cycle.
    #[error("cannot append {child:?} under its own descendant {parent:?}")]
    HierarchyRequest {
        /// Intended parent.
        parent: NodeId,
        /// Node being appended.
        child: NodeId,
    },

    /// Selector syntax not supported.
    #[error("invalid selector '{0}'")]
    InvalidSelector(String),
}

/// An observed attribute change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Element whose attribute changed.
    pub target: NodeId,
    /// Attribute name (`class` for class list edits).
    pub attribute: String,
    /// Value before the change.
    pub old_value: Option<String>,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        if name == "class" {
            if self.classes.is_empty() {
                None
            } else {
                Some(self.classes.join(" "))
            }
        } else {
            self.attributes.get(name).cloned()
        }
    }
}

#[derive(Debug)]
struct Observer {
    target: NodeId,
    filter: Vec<String>,
    records: Vec<MutationRecord>,
}

/// Element arena with a `body` root.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    body: NodeId,
    focused: Option<NodeId>,
    observers: Vec<Option<Observer>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document containing only `body`.
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Element::new("body"))],
            body: NodeId(0),
            focused: None,
            observers: Vec::new(),
        }
    }

    /// The root element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn element(&self, node: NodeId) -> Result<&Element, DomError> {
        self.nodes
            .get(node.0)
            .and_then(Option::as_ref)
            .ok_or(DomError::UnknownNode(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        self.nodes
            .get_mut(node.0)
            .and_then(Option::as_mut)
            .ok_or(DomError::UnknownNode(node))
    }

    /// Whether `node` refers to a live (not dropped) element.
    pub fn contains(&self, node: NodeId) -> bool {
        self.element(node).is_ok()
    }

    // ===== Tree structure =====

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Some(Element::new(tag)));
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    ///
    /// # Errors
    ///
    /// `UnknownNode` for dropped nodes, `HierarchyRequest` if `child` is
    /// `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.element(child)?;
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(DomError::HierarchyRequest { parent, child });
            }
            cursor = self.element(node)?.parent;
        }

        self.detach(child)?;
        self.element_mut(parent)?.children.push(child);
        self.element_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Remove `node` from its parent, keeping it alive for reuse.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.element(node)?.parent else {
            return Ok(());
        };
        self.element_mut(parent)?.children.retain(|&c| c != node);
        self.element_mut(node)?.parent = None;
        Ok(())
    }

    /// Detach `node` and free it together with its subtree.
    pub fn drop_node(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == self.body {
            return Err(DomError::HierarchyRequest {
                parent: self.body,
                child: node,
            });
        }
        self.detach(node)?;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(element) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend(element.children);
            }
            if self.focused == Some(current) {
                self.focused = None;
            }
        }
        Ok(())
    }

    /// Detach every child of `node`, returning them in order.
    pub fn take_children(&mut self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        let children = std::mem::take(&mut self.element_mut(node)?.children);
        for &child in &children {
            if let Ok(element) = self.element_mut(child) {
                element.parent = None;
            }
        }
        Ok(children)
    }

    /// Children of `node` in order.
    pub fn children(&self, node: NodeId) -> Result<&[NodeId], DomError> {
        Ok(&self.element(node)?.children)
    }

    /// Parent of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).ok().and_then(|e| e.parent)
    }

    /// Whether `node` is reachable from `body`.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.body {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    // ===== Attributes =====

    /// Tag name (lowercase).
    pub fn tag(&self, node: NodeId) -> Result<&str, DomError> {
        Ok(&self.element(node)?.tag)
    }

    /// Attribute value; `class` is the space-joined class list.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok().and_then(|e| e.attribute(name))
    }

    /// Set an attribute, recording the change for observers.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        let old_value = element.attribute(name);
        if old_value.as_deref() == Some(value) {
            return Ok(());
        }
        if name == "class" {
            element.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            element.attributes.insert(name.to_string(), value.to_string());
        }
        self.record(node, name, old_value);
        Ok(())
    }

    /// Remove an attribute, recording the change for observers.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        let old_value = element.attribute(name);
        if old_value.is_none() {
            return Ok(());
        }
        if name == "class" {
            element.classes.clear();
        } else {
            element.attributes.remove(name);
        }
        self.record(node, name, old_value);
        Ok(())
    }

    /// Whether the element carries `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .map(|e| e.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Add a class if absent.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        if self.has_class(node, class) {
            return Ok(());
        }
        let element = self.element_mut(node)?;
        let old_value = element.attribute("class");
        element.classes.push(class.to_string());
        self.record(node, "class", old_value);
        Ok(())
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        if !self.has_class(node, class) {
            self.element(node)?;
            return Ok(());
        }
        let element = self.element_mut(node)?;
        let old_value = element.attribute("class");
        element.classes.retain(|c| c != class);
        self.record(node, "class", old_value);
        Ok(())
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) -> Result<(), DomError> {
        if on {
            self.add_class(node, class)
        } else {
            self.remove_class(node, class)
        }
    }

    // ===== Text and style =====

    /// Text content of the element itself.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.element(node).ok().map(|e| e.text.as_str())
    }

    /// Replace the element's own text.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        if element.text != text {
            element.text = text.to_string();
        }
        Ok(())
    }

    /// Inline style property value.
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)
            .ok()
            .and_then(|e| e.styles.get(property))
            .map(String::as_str)
    }

    /// All inline style properties in name order.
    pub fn styles(&self, node: NodeId) -> Result<&BTreeMap<String, String>, DomError> {
        Ok(&self.element(node)?.styles)
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    /// Remove an inline style property.
    pub fn remove_style(&mut self, node: NodeId, property: &str) -> Result<(), DomError> {
        self.element_mut(node)?.styles.remove(property);
        Ok(())
    }

    // ===== Focus =====

    /// Currently focused element.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|&node| self.contains(node))
    }

    /// Move focus to `node`.
    pub fn focus(&mut self, node: NodeId) -> Result<(), DomError> {
        self.element(node)?;
        self.focused = Some(node);
        Ok(())
    }

    // ===== Selectors =====

    /// Whether `node` matches `selector`.
    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.element(node)
            .map(|e| selector.matches(&e.tag, &e.classes, |name| e.attribute(name)))
            .unwrap_or(false)
    }

    /// First connected element matching `selector` in document order.
    ///
    /// # Errors
    ///
    /// `InvalidSelector` if the selector cannot be parsed.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self.find_in(self.body, &selector))
    }

    /// First descendant of `root` (or `root` itself) matching `selector`.
    pub fn find_in(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if self.matches(node, selector) {
                return Some(node);
            }
            if let Ok(children) = self.children(node) {
                stack.extend(children.iter().rev().copied());
            }
        }
        None
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.matches(current, selector) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    // ===== Mutation observation =====

    /// Observe attribute changes on `target`, optionally restricted to `filter`.
    ///
    /// # Errors
    ///
    /// `UnknownNode` if `target` does not exist.
    pub fn observe_attributes(
        &mut self,
        target: NodeId,
        filter: &[&str],
    ) -> Result<ObserverId, DomError> {
        self.element(target)?;
        self.observers.push(Some(Observer {
            target,
            filter: filter.iter().map(|s| s.to_string()).collect(),
            records: Vec::new(),
        }));
        Ok(ObserverId(self.observers.len() - 1))
    }

    /// Drain pending records for an observer.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(observer.0)
            .and_then(Option::as_mut)
            .map(|o| std::mem::take(&mut o.records))
            .unwrap_or_default()
    }

    /// Stop an observer.
    pub fn disconnect(&mut self, observer: ObserverId) {
        if let Some(slot) = self.observers.get_mut(observer.0) {
            *slot = None;
        }
    }

    fn record(&mut self, target: NodeId, attribute: &str, old_value: Option<String>) {
        for observer in self.observers.iter_mut().flatten() {
            let wanted = observer.filter.is_empty() || observer.filter.iter().any(|f| f == attribute);
            if observer.target == target && wanted {
                observer.records.push(MutationRecord {
                    target,
                    attribute: attribute.to_string(),
                    old_value: old_value.clone(),
                });
            }
        }
    }

    // ===== Serialization =====

    /// Markup of `node` and its subtree, for diagnostics and snapshots.
    ///
    /// Classes come first, then attributes in name order, then inline styles.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Ok(element) = self.element(node) else {
            return;
        };
        let _ = write!(out, "<{}", element.tag);
        if !element.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", element.classes.join(" "));
        }
        for (name, value) in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", name, value);
        }
        if !element.styles.is_empty() {
            let style: Vec<String> = element
                .styles
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            let _ = write!(out, " style=\"{};\"", style.join("; "));
        }
        out.push('>');
        out.push_str(&element.text);
        for &child in &element.children {
            self.write_html(child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_sidebar() -> (Document, NodeId) {
        let mut doc = Document::new();
        let sidebar = doc.create_element("aside");
        doc.set_attribute(sidebar, "id", "sidebar").unwrap();
        doc.append_child(doc.body(), sidebar).unwrap();
        (doc, sidebar)
    }

    #[test]
    fn query_selector_finds_connected_elements_only() {
        let (mut doc, sidebar) = doc_with_sidebar();
        assert_eq!(doc.query_selector("#sidebar").unwrap(), Some(sidebar));

        doc.detach(sidebar).unwrap();
        assert_eq!(doc.query_selector("#sidebar").unwrap(), None);
        assert!(!doc.is_connected(sidebar));
    }

    #[test]
    fn append_rejects_cycles() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn dropped_nodes_report_unknown() {
        let (mut doc, sidebar) = doc_with_sidebar();
        doc.drop_node(sidebar).unwrap();
        assert_eq!(
            doc.set_text(sidebar, "x"),
            Err(DomError::UnknownNode(sidebar))
        );
        assert!(doc.children(doc.body()).unwrap().is_empty());
    }

    #[test]
    fn class_attribute_and_class_list_agree() {
        let mut doc = Document::new();
        let node = doc.create_element("button");
        doc.set_attribute(node, "class", "a  b").unwrap();
        doc.add_class(node, "c").unwrap();
        doc.remove_class(node, "a").unwrap();
        assert_eq!(doc.attribute(node, "class").as_deref(), Some("b c"));
        assert!(doc.has_class(node, "c"));
    }

    #[test]
    fn observers_receive_filtered_attribute_records() {
        let (mut doc, sidebar) = doc_with_sidebar();
        let observer = doc
            .observe_attributes(sidebar, &["class", "data-collapsed"])
            .unwrap();

        doc.add_class(sidebar, "collapsed").unwrap();
        doc.set_attribute(sidebar, "title", "ignored").unwrap();
        doc.set_attribute(sidebar, "data-collapsed", "true").unwrap();
        doc.set_attribute(sidebar, "data-collapsed", "true").unwrap(); // unchanged

        let records = doc.take_records(observer);
        let names: Vec<&str> = records.iter().map(|r| r.attribute.as_str()).collect();
        assert_eq!(names, vec!["class", "data-collapsed"]);
        assert!(doc.take_records(observer).is_empty());

        doc.disconnect(observer);
        doc.remove_class(sidebar, "collapsed").unwrap();
        assert!(doc.take_records(observer).is_empty());
    }

    #[test]
    fn closest_walks_ancestors() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        doc.add_class(button, "btn").unwrap();
        let icon = doc.create_element("span");
        doc.append_child(button, icon).unwrap();

        let selector = Selector::parse(".btn").unwrap();
        assert_eq!(doc.closest(icon, &selector), Some(button));
        assert_eq!(doc.closest(doc.body(), &selector), None);
    }

    #[test]
    fn outer_html_orders_classes_attributes_styles() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.set_attribute(node, "role", "note").unwrap();
        doc.set_attribute(node, "aria-label", "x").unwrap();
        doc.add_class(node, "panel").unwrap();
        doc.set_style(node, "top", "0").unwrap();
        doc.set_style(node, "position", "fixed").unwrap();
        doc.set_text(node, "hi").unwrap();
        assert_eq!(
            doc.outer_html(node),
            r#"<div class="panel" aria-label="x" role="note" style="position: fixed; top: 0;">hi</div>"#
        );
    }
}
