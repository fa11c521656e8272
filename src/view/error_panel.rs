//! Full-screen error panel.

use crate::dom::{Document, DomError, NodeId};

/// Class of the panel root.
pub const ERROR_PANEL_CLASS: &str = "error-panel";

/// Shows a single blocking error message over the page.
#[derive(Debug, Default)]
pub struct ErrorPanel {
    root: Option<NodeId>,
}

impl ErrorPanel {
    /// Hidden panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel element while shown.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Whether the panel is in the document.
    pub fn is_visible(&self, doc: &Document) -> bool {
        self.root.is_some_and(|root| doc.is_connected(root))
    }

    /// Show `message`, replacing any panel already shown.
    pub fn show(&mut self, doc: &mut Document, message: &str) -> Result<NodeId, DomError> {
        self.hide(doc);
        let root = doc.create_element("div");
        doc.set_attribute(root, "class", ERROR_PANEL_CLASS)?;
        doc.set_attribute(root, "role", "alert")?;
        let text = doc.create_element("p");
        doc.set_text(text, message)?;
        doc.append_child(root, text)?;
        doc.append_child(doc.body(), root)?;
        self.root = Some(root);
        Ok(root)
    }

    /// Remove the panel if shown.
    pub fn hide(&mut self, doc: &mut Document) {
        if let Some(root) = self.root.take() {
            if doc.contains(root) {
                if let Err(err) = doc.drop_node(root) {
                    tracing::debug!(error = %err, "error panel already gone");
                }
            }
        }
    }
}
