//! Bookmark tree as loaded from the JSON resource.

use serde::{Deserialize, Serialize};

use super::error::LoadError;

/// A node of the bookmark tree.
///
/// A node is a folder iff `children` is present (an array, possibly empty).
/// Serialization order is `title`, `url`, `children`; absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookmarkNode {
    /// Display title.
    pub title: String,
    /// Target URL for bookmarks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Child nodes for folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BookmarkNode>>,
}

impl BookmarkNode {
    /// Create a leaf bookmark.
    pub fn bookmark(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
            children: None,
        }
    }

    /// Create a folder.
    pub fn folder(title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        Self {
            title: title.into(),
            url: None,
            children: Some(children),
        }
    }

    /// Whether this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    /// Children of a folder; empty for bookmarks.
    pub fn children(&self) -> &[BookmarkNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// Total node count of a forest.
pub fn tree_len(tree: &[BookmarkNode]) -> usize {
    tree.iter().map(BookmarkNode::subtree_len).sum()
}

/// Decode a bookmark tree.
///
/// Accepts only a JSON array of `{title, url?, children?}` nodes.
///
/// # Errors
///
/// Returns `LoadError::Parse` with the decoder message for malformed JSON or
/// any other shape.
pub fn parse_tree(json: &str) -> Result<Vec<BookmarkNode>, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::Parse {
        reason: e.to_string(),
    })
}

/// Serialize a tree to compact JSON.
///
/// This is the canonical form hashed by [`super::hash::tree_hash`].
pub fn serialize_tree(tree: &[BookmarkNode]) -> String {
    // A Vec of plain structs with String fields cannot fail to serialize.
    serde_json::to_string(tree).unwrap_or_else(|_| String::from("[]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_tree() {
        let json = r#"[
            {"title": "Dev", "children": [
                {"title": "GitHub", "url": "https://github.com"},
                {"title": "Empty", "children": []}
            ]},
            {"title": "Rust", "url": "https://www.rust-lang.org"}
        ]"#;

        let tree = parse_tree(json).expect("valid tree");
        assert_eq!(tree.len(), 2);
        assert!(tree[0].is_folder());
        assert!(!tree[1].is_folder());
        assert!(tree[0].children()[1].is_folder(), "empty children array is still a folder");
        assert_eq!(tree_len(&tree), 4);
    }

    #[test]
    fn rejects_non_array_root() {
        let err = parse_tree(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn rejects_children_that_are_not_an_array() {
        let err = parse_tree(r#"[{"title": "x", "children": {}}]"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn rejects_missing_title() {
        assert!(parse_tree(r#"[{"url": "https://a"}]"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_tree("[{").unwrap_err();
        match err {
            LoadError::Parse { reason } => assert!(!reason.is_empty()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn serialization_omits_absent_fields() {
        let tree = vec![
            BookmarkNode::bookmark("A", "https://a"),
            BookmarkNode::folder("F", vec![]),
        ];
        assert_eq!(
            serialize_tree(&tree),
            r#"[{"title":"A","url":"https://a"},{"title":"F","children":[]}]"#
        );
    }
}
