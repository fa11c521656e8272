//! Flat bookmark index.
//!
//! The index is a preorder flattening of the bookmark tree. Entry ids are
//! positions in the flattening, so the index doubles as an arena: parents are
//! reached through `parent_id` and breadcrumbs are an index walk rather than
//! pointer chasing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::bookmark::BookmarkNode;
use super::error::LoadError;

/// Separator between ancestor titles in [`IndexEntry::path`].
pub const PATH_SEPARATOR: &str = "/";

/// Stable id of an index entry (its preorder position).
pub type EntryId = usize;

/// Kind of indexed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Node with a `children` array.
    Folder,
    /// Leaf node.
    Bookmark,
}

/// One flattened node with precomputed search fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// Preorder position.
    pub id: EntryId,
    /// Id of the containing folder, `None` for roots.
    pub parent_id: Option<EntryId>,
    /// Folder or bookmark.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Display title.
    pub title: String,
    /// Target URL, empty for folders.
    #[serde(default)]
    pub url: String,
    /// Direct children (folders only).
    pub children_count: usize,
    /// Ancestor titles joined by [`PATH_SEPARATOR`].
    pub path: String,
    /// `title` lowercased.
    pub title_lower: String,
    /// `url` lowercased.
    pub url_lower: String,
}

impl IndexEntry {
    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Case-insensitive substring match against title or URL.
    ///
    /// `keyword_lower` must already be lowercased.
    pub fn matches(&self, keyword_lower: &str) -> bool {
        self.title_lower.contains(keyword_lower) || self.url_lower.contains(keyword_lower)
    }
}

/// Arena of indexed nodes addressed by [`EntryId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkIndex {
    entries: Vec<IndexEntry>,
    children: HashMap<Option<EntryId>, Vec<EntryId>>,
}

impl BookmarkIndex {
    /// Rebuild an index from serialized entries.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Parse` if ids are not consecutive positions or a
    /// parent does not precede its child.
    pub fn from_entries(entries: Vec<IndexEntry>) -> Result<Self, LoadError> {
        let mut children: HashMap<Option<EntryId>, Vec<EntryId>> = HashMap::new();
        for (position, entry) in entries.iter().enumerate() {
            if entry.id != position {
                return Err(LoadError::Parse {
                    reason: format!("index entry {} stored at position {}", entry.id, position),
                });
            }
            if let Some(parent) = entry.parent_id {
                let parent_is_folder = parent < position && entries[parent].is_folder();
                if !parent_is_folder {
                    return Err(LoadError::Parse {
                        reason: format!("index entry {} has invalid parent {}", entry.id, parent),
                    });
                }
            }
            children.entry(entry.parent_id).or_default().push(entry.id);
        }
        Ok(Self { entries, children })
    }

    /// All entries in preorder.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Consume the index, returning its entries.
    pub fn into_entries(self) -> Vec<IndexEntry> {
        self.entries
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by id.
    pub fn get(&self, id: EntryId) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    /// Direct children of `parent` (`None` lists the roots), in tree order.
    pub fn children_of(&self, parent: Option<EntryId>) -> Vec<&IndexEntry> {
        self.children
            .get(&parent)
            .map(|ids| ids.iter().filter_map(|&id| self.entries.get(id)).collect())
            .unwrap_or_default()
    }

    /// Chain from the root down to `id`, inclusive. Empty for unknown ids.
    pub fn breadcrumb(&self, id: EntryId) -> Vec<&IndexEntry> {
        let mut chain = Vec::new();
        let mut cursor = self.entries.get(id);
        while let Some(entry) = cursor {
            chain.push(entry);
            cursor = entry.parent_id.and_then(|parent| self.entries.get(parent));
        }
        chain.reverse();
        chain
    }

    /// All folder entries.
    pub fn folders(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter().filter(|entry| entry.is_folder())
    }

    /// Entries whose title or URL contains `keyword`, case-insensitively.
    ///
    /// A blank keyword matches nothing.
    pub fn search(&self, keyword: &str) -> Vec<&IndexEntry> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }
        let keyword_lower = keyword.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.matches(&keyword_lower))
            .collect()
    }
}

/// Flatten `tree` into an index in preorder.
pub fn build_index(tree: &[BookmarkNode]) -> BookmarkIndex {
    let mut entries = Vec::with_capacity(super::bookmark::tree_len(tree));
    let mut ancestors: Vec<&str> = Vec::new();
    for node in tree {
        flatten(node, None, &mut ancestors, &mut entries);
    }

    let mut children: HashMap<Option<EntryId>, Vec<EntryId>> = HashMap::new();
    for entry in &entries {
        children.entry(entry.parent_id).or_default().push(entry.id);
    }
    BookmarkIndex { entries, children }
}

fn flatten<'a>(
    node: &'a BookmarkNode,
    parent_id: Option<EntryId>,
    ancestors: &mut Vec<&'a str>,
    entries: &mut Vec<IndexEntry>,
) {
    let id = entries.len();
    let url = node.url.clone().unwrap_or_default();
    entries.push(IndexEntry {
        id,
        parent_id,
        kind: if node.is_folder() {
            EntryKind::Folder
        } else {
            EntryKind::Bookmark
        },
        title_lower: node.title.to_lowercase(),
        url_lower: url.to_lowercase(),
        title: node.title.clone(),
        url,
        children_count: node.children().len(),
        path: ancestors.join(PATH_SEPARATOR),
    });

    if node.is_folder() {
        ancestors.push(&node.title);
        for child in node.children() {
            flatten(child, Some(id), ancestors, entries);
        }
        ancestors.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bookmark::tree_len;
    use proptest::prelude::*;

    fn sample_tree() -> Vec<BookmarkNode> {
        vec![
            BookmarkNode::folder(
                "Dev",
                vec![
                    BookmarkNode::bookmark("GitHub", "https://github.com"),
                    BookmarkNode::folder(
                        "Rust",
                        vec![BookmarkNode::bookmark("Docs", "https://doc.rust-lang.org")],
                    ),
                ],
            ),
            BookmarkNode::bookmark("News", "https://news.ycombinator.com"),
        ]
    }

    #[test]
    fn preorder_ids_and_parents() {
        let index = build_index(&sample_tree());
        let summary: Vec<(EntryId, Option<EntryId>, &str)> = index
            .entries()
            .iter()
            .map(|e| (e.id, e.parent_id, e.title.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, None, "Dev"),
                (1, Some(0), "GitHub"),
                (2, Some(0), "Rust"),
                (3, Some(2), "Docs"),
                (4, None, "News"),
            ]
        );
    }

    #[test]
    fn entries_carry_path_and_lowercase_fields() {
        let index = build_index(&sample_tree());
        let docs = index.get(3).unwrap();
        assert_eq!(docs.path, "Dev/Rust");
        assert_eq!(docs.url_lower, "https://doc.rust-lang.org");
        assert_eq!(index.get(0).unwrap().children_count, 2);
        assert_eq!(index.get(0).unwrap().path, "");
    }

    #[test]
    fn breadcrumb_walks_parent_ids() {
        let index = build_index(&sample_tree());
        let titles: Vec<&str> = index.breadcrumb(3).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Dev", "Rust", "Docs"]);
        assert!(index.breadcrumb(99).is_empty());
    }

    #[test]
    fn children_of_lists_direct_children_in_order() {
        let index = build_index(&sample_tree());
        let roots: Vec<EntryId> = index.children_of(None).iter().map(|e| e.id).collect();
        assert_eq!(roots, vec![0, 4]);
        let dev: Vec<EntryId> = index.children_of(Some(0)).iter().map(|e| e.id).collect();
        assert_eq!(dev, vec![1, 2]);
        assert!(index.children_of(Some(1)).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_url() {
        let index = build_index(&sample_tree());
        let hits: Vec<&str> = index.search("GIT").iter().map(|e| e.title.as_str()).collect();
        assert_eq!(hits, vec!["GitHub"]);
        let by_url: Vec<EntryId> = index.search("ycombinator").iter().map(|e| e.id).collect();
        assert_eq!(by_url, vec![4]);
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn serializes_with_camel_case_and_type_tag() {
        let index = build_index(&[BookmarkNode::bookmark("A", "https://A")]);
        let json = serde_json::to_value(index.entries()).unwrap();
        assert_eq!(json[0]["type"], "bookmark");
        assert_eq!(json[0]["parentId"], serde_json::Value::Null);
        assert_eq!(json[0]["urlLower"], "https://a");
        assert_eq!(json[0]["childrenCount"], 0);
    }

    #[test]
    fn from_entries_round_trips_and_rejects_corruption() {
        let index = build_index(&sample_tree());
        let rebuilt = BookmarkIndex::from_entries(index.entries().to_vec()).unwrap();
        assert_eq!(rebuilt, index);

        let mut corrupted = index.into_entries();
        corrupted[3].parent_id = Some(1); // bookmark as parent
        assert!(BookmarkIndex::from_entries(corrupted).is_err());
    }

    fn arb_tree() -> impl Strategy<Value = Vec<BookmarkNode>> {
        let leaf = ("[a-zA-Z ]{0,8}", "[a-z]{1,8}")
            .prop_map(|(title, host)| BookmarkNode::bookmark(title, format!("https://{host}.com")));
        let node = leaf.prop_recursive(4, 48, 5, |inner| {
            ("[a-zA-Z ]{0,8}", prop::collection::vec(inner, 0..5))
                .prop_map(|(title, children)| BookmarkNode::folder(title, children))
        });
        prop::collection::vec(node, 0..6)
    }

    proptest! {
        #[test]
        fn one_entry_per_node_with_valid_parent_chain(tree in arb_tree()) {
            let index = build_index(&tree);
            prop_assert_eq!(index.len(), tree_len(&tree));

            for entry in index.entries() {
                if let Some(parent) = entry.parent_id {
                    prop_assert!(parent < entry.id);
                    prop_assert!(index.get(parent).unwrap().is_folder());
                }
            }

            fn count_folders(nodes: &[BookmarkNode]) -> usize {
                nodes
                    .iter()
                    .map(|n| usize::from(n.is_folder()) + count_folders(n.children()))
                    .sum()
            }
            prop_assert_eq!(index.folders().count(), count_folders(&tree));
        }
    }
}
