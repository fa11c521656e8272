//! Search worker protocol and tree search.

use serde::{Deserialize, Serialize};

use super::LazyWorker;
use crate::model::bookmark::BookmarkNode;
use crate::model::index::{EntryKind, PATH_SEPARATOR};

/// `{"action":"search","data":{"keyword":..,"bookmarks":[..]}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum SearchRequest {
    /// Search `bookmarks` for `keyword`.
    Search {
        /// Raw keyword as typed.
        keyword: String,
        /// Tree to search.
        bookmarks: Vec<BookmarkNode>,
    },
}

/// `{"action":"searchResults","results":[..]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SearchResponse {
    /// Matches in tree order.
    SearchResults {
        /// Matching nodes.
        results: Vec<SearchHit>,
    },
}

impl SearchResponse {
    /// The hits carried by the response.
    pub fn into_hits(self) -> Vec<SearchHit> {
        match self {
            SearchResponse::SearchResults { results } => results,
        }
    }
}

/// One matching node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Node title.
    pub title: String,
    /// Bookmark URL; absent for folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Folder or bookmark.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Ancestor titles joined by `/`.
    pub path: String,
}

/// Case-insensitive substring search over titles and URLs.
///
/// Folders are reported only when they match themselves; their children
/// are searched either way. A blank keyword finds nothing.
pub fn search_tree(tree: &[BookmarkNode], keyword: &str) -> Vec<SearchHit> {
    let keyword = keyword.trim().to_lowercase();
    let mut hits = Vec::new();
    if keyword.is_empty() {
        return hits;
    }
    let mut ancestors = Vec::new();
    for node in tree {
        visit(node, &keyword, &mut ancestors, &mut hits);
    }
    hits
}

fn visit<'a>(node: &'a BookmarkNode, keyword: &str, ancestors: &mut Vec<&'a str>, hits: &mut Vec<SearchHit>) {
    let title_match = node.title.to_lowercase().contains(keyword);
    let url_match = node
        .url
        .as_deref()
        .is_some_and(|url| url.to_lowercase().contains(keyword));
    if title_match || url_match {
        hits.push(SearchHit {
            title: node.title.clone(),
            url: node.url.clone(),
            kind: if node.is_folder() {
                EntryKind::Folder
            } else {
                EntryKind::Bookmark
            },
            path: ancestors.join(PATH_SEPARATOR),
        });
    }
    if node.is_folder() {
        ancestors.push(&node.title);
        for child in node.children() {
            visit(child, keyword, ancestors, hits);
        }
        ancestors.pop();
    }
}

/// Answer one search request.
pub fn handle_search_request(request: SearchRequest) -> SearchResponse {
    match request {
        SearchRequest::Search { keyword, bookmarks } => {
            let results = search_tree(&bookmarks, &keyword);
            tracing::debug!(keyword = %keyword, hits = results.len(), "search finished");
            SearchResponse::SearchResults { results }
        }
    }
}

/// Search worker started on first use.
pub fn search_worker() -> LazyWorker<SearchRequest, SearchResponse> {
    LazyWorker::new("search", handle_search_request)
}
