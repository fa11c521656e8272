//! Data-loader worker: reads the bookmark resource, builds the index and
//! hashes the tree off the caller's thread.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Worker;
use crate::model::bookmark::{parse_tree, BookmarkNode};
use crate::model::error::{LoadError, WorkerError};
use crate::model::hash::tree_hash;
use crate::model::index::{build_index, BookmarkIndex, IndexEntry};

/// Request understood by the loader: `{"action":"loadData"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum LoaderRequest {
    /// Load, index and hash the configured resource.
    LoadData,
}

/// Loader reply, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoaderResponse {
    /// `{"status":"success","data":[..],"index":[..],"hash":".."}`
    Success {
        /// Bookmark tree.
        data: Vec<BookmarkNode>,
        /// Flat index entries.
        index: Vec<IndexEntry>,
        /// Tree hash.
        hash: String,
    },
    /// `{"status":"error","error":".."}`
    Error {
        /// Failure message.
        error: String,
    },
}

/// Decoded loader output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBookmarks {
    /// Bookmark tree.
    pub tree: Vec<BookmarkNode>,
    /// Flat index over `tree`.
    pub index: BookmarkIndex,
    /// FNV-1a32 of the compact tree JSON.
    pub hash: String,
}

impl LoadedBookmarks {
    /// Index and hash an already parsed tree.
    pub fn from_tree(tree: Vec<BookmarkNode>) -> Self {
        let index = build_index(&tree);
        let hash = tree_hash(&tree);
        Self { tree, index, hash }
    }
}

impl LoaderResponse {
    /// Convert into the caller-side result.
    ///
    /// # Errors
    ///
    /// `LoadError::Worker` for an error reply, `LoadError::Parse` if the
    /// returned index is inconsistent.
    pub fn into_result(self) -> Result<LoadedBookmarks, LoadError> {
        match self {
            LoaderResponse::Success { data, index, hash } => Ok(LoadedBookmarks {
                tree: data,
                index: BookmarkIndex::from_entries(index)?,
                hash,
            }),
            LoaderResponse::Error { error } => Err(LoadError::Worker(error)),
        }
    }
}

impl From<Result<LoadedBookmarks, LoadError>> for LoaderResponse {
    fn from(result: Result<LoadedBookmarks, LoadError>) -> Self {
        match result {
            Ok(loaded) => LoaderResponse::Success {
                data: loaded.tree,
                index: loaded.index.into_entries(),
                hash: loaded.hash,
            },
            Err(err) => LoaderResponse::Error {
                error: err.to_string(),
            },
        }
    }
}

/// Read and decode the resource at `path`.
///
/// # Errors
///
/// `LoadError::Fetch` when the file cannot be read, `LoadError::Parse` when
/// it is not a bookmark tree.
pub fn load_and_index(path: &Path) -> Result<LoadedBookmarks, LoadError> {
    let json = fs::read_to_string(path).map_err(|err| LoadError::Fetch {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let tree = parse_tree(&json)?;
    Ok(LoadedBookmarks::from_tree(tree))
}

/// Handle one loader request against `path`.
pub fn handle_loader_request(path: &Path, request: LoaderRequest) -> LoaderResponse {
    match request {
        LoaderRequest::LoadData => {
            let result = load_and_index(path);
            match &result {
                Ok(loaded) => tracing::info!(
                    path = %path.display(),
                    entries = loaded.index.len(),
                    hash = %loaded.hash,
                    "bookmarks loaded"
                ),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "bookmark load failed"),
            }
            result.into()
        }
    }
}

/// Start a loader worker bound to `path`.
///
/// # Errors
///
/// `WorkerError::Spawn` if the thread cannot be started.
pub fn spawn_loader(path: PathBuf) -> Result<Worker<LoaderRequest, LoaderResponse>, WorkerError> {
    Worker::spawn("loader", move |request| handle_loader_request(&path, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bmb-loader-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bookmarks.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn request_and_response_wire_shapes() {
        assert_eq!(
            serde_json::to_string(&LoaderRequest::LoadData).unwrap(),
            r#"{"action":"loadData"}"#
        );
        let error = LoaderResponse::Error {
            error: "nope".into(),
        };
        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            r#"{"status":"error","error":"nope"}"#
        );
        let success: LoaderResponse =
            serde_json::from_str(r#"{"status":"success","data":[],"index":[],"hash":"811c9dc5"}"#)
                .unwrap();
        assert_eq!(success.into_result().unwrap().hash, "811c9dc5");
    }

    #[test]
    fn loads_indexes_and_hashes() {
        let path = write_temp(
            "ok",
            r#"[{"title":"Dev","children":[{"title":"Rust","url":"https://rust-lang.org"}]}]"#,
        );
        let loaded = load_and_index(&path).unwrap();
        assert_eq!(loaded.tree.len(), 1);
        assert_eq!(loaded.index.len(), 2);
        assert_eq!(loaded.hash, tree_hash(&loaded.tree));
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let path = std::env::temp_dir().join("bmb-definitely-missing/bookmarks.json");
        assert!(matches!(load_and_index(&path), Err(LoadError::Fetch { .. })));
    }

    #[test]
    fn wrong_shape_is_parse_error() {
        let path = write_temp("shape", r#"{"title":"not an array"}"#);
        assert!(matches!(load_and_index(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn worker_round_trip_reports_errors_as_replies() {
        let path = write_temp("bad", "not json");
        let worker = spawn_loader(path).unwrap();
        let reply = worker
            .post(LoaderRequest::LoadData)
            .unwrap()
            .wait(Duration::from_secs(5))
            .unwrap();
        assert!(matches!(reply, LoaderResponse::Error { .. }));
        assert!(matches!(reply.into_result(), Err(LoadError::Worker(_))));
    }
}
