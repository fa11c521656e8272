//! Bookmark source: loader worker with cache fallback.
//!
//! A fresh load always goes through the loader worker. On success the cache
//! is refreshed when the tree hash changed; on any failure the cached copy
//! is served instead, and only without one does the error reach the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{BookmarkCache, KeyValueStore};
use crate::config::constants::WORKER_TIMEOUT;
use crate::model::error::LoadError;
use crate::worker::loader::spawn_loader;
use crate::worker::{LoadedBookmarks, LoaderRequest};

/// Where loaded bookmarks came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Read from the resource just now.
    Fresh,
    /// Served from the cache after the resource failed.
    Cache,
}

/// Successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Tree, index and hash.
    pub bookmarks: LoadedBookmarks,
    /// Fresh or cached.
    pub origin: LoadOrigin,
    /// The fresh-load failure that forced a cache fallback.
    pub fallback_reason: Option<LoadError>,
}

/// Loads bookmarks from `path`, optionally backed by a cache.
#[derive(Debug)]
pub struct BookmarkSource<S> {
    path: PathBuf,
    cache: Option<BookmarkCache<S>>,
    timeout: Duration,
}

impl<S: KeyValueStore> BookmarkSource<S> {
    /// Source for `path` with an optional cache.
    pub fn new(path: impl Into<PathBuf>, cache: Option<BookmarkCache<S>>) -> Self {
        Self {
            path: path.into(),
            cache,
            timeout: WORKER_TIMEOUT,
        }
    }

    /// Override how long to wait for the loader.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resource path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Attached cache.
    pub fn cache(&self) -> Option<&BookmarkCache<S>> {
        self.cache.as_ref()
    }

    /// Load fresh data, falling back to the cache.
    ///
    /// # Errors
    ///
    /// The fresh-load error when no usable cache exists.
    pub fn load(&mut self) -> Result<LoadOutcome, LoadError> {
        match self.fetch() {
            Ok(bookmarks) => {
                if let Some(cache) = self.cache.as_mut() {
                    if cache.cached_hash().as_deref() != Some(bookmarks.hash.as_str()) {
                        cache.save(&bookmarks);
                    }
                }
                Ok(LoadOutcome {
                    bookmarks,
                    origin: LoadOrigin::Fresh,
                    fallback_reason: None,
                })
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "fresh load failed");
                match self.cache.as_ref().and_then(BookmarkCache::load) {
                    Some(bookmarks) => {
                        tracing::info!(hash = %bookmarks.hash, "serving cached bookmarks");
                        Ok(LoadOutcome {
                            bookmarks,
                            origin: LoadOrigin::Cache,
                            fallback_reason: Some(err),
                        })
                    }
                    None => Err(err),
                }
            }
        }
    }

    fn fetch(&self) -> Result<LoadedBookmarks, LoadError> {
        let mut worker = spawn_loader(self.path.clone())?;
        let response = worker.post(LoaderRequest::LoadData)?.wait(self.timeout);
        worker.terminate();
        response?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::model::bookmark::BookmarkNode;
    use std::fs;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bmb-source-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bookmarks.json");
        fs::write(&path, contents).unwrap();
        path
    }

    fn cached() -> BookmarkCache<MemoryStore> {
        let mut cache = BookmarkCache::new(MemoryStore::new());
        cache.save(&LoadedBookmarks::from_tree(vec![BookmarkNode::bookmark(
            "Cached",
            "https://cache.example",
        )]));
        cache
    }

    #[test]
    fn fresh_load_refreshes_cache() {
        let path = temp_file("fresh", r#"[{"title":"A","url":"https://a.example"}]"#);
        let mut source = BookmarkSource::new(&path, Some(cached()));
        let outcome = source.load().unwrap();

        assert_eq!(outcome.origin, LoadOrigin::Fresh);
        assert_eq!(
            source.cache().unwrap().cached_hash(),
            Some(outcome.bookmarks.hash.clone())
        );
    }

    #[test]
    fn failure_falls_back_to_cache() {
        let path = temp_file("broken", "{ not json");
        let mut source = BookmarkSource::new(&path, Some(cached()));
        let outcome = source.load().unwrap();

        assert_eq!(outcome.origin, LoadOrigin::Cache);
        assert_eq!(outcome.bookmarks.tree[0].title, "Cached");
        assert!(outcome.fallback_reason.is_some());
    }

    #[test]
    fn failure_without_cache_surfaces_error() {
        let missing = std::env::temp_dir().join("bmb-source-missing/none.json");
        let mut source: BookmarkSource<MemoryStore> = BookmarkSource::new(missing, None);
        let err = source.load().unwrap_err();
        assert!(err.user_message().starts_with("加载书签数据失败："));
    }
}
