//! Bookmark cache.
//!
//! The last successfully loaded tree, index and hash are kept under three
//! keys of a [`KeyValueStore`]. Writes are best-effort: a failing store is
//! logged and otherwise ignored, so caching can never break loading.

pub mod store;

pub use store::{CacheError, FileStore, KeyValueStore, MemoryStore};

use crate::config::constants::{CACHE_KEY_DATA, CACHE_KEY_HASH, CACHE_KEY_INDEX};
use crate::model::bookmark::{parse_tree, serialize_tree};
use crate::model::hash::tree_hash;
use crate::model::index::{BookmarkIndex, IndexEntry};
use crate::worker::LoadedBookmarks;

/// Cache of the last loaded bookmarks.
#[derive(Debug)]
pub struct BookmarkCache<S> {
    store: S,
}

impl<S: KeyValueStore> BookmarkCache<S> {
    /// Cache backed by `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hash of the cached tree, if any.
    pub fn cached_hash(&self) -> Option<String> {
        match self.store.get(CACHE_KEY_HASH) {
            Ok(hash) => hash,
            Err(err) => {
                tracing::warn!(error = %err, "cannot read cached hash");
                None
            }
        }
    }

    /// Persist `loaded`. Returns how many of the three keys were written.
    pub fn save(&mut self, loaded: &LoadedBookmarks) -> usize {
        let index = match serde_json::to_string(loaded.index.entries()) {
            Ok(json) => Some(json),
            Err(err) => {
                tracing::warn!(error = %err, "cannot serialize index for cache");
                None
            }
        };
        let writes = [
            (CACHE_KEY_DATA, Some(serialize_tree(&loaded.tree))),
            (CACHE_KEY_INDEX, index),
            (CACHE_KEY_HASH, Some(loaded.hash.clone())),
        ];

        let mut written = 0;
        for (key, value) in writes {
            let Some(value) = value else { continue };
            match self.store.set(key, &value) {
                Ok(()) => written += 1,
                Err(err) => tracing::warn!(key, error = %err, "cache write failed"),
            }
        }
        tracing::debug!(written, hash = %loaded.hash, "bookmark cache updated");
        written
    }

    /// Cached bookmarks, when all three keys are present, decode, and agree.
    pub fn load(&self) -> Option<LoadedBookmarks> {
        let read = |key: &str| match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "cache read failed");
                None
            }
        };
        let data = read(CACHE_KEY_DATA)?;
        let index = read(CACHE_KEY_INDEX)?;
        let hash = read(CACHE_KEY_HASH)?;

        let tree = parse_tree(&data)
            .map_err(|err| tracing::warn!(error = %err, "cached tree is corrupt"))
            .ok()?;
        if tree_hash(&tree) != hash {
            tracing::warn!(cached = %hash, "cached tree does not match its hash");
            return None;
        }
        let entries: Vec<IndexEntry> = serde_json::from_str(&index)
            .map_err(|err| tracing::warn!(error = %err, "cached index is corrupt"))
            .ok()?;
        let index = BookmarkIndex::from_entries(entries)
            .map_err(|err| tracing::warn!(error = %err, "cached index is inconsistent"))
            .ok()?;

        Some(LoadedBookmarks { tree, index, hash })
    }

    /// Remove all cached keys.
    pub fn clear(&mut self) {
        for key in [CACHE_KEY_DATA, CACHE_KEY_INDEX, CACHE_KEY_HASH] {
            if let Err(err) = self.store.remove(key) {
                tracing::warn!(key, error = %err, "cache clear failed");
            }
        }
    }
}
