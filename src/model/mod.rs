//! Domain model: bookmark tree, flat index, hashing and errors.

pub mod bookmark;
pub mod error;
pub mod hash;
pub mod index;

pub use bookmark::{parse_tree, serialize_tree, tree_len, BookmarkNode};
pub use error::{AppError, LoadError, ValidationError, WorkerError};
pub use hash::{fnv1a32, tree_hash};
pub use index::{build_index, BookmarkIndex, EntryId, EntryKind, IndexEntry};
