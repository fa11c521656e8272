//! FNV-1a 32-bit hashing of the serialized bookmark tree.
//!
//! The hash is folded over UTF-16 code units, so non-ASCII titles hash the
//! same way a browser-side `charCodeAt` loop would and cached hashes stay
//! comparable across both.

use super::bookmark::{serialize_tree, BookmarkNode};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the UTF-16 code units of `text`.
pub fn fnv1a32(text: &str) -> u32 {
    text.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Eight lowercase hex digits.
pub fn hash_hex(text: &str) -> String {
    format!("{:08x}", fnv1a32(text))
}

/// Hash of the canonical JSON form of `tree`.
pub fn tree_hash(tree: &[BookmarkNode]) -> String {
    hash_hex(&serialize_tree(tree))
}
