//! Core value types: key hashes and trie paths

mod hash;
mod path;

pub use hash::{Hash, LEVEL_BITS, LEVEL_WIDTH, MAX_DEPTH};
pub use path::TriePath;
