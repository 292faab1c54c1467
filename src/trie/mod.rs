//! Hash trie index over immutable data pages
//!
//! A trie generation is stored as a flat columnar [`TrieEncoding`]. A
//! [`HashTrie`] borrows one and hands out [`Node`] descriptors on demand:
//! - each level partitions rows by two more bits of their key hash
//! - a branch's slot `i` is bucket `i` one level down
//! - a leaf names the single data page holding its partition

mod encoding;
mod node;
#[cfg(test)]
mod proptests;
mod view;
mod writer;

pub use encoding::{NodeTag, TrieEncoding, MAX_FAN_OUT};
pub use node::{Branch, Children, Leaf, Node};
pub use view::{HashTrie, TrieStats};
pub use writer::{TrieShape, TrieWriter};
