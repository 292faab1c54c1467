//! # gentrie
//!
//! The index layer of a columnar store built from immutable data pages.
//!
//! Rows are partitioned by the hash of their key, two bits per trie level.
//! Each write or compaction pass produces a generation: a trie whose leaves
//! name the data pages holding each partition. Because every generation uses
//! the same bucket scheme, a path means the same partition everywhere, and
//! generations can be merged by walking their tries side by side without
//! re-sorting or re-hashing a single row.
//!
//! ## Core Concepts
//!
//! - **Encodings**: a trie frozen as flat columns, root in the last slot
//! - **Views**: [`HashTrie`] borrows an encoding and resolves nodes on demand
//! - **Nodes**: [`Node::Branch`] with sparse child slots, [`Node::Leaf`] with a page index
//! - **Merge plans**: lockstep walks over several generations
//!
//! ## Example
//!
//! ```
//! use gentrie::{HashTrie, TrieShape, TrieWriter};
//!
//! let encoding = TrieWriter::encode(&TrieShape::Branch(vec![Some(TrieShape::Leaf(7)), None]));
//! let trie = HashTrie::new(&encoding);
//! let children = trie.root_node().children();
//! let leaf = children.slots().unwrap()[0].as_ref().unwrap();
//! assert_eq!(leaf.as_leaf().unwrap().data_page_idx(), 7);
//! ```

pub mod config;
pub mod model;
pub mod ops;
pub mod store;
pub mod trie;

mod error;

pub use config::{Config, OutputFormat};
pub use error::{Error, Result};
pub use model::{Hash, TriePath};
pub use ops::{merge_plan, MergePlan, MergeTask};
pub use store::{MemoryPageStore, PageStore, TrieFile};
pub use trie::{Branch, Children, HashTrie, Leaf, Node, TrieEncoding, TrieShape, TrieStats, TrieWriter};

/// Trie file format version
pub const VERSION: u32 = 1;

/// Magic bytes for file identification
pub const MAGIC: &[u8; 8] = b"GENTRIE\0";
