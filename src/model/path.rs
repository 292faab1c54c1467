//! Trie paths: the bucket sequence from the root to a node

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The address of a node in a hash trie.
///
/// One bucket index per level, root first. The root path is empty. The same
/// path in two tries built over the same bucket scheme names the same hash
/// partition, which is what lets generations be walked together.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriePath(Vec<u8>);

impl TriePath {
    /// The root path
    pub fn root() -> Self {
        TriePath(Vec::new())
    }

    pub fn from_buckets(buckets: impl Into<Vec<u8>>) -> Self {
        TriePath(buckets.into())
    }

    /// Path of the child in slot `bucket` of the node at `self`
    pub fn extend(&self, bucket: u8) -> TriePath {
        let mut buckets = Vec::with_capacity(self.0.len() + 1);
        buckets.extend_from_slice(&self.0);
        buckets.push(bucket);
        TriePath(buckets)
    }

    pub fn buckets(&self) -> &[u8] {
        &self.0
    }

    /// Number of levels below the root
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<u8> {
        self.0.last().copied()
    }

    /// Whether `self` is `other` or one of its ancestors
    pub fn is_prefix_of(&self, other: &TriePath) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for TriePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", b)?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for TriePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriePath{}", self)
    }
}

impl FromStr for TriePath {
    type Err = std::num::ParseIntError;

    /// Parses the dotted form used on the command line, e.g. `1.0.3`.
    /// An empty string (or `[]`) is the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('[').trim_end_matches(']');
        if s.is_empty() {
            return Ok(TriePath::root());
        }
        s.split('.')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map(TriePath)
    }
}

impl AsRef<[u8]> for TriePath {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
