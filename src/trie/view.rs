//! Read-only materialized view over a [`TrieEncoding`]

use super::encoding::{malformed, NodeTag, TrieEncoding};
use super::node::{Branch, Leaf, Node};
use super::writer::TrieShape;
use crate::model::{Hash, TriePath, MAX_DEPTH};
use crate::Result;
use serde::Serialize;
use std::fmt;

/// A hash trie backed by a borrowed columnar encoding
///
/// Opening a view only records a reference, so many generations can be
/// opened side by side for a merge. The view is `Copy` and holds no state of
/// its own; any number of threads may traverse it at once.
#[derive(Clone, Copy)]
pub struct HashTrie<'a> {
    encoding: &'a TrieEncoding,
}

/// Shape summary of a trie
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrieStats {
    pub branches: usize,
    pub leaves: usize,
    /// Child slots with no node behind them
    pub empty_slots: usize,
    /// Depth of the deepest node (root = 0)
    pub max_depth: usize,
}

impl<'a> HashTrie<'a> {
    /// Wrap an encoding without checking it
    pub fn new(encoding: &'a TrieEncoding) -> Self {
        HashTrie { encoding }
    }

    /// Wrap an encoding after [`TrieEncoding::validate`] accepts it
    pub fn open(encoding: &'a TrieEncoding) -> Result<Self> {
        encoding.validate()?;
        Ok(HashTrie { encoding })
    }

    pub fn encoding(&self) -> &'a TrieEncoding {
        self.encoding
    }

    pub(crate) fn same_encoding(&self, other: &HashTrie<'_>) -> bool {
        std::ptr::eq(self.encoding, other.encoding)
    }

    /// Materialize the node in slot `idx`, addressed as `path`.
    ///
    /// Returns `None` for an absent slot.
    ///
    /// # Panics
    ///
    /// If the slot is out of range or carries an unknown tag.
    pub fn resolve(&self, path: TriePath, idx: u32) -> Option<Node<'a>> {
        match self.encoding.tag_at(idx) {
            NodeTag::Absent => None,
            NodeTag::Branch => Some(Node::Branch(Branch::new(
                *self,
                path,
                self.encoding.offset_at(idx),
            ))),
            NodeTag::Leaf => Some(Node::Leaf(Leaf::new(
                *self,
                path,
                self.encoding.offset_at(idx),
            ))),
        }
    }

    /// The root: always the last slot of the encoding, at the empty path.
    ///
    /// # Panics
    ///
    /// If the encoding is empty or its last slot is absent.
    pub fn root_node(&self) -> Node<'a> {
        let Some(last) = self.encoding.len().checked_sub(1) else {
            malformed(format_args!("encoding has no root slot"))
        };
        let last = u32::try_from(last)
            .unwrap_or_else(|_| malformed(format_args!("{} slots exceed u32", self.encoding.len())));
        match self.resolve(TriePath::root(), last) {
            Some(root) => root,
            None => malformed(format_args!("root slot {} is absent", last)),
        }
    }

    /// The leaf whose partition holds keys hashing to `hash`, if any.
    pub fn find_leaf(&self, hash: &Hash) -> Option<Leaf<'a>> {
        let mut node = self.root_node();
        loop {
            let branch = match node {
                Node::Leaf(leaf) => return Some(leaf),
                Node::Branch(branch) => branch,
            };
            let depth = branch.path().depth();
            if depth >= MAX_DEPTH {
                malformed(format_args!("branch at {} deeper than the hash", branch.path()));
            }
            node = branch.child(hash.bucket(depth))?;
        }
    }

    /// All leaves covering the partition at `prefix`.
    ///
    /// A leaf met before the prefix is exhausted covers the whole range on
    /// its own. Leaves come back in ascending path order.
    pub fn leaves_under(&self, prefix: &TriePath) -> Vec<Leaf<'a>> {
        let mut node = self.root_node();
        for &bucket in prefix.buckets() {
            let branch = match node {
                Node::Leaf(leaf) => return vec![leaf],
                Node::Branch(branch) => branch,
            };
            match branch.child(bucket) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }

        let mut leaves = Vec::new();
        collect_leaves(node, &mut leaves);
        leaves
    }

    /// Every leaf, in ascending path order
    pub fn leaves(&self) -> Vec<Leaf<'a>> {
        self.leaves_under(&TriePath::root())
    }

    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats::default();
        let mut stack = vec![self.root_node()];
        while let Some(node) = stack.pop() {
            stats.max_depth = stats.max_depth.max(node.path().depth());
            match node {
                Node::Leaf(_) => stats.leaves += 1,
                Node::Branch(branch) => {
                    stats.branches += 1;
                    for child in branch.children() {
                        match child {
                            Some(child) => stack.push(child),
                            None => stats.empty_slots += 1,
                        }
                    }
                }
            }
        }
        stats
    }

    /// Describe this trie as a [`TrieShape`]
    pub fn to_shape(&self) -> TrieShape {
        shape_of(&self.root_node())
    }
}

fn collect_leaves<'a>(node: Node<'a>, out: &mut Vec<Leaf<'a>>) {
    match node {
        Node::Leaf(leaf) => out.push(leaf),
        Node::Branch(branch) => {
            for child in branch.children().into_iter().flatten() {
                collect_leaves(child, out);
            }
        }
    }
}

fn shape_of(node: &Node<'_>) -> TrieShape {
    match node {
        Node::Leaf(leaf) => TrieShape::Leaf(leaf.data_page_idx()),
        Node::Branch(branch) => TrieShape::Branch(
            branch
                .children()
                .iter()
                .map(|child| child.as_ref().map(shape_of))
                .collect(),
        ),
    }
}

impl fmt::Debug for HashTrie<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTrie")
            .field("slots", &self.encoding.len())
            .field("leaves", &self.encoding.leaf_count())
            .finish()
    }
}
