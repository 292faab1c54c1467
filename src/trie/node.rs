//! Node descriptors handed out by a [`HashTrie`]
//!
//! Nodes are small values (path plus an ordinal into the encoding). They are
//! rebuilt on every traversal call and never cached; two descriptors for the
//! same slot compare equal.

use super::encoding::{malformed, MAX_FAN_OUT};
use super::HashTrie;
use crate::model::TriePath;
use std::fmt;

/// A node of a materialized trie
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node<'a> {
    Branch(Branch<'a>),
    Leaf(Leaf<'a>),
}

/// What [`Node::children`] returns
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Children<'a> {
    /// One entry per bucket of a branch; `None` is a bucket with no data
    Slots(Vec<Option<Node<'a>>>),
    /// Leaves have no child slots at all
    Terminal,
}

impl<'a> Children<'a> {
    pub fn slots(&self) -> Option<&[Option<Node<'a>>]> {
        match self {
            Children::Slots(slots) => Some(slots),
            Children::Terminal => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Children::Terminal)
    }
}

impl<'a> Node<'a> {
    pub fn path(&self) -> &TriePath {
        match self {
            Node::Branch(branch) => branch.path(),
            Node::Leaf(leaf) => leaf.path(),
        }
    }

    pub fn children(&self) -> Children<'a> {
        match self {
            Node::Branch(branch) => Children::Slots(branch.children()),
            Node::Leaf(_) => Children::Terminal,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_branch(&self) -> Option<&Branch<'a>> {
        match self {
            Node::Branch(branch) => Some(branch),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf<'a>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Branch(_) => None,
        }
    }
}

/// An internal node: a sparse, fixed-length run of child slots
#[derive(Clone)]
pub struct Branch<'a> {
    trie: HashTrie<'a>,
    path: TriePath,
    branch: u32,
}

impl<'a> Branch<'a> {
    pub(crate) fn new(trie: HashTrie<'a>, path: TriePath, branch: u32) -> Self {
        Branch { trie, path, branch }
    }

    pub fn path(&self) -> &TriePath {
        &self.path
    }

    /// Number of child slots this branch was written with
    pub fn fan_out(&self) -> usize {
        self.trie.encoding().branch_run(self.branch).len()
    }

    /// Resolve every child slot. Slot `i` has path `self.path().extend(i)`.
    pub fn children(&self) -> Vec<Option<Node<'a>>> {
        let run = self.trie.encoding().branch_run(self.branch);
        if run.len() > MAX_FAN_OUT {
            malformed(format_args!(
                "branch {} has fan-out {} beyond a byte bucket",
                self.branch,
                run.len()
            ));
        }

        run.iter()
            .enumerate()
            .map(|(bucket, child)| {
                child.and_then(|idx| self.trie.resolve(self.path.extend(bucket as u8), idx))
            })
            .collect()
    }

    /// Resolve a single child slot; slots past the fan-out are empty.
    pub fn child(&self, bucket: u8) -> Option<Node<'a>> {
        let run = self.trie.encoding().branch_run(self.branch);
        run.get(usize::from(bucket))
            .copied()
            .flatten()
            .and_then(|idx| self.trie.resolve(self.path.extend(bucket), idx))
    }
}

impl PartialEq for Branch<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.trie.same_encoding(&other.trie) && self.branch == other.branch && self.path == other.path
    }
}

impl Eq for Branch<'_> {}

impl fmt::Debug for Branch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("path", &self.path)
            .field("branch", &self.branch)
            .finish()
    }
}

/// A terminal node referencing exactly one data page
#[derive(Clone)]
pub struct Leaf<'a> {
    trie: HashTrie<'a>,
    path: TriePath,
    leaf: u32,
}

impl<'a> Leaf<'a> {
    pub(crate) fn new(trie: HashTrie<'a>, path: TriePath, leaf: u32) -> Self {
        Leaf { trie, path, leaf }
    }

    pub fn path(&self) -> &TriePath {
        &self.path
    }

    /// Index of this leaf's page in the page store
    pub fn data_page_idx(&self) -> u32 {
        self.trie.encoding().data_page_idx(self.leaf)
    }
}

impl PartialEq for Leaf<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.trie.same_encoding(&other.trie) && self.leaf == other.leaf && self.path == other.path
    }
}

impl Eq for Leaf<'_> {}

impl fmt::Debug for Leaf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("path", &self.path)
            .field("data_page_idx", &self.data_page_idx())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::{TrieEncoding, TrieShape, TrieWriter};

    fn leaf(page: u32) -> Option<TrieShape> {
        Some(TrieShape::Leaf(page))
    }

    #[test]
    fn test_sparse_children() {
        let enc = TrieWriter::encode(&TrieShape::Branch(vec![None, leaf(10), None, leaf(30), None]));
        let trie = HashTrie::new(&enc);

        let root = trie.root_node();
        let children = root.children();
        let slots = children.slots().unwrap();
        assert_eq!(slots.len(), 5);

        for (i, slot) in slots.iter().enumerate() {
            match i {
                1 | 3 => {
                    let node = slot.as_ref().unwrap();
                    assert_eq!(node.path().last(), Some(i as u8));
                    assert_eq!(node.path(), &root.path().extend(i as u8));
                }
                _ => assert!(slot.is_none()),
            }
        }

        let pages: Vec<_> = slots
            .iter()
            .flatten()
            .map(|n| n.as_leaf().unwrap().data_page_idx())
            .collect();
        assert_eq!(pages, vec![10, 30]);
    }

    #[test]
    fn test_leaf_is_terminal() {
        let enc = TrieWriter::encode(&TrieShape::Branch(vec![leaf(7)]));
        let trie = HashTrie::new(&enc);
        let child = trie.root_node().as_branch().unwrap().child(0).unwrap();

        assert!(child.is_leaf());
        assert!(child.children().is_terminal());
        assert_eq!(child.children().slots(), None);
    }

    #[test]
    fn test_empty_branch_is_not_a_leaf() {
        let enc = TrieWriter::encode(&TrieShape::Branch(vec![]));
        let trie = HashTrie::new(&enc);
        let root = trie.root_node();

        assert!(!root.is_leaf());
        assert_eq!(root.children(), Children::Slots(vec![]));
        assert_eq!(root.as_branch().unwrap().fan_out(), 0);
    }

    #[test]
    fn test_child_past_fan_out_is_empty() {
        let enc = TrieWriter::encode(&TrieShape::Branch(vec![leaf(1), leaf(2)]));
        let trie = HashTrie::new(&enc);
        let root = trie.root_node();
        let branch = root.as_branch().unwrap();

        assert!(branch.child(1).is_some());
        assert!(branch.child(2).is_none());
        assert!(branch.child(255).is_none());
    }

    #[test]
    fn test_absent_tagged_child_is_a_hole() {
        // slot 0 absent, slot 1 leaf, slot 2 root branch pointing at both
        let enc = TrieEncoding::from_columns(
            vec![0, 2, 1],
            vec![0, 0, 0],
            vec![0, 2],
            vec![Some(0), Some(1)],
            vec![5],
        );
        let trie = HashTrie::new(&enc);
        let slots = trie.root_node().as_branch().unwrap().children();

        assert!(slots[0].is_none());
        assert_eq!(slots[1].as_ref().unwrap().as_leaf().unwrap().data_page_idx(), 5);
    }

    #[test]
    fn test_descriptors_from_different_tries_differ() {
        let shape = TrieShape::Branch(vec![leaf(1)]);
        let a = TrieWriter::encode(&shape);
        let b = TrieWriter::encode(&shape);

        assert_eq!(HashTrie::new(&a).root_node(), HashTrie::new(&a).root_node());
        assert_ne!(HashTrie::new(&a).root_node(), HashTrie::new(&b).root_node());
    }
}
