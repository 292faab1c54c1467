//! Forward-pass writer for [`TrieEncoding`]
//!
//! Children are written before the node that points at them, and the last
//! node written becomes the root. Nothing is ever patched after the fact.

use super::encoding::{NodeTag, TrieEncoding};
use serde::{Deserialize, Serialize};

/// A tree description of a trie, used for fixtures and the `import`/`dump`
/// commands.
///
/// JSON form: `{"branch": [{"leaf": 7}, null]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrieShape {
    /// Child slots, `null` for an empty bucket
    Branch(Vec<Option<TrieShape>>),
    /// A data page index
    Leaf(u32),
}

/// Accumulates node slots for one encoding
#[derive(Debug)]
pub struct TrieWriter {
    type_ids: Vec<u8>,
    offsets: Vec<u32>,
    branch_offsets: Vec<u32>,
    branch_children: Vec<Option<u32>>,
    data_page_idxs: Vec<u32>,
}

impl Default for TrieWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieWriter {
    pub fn new() -> Self {
        TrieWriter {
            type_ids: Vec::new(),
            offsets: Vec::new(),
            branch_offsets: vec![0],
            branch_children: Vec::new(),
            data_page_idxs: Vec::new(),
        }
    }

    /// Encode a whole shape in one go
    pub fn encode(shape: &TrieShape) -> TrieEncoding {
        let mut writer = TrieWriter::new();
        writer.write_shape(shape);
        writer.finish()
    }

    fn next_slot(&self) -> u32 {
        u32::try_from(self.type_ids.len()).expect("trie slot count exceeds u32")
    }

    fn push_slot(&mut self, tag: NodeTag, offset: u32) -> u32 {
        let slot = self.next_slot();
        self.type_ids.push(tag.as_byte());
        self.offsets.push(offset);
        slot
    }

    /// Write an absent slot
    pub fn write_absent(&mut self) -> u32 {
        self.push_slot(NodeTag::Absent, 0)
    }

    /// Write a leaf pointing at `data_page_idx`
    pub fn write_leaf(&mut self, data_page_idx: u32) -> u32 {
        let leaf = self.data_page_idxs.len() as u32;
        self.data_page_idxs.push(data_page_idx);
        self.push_slot(NodeTag::Leaf, leaf)
    }

    /// Write a branch over already-written child slots.
    ///
    /// # Panics
    ///
    /// If a child slot has not been written yet.
    pub fn write_branch(&mut self, children: &[Option<u32>]) -> u32 {
        let next = self.next_slot();
        for child in children.iter().flatten() {
            assert!(
                *child < next,
                "child slot {} must be written before its branch",
                child
            );
        }

        let branch = (self.branch_offsets.len() - 1) as u32;
        self.branch_children.extend_from_slice(children);
        self.branch_offsets.push(self.branch_children.len() as u32);
        self.push_slot(NodeTag::Branch, branch)
    }

    /// Write `shape` bottom-up, returning the slot of its top node
    pub fn write_shape(&mut self, shape: &TrieShape) -> u32 {
        match shape {
            TrieShape::Leaf(page) => self.write_leaf(*page),
            TrieShape::Branch(children) => {
                let slots: Vec<Option<u32>> = children
                    .iter()
                    .map(|child| child.as_ref().map(|c| self.write_shape(c)))
                    .collect();
                self.write_branch(&slots)
            }
        }
    }

    pub fn finish(self) -> TrieEncoding {
        TrieEncoding::from_columns(
            self.type_ids,
            self.offsets,
            self.branch_offsets,
            self.branch_children,
            self.data_page_idxs,
        )
    }
}
