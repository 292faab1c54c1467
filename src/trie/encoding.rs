//! Columnar encoding of a whole trie
//!
//! Layout:
//! ```text
//! type_ids        [u8]           one tag per node slot (0 absent, 1 branch, 2 leaf)
//! offsets         [u32]          per slot: branch ordinal or leaf ordinal
//! branch_offsets  [u32]          branch b owns branch_children[b_offsets[b]..b_offsets[b+1]]
//! branch_children [Option<u32>]  node slot index, or None for an empty bucket
//! data_page_idxs  [u32]          one page index per leaf
//! ```
//!
//! Writers emit children before the node that references them, so the root
//! is always the last slot.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node slot discriminant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeTag {
    Absent,
    Branch,
    Leaf,
}

impl NodeTag {
    pub fn as_byte(&self) -> u8 {
        match self {
            NodeTag::Absent => 0,
            NodeTag::Branch => 1,
            NodeTag::Leaf => 2,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(NodeTag::Absent),
            1 => Some(NodeTag::Branch),
            2 => Some(NodeTag::Leaf),
            _ => None,
        }
    }
}

/// Widest branch a byte-sized bucket can address
pub const MAX_FAN_OUT: usize = u8::MAX as usize + 1;

/// Aborts a traversal over an encoding that breaks the layout contract.
#[cold]
#[track_caller]
pub(crate) fn malformed(detail: fmt::Arguments<'_>) -> ! {
    panic!("malformed trie encoding: {}", detail)
}

/// The frozen columnar form of one trie generation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieEncoding {
    type_ids: Vec<u8>,
    offsets: Vec<u32>,
    branch_offsets: Vec<u32>,
    branch_children: Vec<Option<u32>>,
    data_page_idxs: Vec<u32>,
}

impl TrieEncoding {
    /// Wrap columns produced by an external writer. No checks are made here;
    /// call [`TrieEncoding::validate`] on anything read from outside the process.
    pub fn from_columns(
        type_ids: Vec<u8>,
        offsets: Vec<u32>,
        branch_offsets: Vec<u32>,
        branch_children: Vec<Option<u32>>,
        data_page_idxs: Vec<u32>,
    ) -> Self {
        TrieEncoding {
            type_ids,
            offsets,
            branch_offsets,
            branch_children,
            data_page_idxs,
        }
    }

    /// Number of node slots, absent ones included
    pub fn len(&self) -> usize {
        self.type_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.type_ids.is_empty()
    }

    pub fn branch_count(&self) -> usize {
        self.branch_offsets.len().saturating_sub(1)
    }

    pub fn leaf_count(&self) -> usize {
        self.data_page_idxs.len()
    }

    pub fn type_ids(&self) -> &[u8] {
        &self.type_ids
    }

    pub fn data_page_idxs(&self) -> &[u32] {
        &self.data_page_idxs
    }

    /// Check every structural invariant the reader relies on.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(Error::MalformedEncoding(msg));

        if self.type_ids.is_empty() {
            return bad("encoding has no node slots".into());
        }
        if self.offsets.len() != self.type_ids.len() {
            return bad(format!(
                "{} offsets for {} node slots",
                self.offsets.len(),
                self.type_ids.len()
            ));
        }

        if let Some(&first) = self.branch_offsets.first() {
            if first != 0 {
                return bad(format!("branch offsets start at {}", first));
            }
        }
        for pair in self.branch_offsets.windows(2) {
            if pair[1] < pair[0] {
                return bad(format!("branch offsets decrease: {} -> {}", pair[0], pair[1]));
            }
        }
        if let Some(&last) = self.branch_offsets.last() {
            if last as usize > self.branch_children.len() {
                return bad(format!(
                    "branch offsets end at {} past {} children",
                    last,
                    self.branch_children.len()
                ));
            }
        }

        for (idx, (&type_id, &offset)) in self.type_ids.iter().zip(&self.offsets).enumerate() {
            match NodeTag::from_byte(type_id) {
                Some(NodeTag::Absent) => {}
                Some(NodeTag::Branch) => {
                    if offset as usize >= self.branch_count() {
                        return bad(format!("slot {} references missing branch {}", idx, offset));
                    }
                    let run = self.branch_run(offset);
                    if run.len() > MAX_FAN_OUT {
                        return bad(format!(
                            "slot {} has fan-out {} beyond {}",
                            idx,
                            run.len(),
                            MAX_FAN_OUT
                        ));
                    }
                    for child in run.iter().flatten() {
                        if *child as usize >= idx {
                            return bad(format!(
                                "slot {} references child {} not written before it",
                                idx, child
                            ));
                        }
                    }
                }
                Some(NodeTag::Leaf) => {
                    if offset as usize >= self.data_page_idxs.len() {
                        return bad(format!("slot {} references missing leaf {}", idx, offset));
                    }
                }
                None => return bad(format!("slot {} has unknown tag {}", idx, type_id)),
            }
        }

        if self.type_ids[self.type_ids.len() - 1] == NodeTag::Absent.as_byte() {
            return bad("root slot is absent".into());
        }

        Ok(())
    }

    // === Traversal accessors: these panic on a malformed encoding ===

    pub(crate) fn tag_at(&self, idx: u32) -> NodeTag {
        let Some(&type_id) = self.type_ids.get(idx as usize) else {
            malformed(format_args!("slot {} out of {} slots", idx, self.type_ids.len()))
        };
        NodeTag::from_byte(type_id)
            .unwrap_or_else(|| malformed(format_args!("slot {} has unknown tag {}", idx, type_id)))
    }

    pub(crate) fn offset_at(&self, idx: u32) -> u32 {
        match self.offsets.get(idx as usize) {
            Some(&offset) => offset,
            None => malformed(format_args!("slot {} has no offset", idx)),
        }
    }

    pub(crate) fn branch_run(&self, branch: u32) -> &[Option<u32>] {
        let b = branch as usize;
        let (Some(&start), Some(&end)) = (self.branch_offsets.get(b), self.branch_offsets.get(b + 1))
        else {
            malformed(format_args!("branch {} out of {} branches", branch, self.branch_count()))
        };
        match self.branch_children.get(start as usize..end as usize) {
            Some(run) => run,
            None => malformed(format_args!(
                "branch {} run {}..{} outside {} children",
                branch,
                start,
                end,
                self.branch_children.len()
            )),
        }
    }

    pub(crate) fn data_page_idx(&self, leaf: u32) -> u32 {
        match self.data_page_idxs.get(leaf as usize) {
            Some(&page) => page,
            None => malformed(format_args!(
                "leaf {} out of {} leaves",
                leaf,
                self.data_page_idxs.len()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root branch (fan-out 2) over a leaf at page 7 and an empty bucket
    fn small() -> TrieEncoding {
        TrieEncoding::from_columns(vec![2, 1], vec![0, 0], vec![0, 2], vec![Some(0), None], vec![7])
    }

    #[test]
    fn test_valid_encoding() {
        let enc = small();
        enc.validate().unwrap();
        assert_eq!(enc.len(), 2);
        assert_eq!(enc.branch_count(), 1);
        assert_eq!(enc.leaf_count(), 1);
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = TrieEncoding::default().validate().unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding(_)));
    }

    #[test]
    fn test_validate_rejects_unknown_tag() {
        let enc = TrieEncoding::from_columns(vec![3, 1], vec![0, 0], vec![0, 1], vec![Some(0)], vec![]);
        let err = enc.validate().unwrap_err();
        assert!(err.to_string().contains("unknown tag 3"));
    }

    #[test]
    fn test_validate_rejects_forward_child() {
        let enc = TrieEncoding::from_columns(
            vec![1, 2],
            vec![0, 0],
            vec![0, 1],
            vec![Some(1)],
            vec![4],
        );
        let err = enc.validate().unwrap_err();
        assert!(err.to_string().contains("not written before"));
    }

    #[test]
    fn test_validate_rejects_bad_run() {
        let enc = TrieEncoding::from_columns(vec![2, 1], vec![0, 0], vec![0, 5], vec![Some(0)], vec![1]);
        assert!(enc.validate().is_err());

        let enc = TrieEncoding::from_columns(vec![2, 1], vec![0, 0], vec![1, 0], vec![Some(0)], vec![1]);
        assert!(enc.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_wide_branch() {
        let width = MAX_FAN_OUT + 1;
        let enc = TrieEncoding::from_columns(
            vec![2, 1],
            vec![0, 0],
            vec![0, width as u32],
            vec![Some(0); width],
            vec![1],
        );
        let err = enc.validate().unwrap_err();
        assert!(err.to_string().contains("fan-out 257"));

        let enc = TrieEncoding::from_columns(
            vec![2, 1],
            vec![0, 0],
            vec![0, MAX_FAN_OUT as u32],
            vec![Some(0); MAX_FAN_OUT],
            vec![1],
        );
        enc.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_absent_root() {
        let enc = TrieEncoding::from_columns(vec![2, 0], vec![0, 0], vec![], vec![], vec![1]);
        let err = enc.validate().unwrap_err();
        assert!(err.to_string().contains("root slot is absent"));
    }

    #[test]
    fn test_validate_rejects_missing_leaf() {
        let enc = TrieEncoding::from_columns(vec![2], vec![3], vec![], vec![], vec![1]);
        assert!(enc.validate().is_err());
    }

    #[test]
    #[should_panic(expected = "malformed trie encoding")]
    fn test_branch_run_out_of_range_panics() {
        small().branch_run(4);
    }

    #[test]
    fn test_tag_bytes() {
        for tag in [NodeTag::Absent, NodeTag::Branch, NodeTag::Leaf] {
            assert_eq!(NodeTag::from_byte(tag.as_byte()), Some(tag));
        }
        assert_eq!(NodeTag::from_byte(9), None);
    }
}
