//! Lockstep walk over several trie generations
//!
//! Every generation partitions rows with the same bucket scheme, so slot `i`
//! of a branch at path `p` is the same partition in every trie. The walker
//! descends into slot `i` of all tries together and emits one task per
//! partition naming the pages a compactor must merge there.
//!
//! Generations need not agree on depth. Where one trie stops at a leaf and
//! another keeps branching, the leaf is carried into every sub-bucket: its
//! page holds rows for all of them, and the consumer filters by path.

use crate::model::TriePath;
use crate::store::PageStore;
use crate::trie::{HashTrie, Node};
use crate::{Error, Result};
use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// A page contributed by one generation to a merge task
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeLeaf {
    /// Position of the generation in the slice given to [`merge_plan`]
    pub trie: usize,
    /// The leaf's own path, which may be shorter than the task's
    pub path: TriePath,
    pub data_page_idx: u32,
}

/// One partition of the merged output
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeTask {
    pub path: TriePath,
    /// Contributing leaves, in generation order
    pub leaves: Vec<MergeLeaf>,
}

impl MergeTask {
    /// Fetch every contributing page, one store per generation.
    pub fn read_pages(&self, stores: &[&dyn PageStore]) -> Result<Vec<Bytes>> {
        self.leaves
            .iter()
            .map(|leaf| {
                let store = stores
                    .get(leaf.trie)
                    .ok_or(Error::GenerationNotFound(leaf.trie))?;
                store.page(leaf.data_page_idx)
            })
            .collect()
    }
}

/// The full set of merge tasks, in ascending path order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergePlan {
    tasks: Vec<MergeTask>,
}

impl MergePlan {
    pub fn tasks(&self) -> &[MergeTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Distinct `(trie, data_page_idx)` pairs the plan reads
    pub fn page_refs(&self) -> Vec<(usize, u32)> {
        self.tasks
            .iter()
            .flat_map(|task| task.leaves.iter().map(|l| (l.trie, l.data_page_idx)))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl IntoIterator for MergePlan {
    type Item = MergeTask;
    type IntoIter = std::vec::IntoIter<MergeTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}

/// Plan the merge of `tries` into one generation.
///
/// # Panics
///
/// If any encoding is malformed; see [`HashTrie::root_node`].
pub fn merge_plan(tries: &[HashTrie<'_>]) -> MergePlan {
    let roots = tries.iter().map(|t| Some(t.root_node())).collect();
    let mut tasks = Vec::new();
    walk(TriePath::root(), roots, &mut tasks);

    debug!(tries = tries.len(), tasks = tasks.len(), "planned merge");
    MergePlan { tasks }
}

fn walk<'a>(path: TriePath, nodes: Vec<Option<Node<'a>>>, tasks: &mut Vec<MergeTask>) {
    if nodes.iter().all(Option::is_none) {
        return;
    }

    let slots: Vec<Option<Vec<Option<Node<'a>>>>> = nodes
        .iter()
        .map(|node| match node {
            Some(Node::Branch(branch)) => Some(branch.children()),
            _ => None,
        })
        .collect();
    let fan_out = slots.iter().flatten().map(Vec::len).max().unwrap_or(0);

    if fan_out == 0 {
        let leaves: Vec<MergeLeaf> = nodes
            .iter()
            .enumerate()
            .filter_map(|(trie, node)| match node {
                Some(Node::Leaf(leaf)) => Some(MergeLeaf {
                    trie,
                    path: leaf.path().clone(),
                    data_page_idx: leaf.data_page_idx(),
                }),
                _ => None,
            })
            .collect();
        if !leaves.is_empty() {
            tasks.push(MergeTask { path, leaves });
        }
        return;
    }

    for bucket in 0..fan_out {
        let next = nodes
            .iter()
            .zip(&slots)
            .map(|(node, children)| match (node, children) {
                (Some(Node::Branch(_)), Some(children)) => children.get(bucket).cloned().flatten(),
                (Some(Node::Leaf(leaf)), _) => Some(Node::Leaf(leaf.clone())),
                _ => None,
            })
            .collect();
        walk(path.extend(bucket as u8), next, tasks);
    }
}
