//! Operations across trie generations

mod merge;

pub use merge::{merge_plan, MergeLeaf, MergePlan, MergeTask};
