//! Storage collaborators: trie files on disk and data page lookup

mod file_store;
mod page;

pub use file_store::TrieFile;
pub use page::{MemoryPageStore, PageStore};
