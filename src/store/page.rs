//! Page store seam
//!
//! Leaves carry only a page index. Turning that index into row data is the
//! job of a [`PageStore`]; the trie never reads rows itself.

use crate::{Error, Result};
use bytes::Bytes;
use parking_lot::RwLock;

/// Resolves data page indices to page contents
pub trait PageStore: Send + Sync {
    /// Fetch the page at `idx`
    fn page(&self, idx: u32) -> Result<Bytes>;

    /// Number of pages available
    fn page_count(&self) -> usize;
}

/// Pages held in memory, indexed in insertion order
#[derive(Default)]
pub struct MemoryPageStore {
    pages: RwLock<Vec<Bytes>>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page, returning its index
    pub fn push(&self, page: impl Into<Bytes>) -> u32 {
        let mut pages = self.pages.write();
        pages.push(page.into());
        (pages.len() - 1) as u32
    }
}

impl PageStore for MemoryPageStore {
    fn page(&self, idx: u32) -> Result<Bytes> {
        let pages = self.pages.read();
        pages
            .get(idx as usize)
            .cloned()
            .ok_or(Error::PageNotFound(idx))
    }

    fn page_count(&self) -> usize {
        self.pages.read().len()
    }
}
