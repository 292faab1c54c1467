//! Error types for gentrie

use thiserror::Error;

/// Result type alias for gentrie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable errors raised at the load and storage boundaries.
///
/// Faults found while traversing an already-opened trie are not errors:
/// they panic, because continuing would risk serving the wrong pages.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Invalid trie file: {0}")]
    InvalidFile(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Malformed trie encoding: {0}")]
    MalformedEncoding(String),

    #[error("Page not found: {0}")]
    PageNotFound(u32),

    #[error("No page store for generation {0}")]
    GenerationNotFound(usize),

    #[error("Config error: {0}")]
    Config(String),
}
