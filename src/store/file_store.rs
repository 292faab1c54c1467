//! Single-file storage for one trie generation
//!
//! File format:
//! ```text
//! [HEADER: 32 bytes]
//!   - magic: 8 bytes ("GENTRIE\0")
//!   - version: 4 bytes (u32 LE)
//!   - flags: 4 bytes (none defined; must be 0)
//!   - node_count: 8 bytes (u64 LE)
//!   - reserved: 8 bytes
//!
//! [BODY: variable]
//!   - zstd-compressed bincode of the TrieEncoding columns
//! ```

use crate::trie::{HashTrie, TrieEncoding};
use crate::{Error, Result, MAGIC, VERSION};
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HEADER_SIZE: usize = 32;

/// A trie generation loaded from disk
///
/// Owns the decoded encoding; views borrow from it.
pub struct TrieFile {
    path: PathBuf,
    encoding: TrieEncoding,
}

impl TrieFile {
    /// Write `encoding` to a new file at `path`, replacing any existing one
    pub fn create(
        path: impl AsRef<Path>,
        encoding: TrieEncoding,
        compression_level: i32,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        encoding.validate()?;

        let body = bincode::serialize(&encoding)?;
        let compressed = zstd::encode_all(body.as_slice(), compression_level)?;

        let mut header = [0u8; HEADER_SIZE];
        header[0..8].copy_from_slice(MAGIC);
        header[8..12].copy_from_slice(&VERSION.to_le_bytes());
        // flags: 0
        header[16..24].copy_from_slice(&(encoding.len() as u64).to_le_bytes());

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.write_all(&header)?;
        file.write_all(&compressed)?;
        file.sync_all()?;

        info!(
            path = %path.display(),
            nodes = encoding.len(),
            leaves = encoding.leaf_count(),
            bytes = HEADER_SIZE + compressed.len(),
            "wrote trie file"
        );

        Ok(TrieFile { path, encoding })
    }

    /// Open and validate an existing trie file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        // SAFETY: trie files are written once and never modified in place.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < HEADER_SIZE {
            return Err(Error::InvalidFile(format!(
                "{} bytes is shorter than the header",
                mmap.len()
            )));
        }
        if &mmap[0..8] != MAGIC {
            return Err(Error::InvalidFile("Invalid magic bytes".into()));
        }

        let version = read_u32(&mmap[8..12]);
        if version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }
        let flags = read_u32(&mmap[12..16]);
        if flags != 0 {
            return Err(Error::InvalidFile(format!("Unknown flags: {:#x}", flags)));
        }
        let node_count = read_u64(&mmap[16..24]);

        let body = zstd::decode_all(&mmap[HEADER_SIZE..])?;
        let encoding: TrieEncoding = bincode::deserialize(&body)?;

        if encoding.len() as u64 != node_count {
            return Err(Error::InvalidFile(format!(
                "header declares {} nodes, body has {}",
                node_count,
                encoding.len()
            )));
        }
        encoding.validate()?;

        debug!(path = %path.display(), nodes = node_count, "opened trie file");
        Ok(TrieFile { path, encoding })
    }

    pub fn encoding(&self) -> &TrieEncoding {
        &self.encoding
    }

    /// A view over this generation
    pub fn trie(&self) -> HashTrie<'_> {
        HashTrie::new(&self.encoding)
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
