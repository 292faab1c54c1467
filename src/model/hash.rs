//! Key digests and the bucket scheme that shapes every trie

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bits of the key hash consumed per trie level
pub const LEVEL_BITS: u32 = 2;

/// Fan-out of a full branch
pub const LEVEL_WIDTH: usize = 1 << LEVEL_BITS;

const LEVEL_MASK: u8 = (LEVEL_WIDTH - 1) as u8;

/// Deepest level a hash can address
pub const MAX_DEPTH: usize = 32 * 8 / LEVEL_BITS as usize;

/// A 32-byte BLAKE3 digest of a row key
///
/// Rows are partitioned by their key hash, two bits per level, most
/// significant bits first. Every writer uses the same scheme, so a bucket
/// path means the same partition in every generation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// The zero hash
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Create a hash from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// Hash a row key
    pub fn digest(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Hash(*hash.as_bytes())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The bucket this hash falls into at `level` (0 = children of the root).
    ///
    /// # Panics
    ///
    /// If `level >= MAX_DEPTH`.
    pub fn bucket(&self, level: usize) -> u8 {
        assert!(level < MAX_DEPTH, "level {} beyond hash depth", level);
        let bit = level * LEVEL_BITS as usize;
        let byte = self.0[bit / 8];
        let shift = 8 - LEVEL_BITS as usize - (bit % 8);
        (byte >> shift) & LEVEL_MASK
    }

    /// Bucket path of this hash truncated to `depth` levels
    pub fn path(&self, depth: usize) -> super::TriePath {
        super::TriePath::from_buckets((0..depth).map(|l| self.bucket(l)).collect::<Vec<_>>())
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Hash(arr))
    }

    /// Short hex prefix for display
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.short())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Hash::ZERO
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
