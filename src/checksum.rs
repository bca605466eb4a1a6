//! Batch fingerprints

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 checksum over a batch of uploaded documents
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(data)))
    }

    /// Compute one checksum over several chunks, in order
    pub fn from_chunks<'a, I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut hasher = Sha256::new();
        for chunk in chunks {
            hasher.update(chunk);
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_match_concatenation() {
        let joined = Checksum::from_bytes(b"abcdef");
        let chunked = Checksum::from_chunks([b"abc".as_slice(), b"def".as_slice()]);
        assert_eq!(joined, chunked);
        assert_eq!(joined.as_str().len(), 64);
    }

    #[test]
    fn test_order_matters() {
        let a = Checksum::from_chunks([b"one".as_slice(), b"two".as_slice()]);
        let b = Checksum::from_chunks([b"two".as_slice(), b"one".as_slice()]);
        assert_ne!(a, b);
    }
}
