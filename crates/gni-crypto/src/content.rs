use std::fmt;

use alloy_primitives::B256;
use gni_types::codec::bytes_to_base58;
use gni_types::TypeError;

/// Multihash header: sha2-256, 32-byte digest.
pub const CONTENT_HASH_HEADER: [u8; 2] = [0x12, 0x20];

/// A 34-byte multihash content address.
///
/// The first two bytes are always [`CONTENT_HASH_HEADER`]; only the trailing
/// 32-byte digest varies. Displayed as base-58 (the familiar `Qm…` form).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 34]);

impl ContentHash {
    /// Prepend the fixed header to a 32-byte digest.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 34];
        bytes[..2].copy_from_slice(&CONTENT_HASH_HEADER);
        bytes[2..].copy_from_slice(digest);
        Self(bytes)
    }

    /// Like [`ContentHash::from_digest`], for digests of unchecked length.
    pub fn from_digest_slice(digest: &[u8]) -> Result<Self, TypeError> {
        let digest: &[u8; 32] = digest.try_into().map_err(|_| TypeError::InvalidLength {
            expected: 32,
            actual: digest.len(),
        })?;
        Ok(Self::from_digest(digest))
    }

    /// The full 34 bytes, header included.
    pub fn as_bytes(&self) -> &[u8; 34] {
        &self.0
    }

    /// The trailing 32-byte digest.
    pub fn digest(&self) -> &[u8] {
        &self.0[2..]
    }

    pub fn to_base58(&self) -> String {
        bytes_to_base58(&self.0)
    }
}

/// Build the content address of a raw 32-byte digest.
pub fn build_content_hash(digest: &B256) -> ContentHash {
    ContentHash::from_digest(&digest.0)
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_base58())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl From<ContentHash> for [u8; 34] {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}
