use std::fmt;

use serde::{Deserialize, Serialize};

/// Domain-separated BLAKE3 fingerprint over an ordered set of key/value
/// entries.
///
/// Each entry is length-prefixed, so `("ab", "c")` and `("a", "bc")` hash
/// differently. Callers feed entries in a canonical (sorted) order; the
/// hasher itself does not sort.
pub struct StateHasher {
    inner: blake3::Hasher,
    entries: u64,
}

impl StateHasher {
    /// Domain tag for entity store fingerprints.
    pub const STATE: &'static str = "gni-state-v1";

    pub fn new() -> Self {
        Self::with_domain(Self::STATE)
    }

    /// Create a hasher with a custom domain tag.
    pub fn with_domain(domain: &str) -> Self {
        let mut inner = blake3::Hasher::new();
        inner.update(domain.as_bytes());
        inner.update(b":");
        Self { inner, entries: 0 }
    }

    /// Absorb one entry.
    pub fn absorb(&mut self, key: &[u8], value: &[u8]) {
        self.inner.update(&(key.len() as u64).to_le_bytes());
        self.inner.update(key);
        self.inner.update(&(value.len() as u64).to_le_bytes());
        self.inner.update(value);
        self.entries += 1;
    }

    /// Number of entries absorbed so far.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn finalize(&self) -> StateRoot {
        let mut hasher = self.inner.clone();
        hasher.update(&self.entries.to_le_bytes());
        StateRoot(*hasher.finalize().as_bytes())
    }
}

impl Default for StateHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint of an entity store's full contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateRoot([u8; 32]);

impl StateRoot {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateRoot({})", self.short_hex())
    }
}

impl fmt::Display for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_of(entries: &[(&str, &str)]) -> StateRoot {
        let mut hasher = StateHasher::new();
        for (k, v) in entries {
            hasher.absorb(k.as_bytes(), v.as_bytes());
        }
        hasher.finalize()
    }

    #[test]
    fn hash_is_deterministic() {
        let entries = [("a", "1"), ("b", "2")];
        assert_eq!(root_of(&entries), root_of(&entries));
    }

    #[test]
    fn entry_boundaries_matter() {
        assert_ne!(root_of(&[("ab", "c")]), root_of(&[("a", "bc")]));
    }

    #[test]
    fn order_matters() {
        assert_ne!(
            root_of(&[("a", "1"), ("b", "2")]),
            root_of(&[("b", "2"), ("a", "1")])
        );
    }

    #[test]
    fn different_domains_produce_different_roots() {
        let mut custom = StateHasher::with_domain("other-v1");
        custom.absorb(b"a", b"1");
        assert_ne!(custom.finalize(), root_of(&[("a", "1")]));
    }

    #[test]
    fn empty_state_is_stable() {
        let empty = StateHasher::new();
        assert_eq!(empty.entries(), 0);
        assert_eq!(empty.finalize(), root_of(&[]));
        assert_eq!(empty.finalize().to_hex().len(), 64);
    }
}
