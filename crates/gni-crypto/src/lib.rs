//! Identifier derivation for the Graph Network Indexer.
//!
//! Provides Keccak-256 resource id derivation (with the byte-reversal
//! convention the contracts use), multihash content addresses, and BLAKE3
//! fingerprints over entity store contents.
//!
//! All hashing wraps established libraries; there is no custom cryptography.

pub mod content;
pub mod derive;
pub mod hasher;

pub use content::{build_content_hash, ContentHash, CONTENT_HASH_HEADER};
pub use derive::{decode_content_address, derive_resource_id, encode_resource_id_as_content_address};
pub use hasher::{StateHasher, StateRoot};
