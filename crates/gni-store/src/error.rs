use gni_types::EntityKey;

use crate::entity::{EntityKind, StoreKey};

/// Errors from entity store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required entity was not found.
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: EntityKey },

    /// The stored entity is not of the requested kind.
    #[error("kind mismatch at {key}: expected {expected}, found {actual}")]
    KindMismatch {
        key: StoreKey,
        expected: EntityKind,
        actual: EntityKind,
    },

    /// A record was offered under a key other than its own id.
    #[error("record id {actual} does not match key {expected}")]
    KeyMismatch { expected: EntityKey, actual: EntityKey },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
