//! Keyed entity storage for the Graph Network Indexer.
//!
//! Entities are typed records addressed by [`StoreKey`] (entity kind plus
//! [`gni_types::EntityKey`]). The store is a pure key-value contract; the
//! [`Registry`] layers the create-or-load discipline on top of it.
//!
//! # Storage Backends
//!
//! All backends implement the [`EntityStore`] trait:
//!
//! - [`InMemoryEntityStore`]: `HashMap`-based store with write counting and a
//!   BLAKE3 state fingerprint
//! - [`StagedStore`]: write-back overlay that commits one batch or nothing
//!
//! # Design Rules
//!
//! 1. Entities are addressed by key only; the core never scans a store.
//! 2. An entity is created at most once; later callers load it.
//! 3. The registry never caches: every decision is re-derived from the store.
//! 4. All backend errors are propagated, never silently ignored.

pub mod entity;
pub mod error;
pub mod memory;
pub mod registry;
pub mod staged;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use entity::{
    Checkpoint, Counter, CrossLayerLink, Curator, DelegatedStake, Delegator, Entity, EntityKind,
    EntityRecord, EventRecord, GraphAccount, Indexer, LinkSubject, StoreKey, Subgraph,
    SubgraphDeployment, SubgraphMetadata, SubgraphVersion, VersionMetadata, SINGLETON_ID,
};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryEntityStore;
pub use registry::Registry;
pub use staged::StagedStore;
pub use traits::EntityStore;
