//! Foundation types for the Graph Network Indexer (GNI).
//!
//! This crate provides the identifier codec and the identity and event types
//! used throughout the GNI system. Every other GNI crate depends on
//! `gni-types`.
//!
//! # Key Types
//!
//! - [`EntityKey`]: Separator-safe composite primary key
//! - [`ResourceId`]: 256-bit subgraph identifier with its base-58 rendering
//! - [`RawEvent`]: Decoded contract event log
//! - [`EventPosition`]: Stream ordering key `(block, log index)`
//! - [`EventSignature`]: Event kind plus contract generation

pub mod codec;
pub mod error;
pub mod event;
pub mod identity;
pub mod key;
pub mod position;

pub use alloy_primitives::{Address, B256, U256};
pub use error::TypeError;
pub use event::{EventDomain, EventKind, EventParam, EventSchemaVersion, EventSignature, RawEvent};
pub use identity::ResourceId;
pub use key::EntityKey;
pub use position::EventPosition;
