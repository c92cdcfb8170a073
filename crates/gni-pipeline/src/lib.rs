//! Event reconciliation for the Graph Network Indexer (GNI).
//!
//! This crate turns an ordered stream of decoded contract events into
//! entity writes. It provides:
//! - A dispatch table from `(kind, generation)` signatures to handlers
//! - Handlers for the name service, curation, staking and bridge contracts
//! - The cross-layer linker relating a resource's identities on two ledgers
//! - A [`Pipeline`] that applies each event all-or-nothing, keeps counters
//!   and a replay checkpoint
//! - Ports for content-addressed metadata and contract state
//! - Stream validation ahead of ingestion

pub mod config;
pub mod context;
pub mod counter;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod linker;
pub mod metadata;
pub mod params;
pub mod pipeline;
pub mod record;
pub mod state;
pub mod validation;

pub use config::PipelineConfig;
pub use context::{HandlerContext, Services};
pub use counter::CounterAggregator;
pub use dispatch::{DispatchTable, Handler};
pub use error::{FetchError, PipelineError, Result};
pub use linker::{LinkOutcome, Linkable};
pub use metadata::{ContentFetcher, DirContentFetcher, InMemoryContentFetcher, NoContentFetcher};
pub use params::ParamReader;
pub use pipeline::{EventOutcome, FailedEvent, Pipeline, RunReport};
pub use record::RecordBuilder;
pub use state::{ContractStateReader, NoStateReader, StaticStateReader};
pub use validation::{StreamValidator, ValidationReport, Violation, ViolationKind};
