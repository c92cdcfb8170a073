//! Event handlers, one function per `(kind, generation)` signature.
//!
//! Every handler reads its parameters in emitted order through a
//! [`ParamReader`](crate::params::ParamReader) and writes through the
//! context's registry. Handlers never commit; the pipeline does.

pub mod bridge;
pub mod curation;
pub mod gns;
pub mod staking;
