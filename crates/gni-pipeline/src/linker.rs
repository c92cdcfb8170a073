//! Cross-layer identity linking.
//!
//! A resource that moves between ledgers keeps one row per identity. The
//! linker relates the two rows through a [`CrossLayerLink`] keyed by the
//! bridging event and points each side at its counterpart. Links only come
//! from explicit bridging payloads; nothing is inferred from similar ids.

use gni_store::{CrossLayerLink, EntityRecord, Indexer, LinkSubject, Subgraph};
use gni_types::codec::bytes_to_hex;
use gni_types::EntityKey;
use tracing::debug;

use crate::context::HandlerContext;
use crate::error::{PipelineError, Result};

/// An entity that can be linked to its counterpart on another layer.
pub trait Linkable: EntityRecord {
    const SUBJECT: LinkSubject;

    fn linked_entity(&self) -> Option<&EntityKey>;

    fn set_link(&mut self, counterpart: EntityKey, link: EntityKey);
}

impl Linkable for Subgraph {
    const SUBJECT: LinkSubject = LinkSubject::Subgraph;

    fn linked_entity(&self) -> Option<&EntityKey> {
        self.linked_entity.as_ref()
    }

    fn set_link(&mut self, counterpart: EntityKey, link: EntityKey) {
        self.linked_entity = Some(counterpart);
        self.cross_layer_link = Some(link);
    }
}

impl Linkable for Indexer {
    const SUBJECT: LinkSubject = LinkSubject::Indexer;

    fn linked_entity(&self) -> Option<&EntityKey> {
        self.linked_entity.as_ref()
    }

    fn set_link(&mut self, counterpart: EntityKey, link: EntityKey) {
        self.linked_entity = Some(counterpart);
        self.cross_layer_link = Some(link);
    }
}

/// What a link request did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    /// The relation already existed; nothing was written.
    AlreadyLinked,
}

/// Relate `l1` and `l2`, both already created-or-loaded by the caller.
///
/// Idempotent: a link under this event's id, or two sides already pointing
/// at each other, leave the store untouched. A side that points at a
/// different counterpart is an integrity violation.
pub fn link<T: Linkable>(ctx: &HandlerContext<'_>, mut l1: T, mut l2: T) -> Result<LinkOutcome> {
    if ctx.registry.exists::<CrossLayerLink>(&ctx.event_id)? {
        debug!(link = %ctx.event_id, "cross-layer link already recorded");
        return Ok(LinkOutcome::AlreadyLinked);
    }

    let l1_id = l1.id().clone();
    let l2_id = l2.id().clone();
    let l1_points_at_l2 = check_counterpart(&l1, &l2_id)?;
    let l2_points_at_l1 = check_counterpart(&l2, &l1_id)?;
    match (l1_points_at_l2, l2_points_at_l1) {
        (true, true) => {
            debug!(l1 = %l1_id, l2 = %l2_id, "sides already linked");
            return Ok(LinkOutcome::AlreadyLinked);
        }
        (false, false) => {}
        _ => {
            return Err(PipelineError::IntegrityViolation(format!(
                "{:?} {l1_id} and {l2_id} are only linked one way",
                T::SUBJECT
            )));
        }
    }

    let link = CrossLayerLink {
        id: ctx.event_id.clone(),
        subject: T::SUBJECT,
        l1: l1_id.clone(),
        l2: l2_id.clone(),
        block_number: ctx.block(),
        transaction_hash: bytes_to_hex(ctx.event.transaction_hash.as_slice()),
        finalized: false,
        finalized_at_block: None,
    };
    l1.set_link(l2_id.clone(), link.id.clone());
    l2.set_link(l1_id.clone(), link.id.clone());

    debug!(link = %link.id, l1 = %l1_id, l2 = %l2_id, "created cross-layer link");
    ctx.save(link)?;
    ctx.save(l1)?;
    // Saved last so that a self-link leaves the row in its linked state.
    ctx.save(l2)?;
    Ok(LinkOutcome::Created)
}

/// `Ok(true)` if `side` already points at `counterpart`, `Ok(false)` if it
/// points nowhere, and an integrity violation otherwise.
fn check_counterpart<T: Linkable>(side: &T, counterpart: &EntityKey) -> Result<bool> {
    match side.linked_entity() {
        None => Ok(false),
        Some(existing) if existing == counterpart => Ok(true),
        Some(existing) => Err(PipelineError::IntegrityViolation(format!(
            "{:?} {} is already linked to {existing}, not {counterpart}",
            T::SUBJECT,
            side.id()
        ))),
    }
}

/// Mark the link of an arrived subgraph as finalized.
///
/// Finalizing twice keeps the first finalization block.
pub fn finalize(ctx: &HandlerContext<'_>, l2: &EntityKey) -> Result<CrossLayerLink> {
    let subgraph = ctx.require_subgraph(l2)?;
    let link_key = subgraph.cross_layer_link.ok_or_else(|| {
        PipelineError::IntegrityViolation(format!("subgraph {l2} has no cross-layer link"))
    })?;
    let mut link = ctx.registry.load_required::<CrossLayerLink>(&link_key)?;
    if !link.finalized {
        link.finalized = true;
        link.finalized_at_block = Some(ctx.block());
        ctx.save(link.clone())?;
    }
    Ok(link)
}
