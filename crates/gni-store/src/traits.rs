use crate::entity::{Entity, StoreKey};
use crate::error::StoreResult;

/// Keyed entity persistence.
///
/// All implementations must satisfy these invariants:
/// - `get` after `put` on the same key observes the written entity.
/// - `put` is an upsert; the store never merges fields.
/// - The store never interprets entity contents beyond its key.
/// - All backend errors are propagated, never silently ignored.
///
/// The reconciliation core only ever addresses entities by key. It never
/// iterates or range-scans a store.
pub trait EntityStore: Send + Sync {
    /// Read an entity by key.
    ///
    /// Returns `Ok(None)` if the entity does not exist.
    fn get(&self, key: &StoreKey) -> StoreResult<Option<Entity>>;

    /// Insert or replace an entity.
    fn put(&self, key: StoreKey, entity: Entity) -> StoreResult<()>;

    /// Write multiple entities.
    ///
    /// Default implementation calls `put()` for each entry. Backends that can
    /// apply the whole batch atomically should override it; the pipeline
    /// relies on the batch for all-or-nothing event writes.
    fn put_batch(&self, entries: Vec<(StoreKey, Entity)>) -> StoreResult<()> {
        for (key, entity) in entries {
            self.put(key, entity)?;
        }
        Ok(())
    }

    /// Check whether an entity exists.
    fn contains(&self, key: &StoreKey) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
