use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use crate::entity::{Entity, StoreKey};
use crate::error::{StoreError, StoreResult};
use crate::traits::EntityStore;

/// Write-back overlay over another [`EntityStore`].
///
/// Reads see staged writes first and fall through to the base store.
/// [`StagedStore::commit`] flushes every staged write to the base in one
/// `put_batch`; dropping the overlay without committing discards them. This
/// is how a single event's writes land all-or-nothing.
pub struct StagedStore<'a, S: EntityStore + ?Sized> {
    base: &'a S,
    staged: RwLock<BTreeMap<StoreKey, Entity>>,
}

impl<'a, S: EntityStore + ?Sized> StagedStore<'a, S> {
    pub fn new(base: &'a S) -> Self {
        Self {
            base,
            staged: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of distinct keys staged.
    pub fn staged_len(&self) -> StoreResult<usize> {
        Ok(self
            .staged
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?
            .len())
    }

    /// Flush staged writes to the base store as one batch.
    ///
    /// Returns the number of entities written.
    pub fn commit(self) -> StoreResult<usize> {
        let staged = self
            .staged
            .into_inner()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let count = staged.len();
        if count > 0 {
            self.base.put_batch(staged.into_iter().collect())?;
        }
        debug!(entities = count, "committed staged writes");
        Ok(count)
    }
}

impl<S: EntityStore + ?Sized> EntityStore for StagedStore<'_, S> {
    fn get(&self, key: &StoreKey) -> StoreResult<Option<Entity>> {
        {
            let staged = self
                .staged
                .read()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            if let Some(entity) = staged.get(key) {
                return Ok(Some(entity.clone()));
            }
        }
        self.base.get(key)
    }

    fn put(&self, key: StoreKey, entity: Entity) -> StoreResult<()> {
        self.staged
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?
            .insert(key, entity);
        Ok(())
    }
}
