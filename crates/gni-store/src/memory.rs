use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use gni_crypto::{StateHasher, StateRoot};

use crate::entity::{Entity, StoreKey};
use crate::error::{StoreError, StoreResult};
use crate::traits::EntityStore;

/// In-memory, HashMap-based entity store.
///
/// Intended for tests, the CLI and embedding. All entities are held in memory
/// behind a `RwLock`; batches are applied under a single write lock, so a
/// reader never observes half a batch.
pub struct InMemoryEntityStore {
    entities: RwLock<HashMap<StoreKey, Entity>>,
    writes: AtomicU64,
}

impl InMemoryEntityStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of entities currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_map()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_map()?.is_empty())
    }

    /// Total number of individual entity writes since creation.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> StoreResult<Vec<StoreKey>> {
        let map = self.read_map()?;
        let mut keys: Vec<StoreKey> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// BLAKE3 fingerprint over the sorted store contents.
    ///
    /// Two stores holding the same entities under the same keys have the
    /// same root regardless of write order.
    pub fn state_root(&self) -> StoreResult<StateRoot> {
        let map = self.read_map()?;
        let mut entries: Vec<(&StoreKey, &Entity)> = map.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut hasher = StateHasher::new();
        for (key, entity) in entries {
            let value = serde_json::to_vec(entity)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            hasher.absorb(key.to_string().as_bytes(), &value);
        }
        Ok(hasher.finalize())
    }

    /// JSON dump of the store, keyed `Kind/key`, in key order.
    pub fn snapshot(&self) -> StoreResult<serde_json::Value> {
        let map = self.read_map()?;
        let mut entries: Vec<(&StoreKey, &Entity)> = map.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut out = serde_json::Map::new();
        for (key, entity) in entries {
            let value = serde_json::to_value(entity)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            out.insert(key.to_string(), value);
        }
        Ok(serde_json::Value::Object(out))
    }

    fn read_map(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<StoreKey, Entity>>> {
        self.entities
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_map(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<StoreKey, Entity>>> {
        self.entities
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for InMemoryEntityStore {
    fn get(&self, key: &StoreKey) -> StoreResult<Option<Entity>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn put(&self, key: StoreKey, entity: Entity) -> StoreResult<()> {
        self.write_map()?.insert(key, entity);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn put_batch(&self, entries: Vec<(StoreKey, Entity)>) -> StoreResult<()> {
        let mut map = self.write_map()?;
        let count = entries.len() as u64;
        for (key, entity) in entries {
            map.insert(key, entity);
        }
        self.writes.fetch_add(count, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or(0);
        f.debug_struct("InMemoryEntityStore")
            .field("entity_count", &count)
            .field("write_count", &self.write_count())
            .finish()
    }
}
