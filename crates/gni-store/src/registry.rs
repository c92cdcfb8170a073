use gni_types::EntityKey;
use tracing::debug;

use crate::entity::{EntityRecord, StoreKey};
use crate::error::{StoreError, StoreResult};
use crate::traits::EntityStore;

/// Create-or-load access to typed entities.
///
/// The registry holds no state of its own: every call re-reads the store, so
/// whichever caller first observes a key in processing order creates it and
/// every later caller sees that instance.
pub struct Registry<'a, S: EntityStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> Registry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Return the stored entity under `key`, or persist and return `defaults`.
    ///
    /// When the entity exists, `defaults` is discarded: identity fields that
    /// were established on first observation are never overwritten. At most
    /// one write happens per key.
    pub fn create_or_load<T: EntityRecord>(&self, key: &EntityKey, defaults: T) -> StoreResult<T> {
        if let Some(existing) = self.load::<T>(key)? {
            return Ok(existing);
        }
        if defaults.id() != key {
            return Err(StoreError::KeyMismatch {
                expected: key.clone(),
                actual: defaults.id().clone(),
            });
        }
        debug!(kind = %T::KIND, key = %key, "created entity");
        self.store
            .put(StoreKey::new(T::KIND, key.clone()), defaults.clone().into_entity())?;
        Ok(defaults)
    }

    /// Load an entity if present.
    pub fn load<T: EntityRecord>(&self, key: &EntityKey) -> StoreResult<Option<T>> {
        let store_key = StoreKey::new(T::KIND, key.clone());
        match self.store.get(&store_key)? {
            None => Ok(None),
            Some(entity) => T::from_entity(entity).map(Some).map_err(|other| {
                StoreError::KindMismatch {
                    key: store_key,
                    expected: T::KIND,
                    actual: other.kind(),
                }
            }),
        }
    }

    /// Load an entity that must already exist.
    pub fn load_required<T: EntityRecord>(&self, key: &EntityKey) -> StoreResult<T> {
        self.load::<T>(key)?.ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            key: key.clone(),
        })
    }

    /// Persist an entity under its own id.
    pub fn save<T: EntityRecord>(&self, record: T) -> StoreResult<()> {
        self.store.put(record.store_key(), record.into_entity())
    }

    pub fn exists<T: EntityRecord>(&self, key: &EntityKey) -> StoreResult<bool> {
        self.store.contains(&StoreKey::new(T::KIND, key.clone()))
    }

    /// The underlying store.
    pub fn store(&self) -> &'a S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Curator, EntityKind, GraphAccount, Subgraph};
    use crate::memory::InMemoryEntityStore;

    fn key(s: &str) -> EntityKey {
        EntityKey::new(s).unwrap()
    }

    // -----------------------------------------------------------------------
    // create_or_load
    // -----------------------------------------------------------------------

    #[test]
    fn create_or_load_returns_first_payload() {
        let store = InMemoryEntityStore::new();
        let registry = Registry::new(&store);
        let id = key("S");

        let first = registry
            .create_or_load(&id, Subgraph::new(id.clone(), key("0xfirst"), 1))
            .unwrap();
        let second = registry
            .create_or_load(&id, Subgraph::new(id.clone(), key("0xsecond"), 2))
            .unwrap();

        assert_eq!(first.owner, key("0xfirst"));
        assert_eq!(second, first);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn create_or_load_rejects_mismatched_defaults() {
        let store = InMemoryEntityStore::new();
        let registry = Registry::new(&store);
        let err = registry
            .create_or_load(&key("a"), GraphAccount::new(key("b"), 1))
            .unwrap_err();
        assert!(matches!(err, StoreError::KeyMismatch { .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn create_or_load_rereads_the_store() {
        let store = InMemoryEntityStore::new();
        let registry = Registry::new(&store);
        let id = key("0xaa");
        registry.create_or_load(&id, GraphAccount::new(id.clone(), 1)).unwrap();

        // A write that bypasses the registry is observed by the next call.
        let changed = GraphAccount::new(id.clone(), 7);
        store.put(changed.store_key(), changed.clone().into_entity()).unwrap();

        let loaded = registry.create_or_load(&id, GraphAccount::new(id.clone(), 1)).unwrap();
        assert_eq!(loaded, changed);
    }

    // -----------------------------------------------------------------------
    // load / save
    // -----------------------------------------------------------------------

    #[test]
    fn load_missing_is_none() {
        let store = InMemoryEntityStore::new();
        let registry = Registry::new(&store);
        assert!(registry.load::<Curator>(&key("0xaa")).unwrap().is_none());
        assert!(!registry.exists::<Curator>(&key("0xaa")).unwrap());
    }

    #[test]
    fn load_required_reports_not_found() {
        let store = InMemoryEntityStore::new();
        let registry = Registry::new(&store);
        let err = registry.load_required::<Subgraph>(&key("S")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Subgraph, .. }
        ));
    }

    #[test]
    fn load_reports_kind_mismatch() {
        let store = InMemoryEntityStore::new();
        // Corrupt entry: a Curator stored under a GraphAccount key.
        let curator = Curator::new(key("0xaa"), 1);
        store
            .put(
                StoreKey::new(EntityKind::GraphAccount, key("0xaa")),
                curator.into_entity(),
            )
            .unwrap();

        let registry = Registry::new(&store);
        let err = registry.load::<GraphAccount>(&key("0xaa")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::KindMismatch {
                expected: EntityKind::GraphAccount,
                actual: EntityKind::Curator,
                ..
            }
        ));
    }

    #[test]
    fn save_overwrites() {
        let store = InMemoryEntityStore::new();
        let registry = Registry::new(&store);
        let id = key("S");
        let mut subgraph = registry
            .create_or_load(&id, Subgraph::new(id.clone(), key("0xowner"), 1))
            .unwrap();
        subgraph.version_count = 3;
        registry.save(subgraph).unwrap();

        let loaded = registry.load_required::<Subgraph>(&id).unwrap();
        assert_eq!(loaded.version_count, 3);
        assert_eq!(store.write_count(), 2);
    }
}
