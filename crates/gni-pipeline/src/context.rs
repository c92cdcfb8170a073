//! Per-event handler context: the event being applied, its staged store
//! and the external ports.

use alloy_primitives::{Address, B256, U256};
use gni_crypto::{build_content_hash, derive_resource_id, encode_resource_id_as_content_address};
use gni_store::{
    Curator, DelegatedStake, Delegator, EntityRecord, EntityStore, EventRecord, GraphAccount,
    Indexer, Registry, Subgraph, SubgraphDeployment, SubgraphMetadata, VersionMetadata,
};
use gni_types::codec::bytes_to_hex;
use gni_types::{EntityKey, EventKind, RawEvent, ResourceId};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::metadata::{
    resolve_subgraph_metadata, resolve_version_metadata, ContentFetcher, DirContentFetcher,
    NoContentFetcher,
};
use crate::record::RecordBuilder;
use crate::state::{ContractStateReader, StaticStateReader};

/// External ports shared by every handler invocation.
pub struct Services {
    pub fetcher: Box<dyn ContentFetcher>,
    pub state: Box<dyn ContractStateReader>,
    pub fetch_metadata: bool,
}

impl Services {
    /// Ports described by a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let fetcher: Box<dyn ContentFetcher> = match &config.metadata_dir {
            Some(dir) => Box::new(DirContentFetcher::new(dir)),
            None => Box::new(NoContentFetcher),
        };
        Self {
            fetcher,
            state: Box::new(StaticStateReader::new(config.contract_state.clone())),
            fetch_metadata: config.fetch_metadata,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("fetch_metadata", &self.fetch_metadata)
            .finish_non_exhaustive()
    }
}

/// Everything a handler may touch while applying one event.
///
/// The registry writes to the event's staged overlay, so nothing a handler
/// does is visible outside the event until the pipeline commits it.
pub struct HandlerContext<'a> {
    pub event: &'a RawEvent,
    pub event_id: EntityKey,
    pub registry: Registry<'a, dyn EntityStore + 'a>,
    services: &'a Services,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        event: &'a RawEvent,
        event_id: EntityKey,
        store: &'a (dyn EntityStore + 'a),
        services: &'a Services,
    ) -> Self {
        Self {
            event,
            event_id,
            registry: Registry::new(store),
            services,
        }
    }

    pub fn block(&self) -> u64 {
        self.event.block_number
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Create-or-load the `GraphAccount` of an address.
    pub fn account(&self, address: &Address) -> Result<EntityKey> {
        let key = address_key(address)?;
        self.registry
            .create_or_load(&key, GraphAccount::new(key.clone(), self.block()))?;
        Ok(key)
    }

    pub fn indexer(&self, address: &Address) -> Result<Indexer> {
        let key = self.account(address)?;
        Ok(self
            .registry
            .create_or_load(&key, Indexer::new(key.clone(), self.block()))?)
    }

    pub fn curator(&self, address: &Address) -> Result<EntityKey> {
        let key = self.account(address)?;
        self.registry
            .create_or_load(&key, Curator::new(key.clone(), self.block()))?;
        Ok(key)
    }

    pub fn delegator(&self, address: &Address) -> Result<EntityKey> {
        let key = self.account(address)?;
        self.registry
            .create_or_load(&key, Delegator::new(key.clone(), self.block()))?;
        Ok(key)
    }

    /// Create-or-load a delegator's stake with one indexer, keyed
    /// `delegator-indexer`. Both parties are created as well.
    pub fn delegated_stake(&self, delegator: &Address, indexer: &Address) -> Result<EntityKey> {
        let delegator = self.delegator(delegator)?;
        let indexer = self.indexer(indexer)?.id;
        let key = EntityKey::join(&[delegator.as_str(), indexer.as_str()])?;
        let defaults = DelegatedStake {
            id: key.clone(),
            delegator,
            indexer,
            created_at: self.block(),
        };
        self.registry.create_or_load(&key, defaults)?;
        Ok(key)
    }

    // -----------------------------------------------------------------------
    // Subgraphs and deployments
    // -----------------------------------------------------------------------

    /// Create-or-load a deployment from its 32-byte manifest digest.
    pub fn deployment(&self, digest: &B256) -> Result<EntityKey> {
        let key = EntityKey::new(bytes_to_hex(digest.as_slice()))?;
        let defaults = SubgraphDeployment {
            id: key.clone(),
            ipfs_hash: build_content_hash(digest).to_base58(),
            denied_at: None,
            created_at: self.block(),
        };
        self.registry.create_or_load(&key, defaults)?;
        Ok(key)
    }

    /// Key of a subgraph addressed by `(owner, per-owner number)`.
    pub fn subgraph_key_v1(&self, owner: &Address, number: U256) -> Result<EntityKey> {
        let id = derive_resource_id(owner, number);
        Ok(EntityKey::new(encode_resource_id_as_content_address(&id))?)
    }

    /// Key of a subgraph addressed by its numeric id.
    pub fn subgraph_key(&self, id: U256) -> Result<EntityKey> {
        let id = ResourceId::from_u256(id);
        Ok(EntityKey::new(encode_resource_id_as_content_address(&id))?)
    }

    /// Create-or-load a subgraph; `owner` only matters on first observation.
    pub fn subgraph(&self, key: &EntityKey, owner: &Address) -> Result<Subgraph> {
        let owner = self.account(owner)?;
        Ok(self
            .registry
            .create_or_load(key, Subgraph::new(key.clone(), owner, self.block()))?)
    }

    /// Load a subgraph that an earlier event must have created.
    pub fn require_subgraph(&self, key: &EntityKey) -> Result<Subgraph> {
        Ok(self.registry.load_required::<Subgraph>(key)?)
    }

    // -----------------------------------------------------------------------
    // Ports
    // -----------------------------------------------------------------------

    /// Content address and decoded fields of a subgraph metadata document.
    pub fn subgraph_metadata(&self, digest: &B256) -> (String, SubgraphMetadata) {
        let address = build_content_hash(digest).to_base58();
        let metadata = if self.services.fetch_metadata {
            resolve_subgraph_metadata(self.services.fetcher.as_ref(), &address)
        } else {
            SubgraphMetadata::default()
        };
        (address, metadata)
    }

    /// Content address and decoded fields of a version metadata document.
    pub fn version_metadata(&self, digest: &B256) -> (String, VersionMetadata) {
        let address = build_content_hash(digest).to_base58();
        let metadata = if self.services.fetch_metadata {
            resolve_version_metadata(self.services.fetcher.as_ref(), &address)
        } else {
            VersionMetadata::default()
        };
        (address, metadata)
    }

    /// Current value of a parameter on the emitting contract.
    pub fn read_state(&self, param: &str) -> Option<String> {
        self.services.state.read(&self.event.contract, param)
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// Record keyed by the event id.
    pub fn record(&self, kind: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(self.empty_record(self.event_id.clone(), kind.into()))
    }

    /// Record for the `index`-th sub-event, keyed `eventId-index`.
    pub fn sub_record(&self, kind: impl Into<String>, index: u32) -> Result<RecordBuilder> {
        let id = self.event_id.child(index.to_string())?;
        Ok(RecordBuilder::new(self.empty_record(id, kind.into())))
    }

    /// Record named after the event's own kind.
    pub fn event_record(&self) -> RecordBuilder {
        self.record(self.event.signature.kind.name())
    }

    pub fn save_record(&self, record: RecordBuilder) -> Result<()> {
        self.save(record.build())
    }

    pub fn save<T: EntityRecord>(&self, entity: T) -> Result<()> {
        Ok(self.registry.save(entity)?)
    }

    pub fn kind(&self) -> EventKind {
        self.event.signature.kind
    }

    fn empty_record(&self, id: EntityKey, kind: String) -> EventRecord {
        EventRecord {
            id,
            kind,
            block_number: self.event.block_number,
            timestamp: self.event.block_timestamp,
            tx_hash: bytes_to_hex(self.event.transaction_hash.as_slice()),
            contract: bytes_to_hex(self.event.contract.as_slice()),
            accounts: Vec::new(),
            subgraph: None,
            deployment: None,
            version: None,
            fields: serde_json::Map::new(),
        }
    }
}

/// Entity key of an account: its lowercase `0x` address.
pub fn address_key(address: &Address) -> Result<EntityKey> {
    Ok(EntityKey::new(bytes_to_hex(address.as_slice()))?)
}
