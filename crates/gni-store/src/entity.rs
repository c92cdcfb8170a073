use std::collections::BTreeMap;
use std::fmt;

use gni_types::{EntityKey, EventPosition};
use serde::{Deserialize, Serialize};

/// Id of the singleton entities ([`Counter`], [`Checkpoint`]).
pub const SINGLETON_ID: &str = "0";

/// The kind of entity stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    GraphAccount,
    Indexer,
    Curator,
    Delegator,
    DelegatedStake,
    Subgraph,
    SubgraphVersion,
    SubgraphDeployment,
    CrossLayerLink,
    Counter,
    EventRecord,
    Checkpoint,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GraphAccount => "GraphAccount",
            Self::Indexer => "Indexer",
            Self::Curator => "Curator",
            Self::Delegator => "Delegator",
            Self::DelegatedStake => "DelegatedStake",
            Self::Subgraph => "Subgraph",
            Self::SubgraphVersion => "SubgraphVersion",
            Self::SubgraphDeployment => "SubgraphDeployment",
            Self::CrossLayerLink => "CrossLayerLink",
            Self::Counter => "Counter",
            Self::EventRecord => "EventRecord",
            Self::Checkpoint => "Checkpoint",
        };
        f.write_str(name)
    }
}

/// Full store address of an entity.
///
/// Different kinds may share an [`EntityKey`]: an account address is the id
/// of its `GraphAccount`, its `Indexer` and its `Curator` alike.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreKey {
    pub kind: EntityKind,
    pub key: EntityKey,
}

impl StoreKey {
    pub fn new(kind: EntityKind, key: EntityKey) -> Self {
        Self { kind, key }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.key)
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphAccount {
    pub id: EntityKey,
    /// Block at which the account was first observed.
    pub created_at: u64,
}

impl GraphAccount {
    pub fn new(id: EntityKey, created_at: u64) -> Self {
        Self { id, created_at }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indexer {
    pub id: EntityKey,
    pub account: EntityKey,
    pub url: Option<String>,
    pub geo_hash: Option<String>,
    /// Counterpart of this indexer on the other layer.
    pub linked_entity: Option<EntityKey>,
    pub cross_layer_link: Option<EntityKey>,
    pub created_at: u64,
}

impl Indexer {
    pub fn new(id: EntityKey, created_at: u64) -> Self {
        Self {
            account: id.clone(),
            id,
            url: None,
            geo_hash: None,
            linked_entity: None,
            cross_layer_link: None,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curator {
    pub id: EntityKey,
    pub account: EntityKey,
    pub created_at: u64,
}

impl Curator {
    pub fn new(id: EntityKey, created_at: u64) -> Self {
        Self {
            account: id.clone(),
            id,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegator {
    pub id: EntityKey,
    pub account: EntityKey,
    pub created_at: u64,
}

impl Delegator {
    pub fn new(id: EntityKey, created_at: u64) -> Self {
        Self {
            account: id.clone(),
            id,
            created_at,
        }
    }
}

/// A delegator's position with one indexer, keyed `delegator-indexer`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedStake {
    pub id: EntityKey,
    pub delegator: EntityKey,
    pub indexer: EntityKey,
    pub created_at: u64,
}

// ---------------------------------------------------------------------------
// Subgraphs
// ---------------------------------------------------------------------------

/// Display fields copied out of a subgraph's metadata document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphMetadata {
    pub description: String,
    pub display_name: String,
    pub code_repository: String,
    pub website: String,
    pub image: String,
    pub nft_image: String,
    pub categories: Vec<String>,
}

/// Display fields copied out of a subgraph version's metadata document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub description: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgraph {
    /// Base-58 rendering of the subgraph's resource id.
    pub id: EntityKey,
    pub owner: EntityKey,
    /// Number of versions published so far; the next version's index.
    pub version_count: u64,
    pub current_version: Option<EntityKey>,
    /// Set by a publish that carries no version payload; the next version
    /// update supplies it instead of creating a second version.
    pub initializing: bool,
    pub active: bool,
    pub metadata_hash: Option<String>,
    pub metadata: SubgraphMetadata,
    pub linked_entity: Option<EntityKey>,
    pub cross_layer_link: Option<EntityKey>,
    pub created_at: u64,
}

impl Subgraph {
    pub fn new(id: EntityKey, owner: EntityKey, created_at: u64) -> Self {
        Self {
            id,
            owner,
            version_count: 0,
            current_version: None,
            initializing: false,
            active: true,
            metadata_hash: None,
            metadata: SubgraphMetadata::default(),
            linked_entity: None,
            cross_layer_link: None,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphVersion {
    /// `subgraphId-index`.
    pub id: EntityKey,
    pub subgraph: EntityKey,
    pub deployment: EntityKey,
    pub version: u64,
    pub metadata_hash: Option<String>,
    pub metadata: VersionMetadata,
    pub created_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphDeployment {
    /// Hex of the 32-byte deployment digest.
    pub id: EntityKey,
    /// Base-58 content address of the deployment manifest.
    pub ipfs_hash: String,
    /// Block from which rewards are denied, if denied.
    pub denied_at: Option<u64>,
    pub created_at: u64,
}

// ---------------------------------------------------------------------------
// Cross-layer links
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkSubject {
    Subgraph,
    Indexer,
}

/// Relation between one resource's identities on two ledgers.
///
/// Created once per bridging event, keyed by that event's id. Only the
/// finalization fields change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossLayerLink {
    pub id: EntityKey,
    pub subject: LinkSubject,
    pub l1: EntityKey,
    pub l2: EntityKey,
    pub block_number: u64,
    pub transaction_hash: String,
    pub finalized: bool,
    pub finalized_at_block: Option<u64>,
}

// ---------------------------------------------------------------------------
// Bookkeeping
// ---------------------------------------------------------------------------

/// Monotonic occurrence counts. Singleton under [`SINGLETON_ID`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub id: EntityKey,
    pub event_count: u64,
    pub domains: BTreeMap<String, u64>,
    pub kinds: BTreeMap<String, u64>,
}

impl Counter {
    pub fn domain(&self, name: &str) -> u64 {
        self.domains.get(name).copied().unwrap_or(0)
    }

    pub fn kind(&self, name: &str) -> u64 {
        self.kinds.get(name).copied().unwrap_or(0)
    }
}

/// Derived event-log entry, one per processed event or sub-event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EntityKey,
    pub kind: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub tx_hash: String,
    pub contract: String,
    pub accounts: Vec<EntityKey>,
    pub subgraph: Option<EntityKey>,
    pub deployment: Option<EntityKey>,
    pub version: Option<EntityKey>,
    /// Event payload not modelled as entity state, amounts as decimal strings.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Last applied stream position. Singleton under [`SINGLETON_ID`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: EntityKey,
    pub position: EventPosition,
}

// ---------------------------------------------------------------------------
// Entity envelope
// ---------------------------------------------------------------------------

/// Typed entity as it is persisted.
pub trait EntityRecord: Clone + Sized {
    const KIND: EntityKind;

    fn id(&self) -> &EntityKey;

    fn into_entity(self) -> Entity;

    /// Unwrap the envelope, handing it back if it holds another kind.
    fn from_entity(entity: Entity) -> Result<Self, Entity>;

    fn store_key(&self) -> StoreKey {
        StoreKey::new(Self::KIND, self.id().clone())
    }
}

macro_rules! entities {
    ($($kind:ident),* $(,)?) => {
        /// Any stored entity.
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(tag = "entity")]
        pub enum Entity {
            $($kind($kind),)*
        }

        impl Entity {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Self::$kind(_) => EntityKind::$kind,)*
                }
            }

            pub fn id(&self) -> &EntityKey {
                match self {
                    $(Self::$kind(e) => &e.id,)*
                }
            }
        }

        $(
            impl EntityRecord for $kind {
                const KIND: EntityKind = EntityKind::$kind;

                fn id(&self) -> &EntityKey {
                    &self.id
                }

                fn into_entity(self) -> Entity {
                    Entity::$kind(self)
                }

                fn from_entity(entity: Entity) -> Result<Self, Entity> {
                    match entity {
                        Entity::$kind(e) => Ok(e),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

entities! {
    GraphAccount,
    Indexer,
    Curator,
    Delegator,
    DelegatedStake,
    Subgraph,
    SubgraphVersion,
    SubgraphDeployment,
    CrossLayerLink,
    Counter,
    EventRecord,
    Checkpoint,
}
