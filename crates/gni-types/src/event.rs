//! Decoded contract event logs as delivered by the external event source.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::codec::bytes_to_hex;
use crate::error::TypeError;
use crate::key::EntityKey;
use crate::position::EventPosition;

/// Contract generation an event shape belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSchemaVersion {
    V1,
    V2,
}

impl fmt::Display for EventSchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

/// Entity domain an event touches, used for per-domain counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventDomain {
    Subgraph,
    SubgraphDeployment,
    GraphAccount,
    Indexer,
    Curator,
    Delegator,
}

impl EventDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subgraph => "subgraph",
            Self::SubgraphDeployment => "subgraphDeployment",
            Self::GraphAccount => "graphAccount",
            Self::Indexer => "indexer",
            Self::Curator => "curator",
            Self::Delegator => "delegator",
        }
    }
}

macro_rules! event_kinds {
    ($( $kind:ident => [$($domain:ident),*] ),* $(,)?) => {
        /// Logical event kind, independent of contract generation.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum EventKind {
            $($kind,)*
        }

        impl EventKind {
            pub const ALL: &'static [EventKind] = &[$(EventKind::$kind,)*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$kind => stringify!($kind),)*
                }
            }

            /// Domains whose counters this kind bumps.
            pub fn domains(&self) -> &'static [EventDomain] {
                match self {
                    $(Self::$kind => &[$(EventDomain::$domain),*],)*
                }
            }
        }
    };
}

event_kinds! {
    // Name service
    SubgraphPublished => [Subgraph, SubgraphDeployment, GraphAccount],
    SubgraphVersionUpdated => [Subgraph, SubgraphDeployment, GraphAccount],
    SubgraphMetadataUpdated => [Subgraph, GraphAccount],
    SubgraphDeprecated => [Subgraph, GraphAccount],
    NameSignalEnabled => [Subgraph, GraphAccount],
    NSignalMinted => [Subgraph, Curator, GraphAccount],
    NSignalBurned => [Subgraph, Curator, GraphAccount],
    ParameterUpdated => [],
    // Curation
    Signalled => [Curator, SubgraphDeployment, GraphAccount],
    Burned => [Curator, SubgraphDeployment, GraphAccount],
    // Service registry
    ServiceRegistered => [Indexer, GraphAccount],
    ServiceUnregistered => [Indexer, GraphAccount],
    // Rewards
    RewardsDenylistUpdated => [SubgraphDeployment],
    // Staking
    StakeDeposited => [Indexer, GraphAccount],
    StakeLocked => [Indexer, GraphAccount],
    StakeWithdrawn => [Indexer, GraphAccount],
    StakeSlashed => [Indexer, GraphAccount],
    StakeDelegated => [Delegator, Indexer, GraphAccount],
    StakeDelegatedLocked => [Delegator, Indexer, GraphAccount],
    StakeDelegatedWithdrawn => [Delegator, Indexer, GraphAccount],
    AllocationCreated => [SubgraphDeployment, Indexer, GraphAccount],
    AllocationCollected => [SubgraphDeployment, Indexer, GraphAccount],
    AllocationClosed => [SubgraphDeployment, Indexer, GraphAccount],
    RebateClaimed => [SubgraphDeployment, Indexer, GraphAccount],
    RebateCollected => [SubgraphDeployment, Indexer, GraphAccount],
    DelegationParametersUpdated => [Indexer, GraphAccount],
    SetOperator => [Indexer, GraphAccount],
    // Cross-layer bridge
    SubgraphSentToL2 => [Subgraph, GraphAccount],
    SubgraphReceivedFromL1 => [Subgraph, GraphAccount],
    SubgraphL2TransferFinalized => [Subgraph],
    CuratorBalanceSentToL2 => [Curator, GraphAccount],
    CuratorBalanceReceived => [Curator, GraphAccount],
    CuratorBalanceReturnedToBeneficiary => [Curator, GraphAccount],
    IndexerStakeTransferredToL2 => [Indexer, GraphAccount],
    DelegationTransferredToL2 => [Indexer, Delegator, GraphAccount],
    StakeDelegatedUnlockedDueToL2Transfer => [Indexer, Delegator, GraphAccount],
    TransferredDelegationReturnedToDelegator => [Indexer, Delegator, GraphAccount],
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event signature: which logical kind, in which contract generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventSignature {
    pub kind: EventKind,
    pub version: EventSchemaVersion,
}

impl EventSignature {
    pub const fn new(kind: EventKind, version: EventSchemaVersion) -> Self {
        Self { kind, version }
    }

    pub const fn v1(kind: EventKind) -> Self {
        Self::new(kind, EventSchemaVersion::V1)
    }

    pub const fn v2(kind: EventKind) -> Self {
        Self::new(kind, EventSchemaVersion::V2)
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.version)
    }
}

/// One decoded event parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum EventParam {
    Address(Address),
    Uint(U256),
    Bytes32(B256),
    String(String),
    Bool(bool),
}

impl EventParam {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Uint(_) => "uint",
            Self::Bytes32(_) => "bytes32",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
        }
    }
}

/// An immutable decoded event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub contract: Address,
    pub signature: EventSignature,
    #[serde(default)]
    pub params: Vec<EventParam>,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transaction_hash: B256,
    /// Sender of the enclosing transaction.
    #[serde(default)]
    pub transaction_from: Address,
    pub log_index: u64,
}

impl RawEvent {
    pub fn position(&self) -> EventPosition {
        EventPosition::new(self.block_number, self.log_index)
    }

    /// Base key of every record derived from this event: `txHash-logIndex`.
    pub fn event_id(&self) -> Result<EntityKey, TypeError> {
        EntityKey::join(&[
            bytes_to_hex(self.transaction_hash.as_slice()),
            self.log_index.to_string(),
        ])
    }
}
