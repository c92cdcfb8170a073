#![allow(dead_code)]

use std::str::FromStr;

use gni_pipeline::{InMemoryContentFetcher, Pipeline, PipelineConfig};
use gni_store::{EntityRecord, InMemoryEntityStore, Registry};
use gni_types::{
    Address, EntityKey, EventKind, EventParam, EventSchemaVersion, EventSignature, RawEvent, B256,
    U256,
};

/// `0xaaaa…aa01`, the owner used by the pinned derivation vectors.
pub fn owner() -> Address {
    let mut bytes = [0xaa; 20];
    bytes[19] = 0x01;
    Address::from(bytes)
}

/// Numeric id derived from `(owner(), 0)`.
pub fn pinned_id() -> U256 {
    U256::from_str(
        "22403219176855940113945814030279669292616004456096754252667383985449721509843",
    )
    .unwrap()
}

/// Base-58 key of `pinned_id()`.
pub const PINNED_KEY: &str = "4LM4CsnpLAmFxCicG96LMjeRuA8Xs6Q8bmsyBQvZvqT8";

pub fn key(s: &str) -> EntityKey {
    EntityKey::parse(s).unwrap()
}

pub fn address_key(address: &Address) -> EntityKey {
    EntityKey::new(gni_types::codec::bytes_to_hex(address.as_slice())).unwrap()
}

pub fn digest(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

pub fn addr(a: Address) -> EventParam {
    EventParam::Address(a)
}

pub fn uint(v: u64) -> EventParam {
    EventParam::Uint(U256::from(v))
}

pub fn big(v: U256) -> EventParam {
    EventParam::Uint(v)
}

pub fn b32(b: B256) -> EventParam {
    EventParam::Bytes32(b)
}

pub fn string(s: &str) -> EventParam {
    EventParam::String(s.to_string())
}

pub fn boolean(b: bool) -> EventParam {
    EventParam::Bool(b)
}

/// An event at `(block, log_index)` with a transaction hash unique to it.
pub fn event(
    kind: EventKind,
    version: EventSchemaVersion,
    block: u64,
    log_index: u64,
    params: Vec<EventParam>,
) -> RawEvent {
    let tag = (block << 16) | log_index;
    RawEvent {
        contract: Address::repeat_byte(0xc0),
        signature: EventSignature::new(kind, version),
        params,
        block_number: block,
        block_timestamp: 1_600_000_000 + block * 12,
        transaction_hash: B256::left_padding_from(&tag.to_be_bytes()),
        transaction_from: Address::repeat_byte(0xf0),
        log_index,
    }
}

pub fn v1(kind: EventKind, block: u64, log_index: u64, params: Vec<EventParam>) -> RawEvent {
    event(kind, EventSchemaVersion::V1, block, log_index, params)
}

pub fn v2(kind: EventKind, block: u64, log_index: u64, params: Vec<EventParam>) -> RawEvent {
    event(kind, EventSchemaVersion::V2, block, log_index, params)
}

pub fn pipeline() -> Pipeline<InMemoryEntityStore> {
    Pipeline::new(InMemoryEntityStore::new(), PipelineConfig::default())
}

pub fn pipeline_with(
    config: PipelineConfig,
    fetcher: InMemoryContentFetcher,
) -> Pipeline<InMemoryEntityStore> {
    Pipeline::new(InMemoryEntityStore::new(), config).with_fetcher(fetcher)
}

pub fn load<T: EntityRecord>(pipeline: &Pipeline<InMemoryEntityStore>, id: &EntityKey) -> Option<T> {
    Registry::new(pipeline.store()).load::<T>(id).unwrap()
}

pub fn require<T: EntityRecord>(pipeline: &Pipeline<InMemoryEntityStore>, id: &EntityKey) -> T {
    load::<T>(pipeline, id).unwrap_or_else(|| panic!("{} {id} missing", T::KIND))
}

/// `SubgraphPublished` v1 for `(owner(), number)`.
pub fn publish_v1(block: u64, log_index: u64, number: u64, deployment: u8, metadata: u8) -> RawEvent {
    v1(
        EventKind::SubgraphPublished,
        block,
        log_index,
        vec![
            addr(owner()),
            uint(number),
            b32(digest(deployment)),
            b32(digest(metadata)),
        ],
    )
}

/// `SubgraphPublished` v2 for a numeric subgraph id.
pub fn publish_v2(block: u64, log_index: u64, id: U256, deployment: u8) -> RawEvent {
    v2(
        EventKind::SubgraphPublished,
        block,
        log_index,
        vec![big(id), b32(digest(deployment)), uint(500_000)],
    )
}

/// `SubgraphVersionUpdated` v2.
pub fn version_updated(block: u64, log_index: u64, id: U256, deployment: u8, metadata: u8) -> RawEvent {
    v2(
        EventKind::SubgraphVersionUpdated,
        block,
        log_index,
        vec![big(id), b32(digest(deployment)), b32(digest(metadata))],
    )
}

/// Base-58 content address a 32-byte metadata digest is fetched under.
pub fn content_address(byte: u8) -> String {
    gni_crypto::build_content_hash(&digest(byte)).to_base58()
}
