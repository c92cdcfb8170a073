mod common;

use common::*;
use gni_pipeline::{
    DirContentFetcher, DispatchTable, EventOutcome, HandlerContext, ParamReader, Pipeline,
    PipelineConfig, PipelineError, StreamValidator,
};
use gni_store::{
    Checkpoint, Counter, DelegatedStake, EventRecord, GraphAccount, InMemoryEntityStore, Indexer,
    Subgraph, SubgraphDeployment, SubgraphVersion, SINGLETON_ID,
};
use gni_types::{Address, EntityKey, EventKind, EventPosition, EventSignature, RawEvent};

fn indexer() -> Address {
    Address::repeat_byte(0x01)
}

fn delegator() -> Address {
    Address::repeat_byte(0x0d)
}

fn stream() -> Vec<RawEvent> {
    vec![
        publish_v1(100, 0, 0, 0x11, 0x22),
        v1(EventKind::StakeDeposited, 100, 1, vec![addr(indexer()), uint(1_000)]),
        v1(
            EventKind::ServiceRegistered,
            101,
            0,
            vec![addr(indexer()), string("https://indexer.example"), string("u4pruy")],
        ),
        v1(
            EventKind::StakeDelegated,
            102,
            0,
            vec![addr(indexer()), addr(delegator()), uint(500), uint(499)],
        ),
        v1(
            EventKind::Signalled,
            102,
            3,
            vec![
                addr(delegator()),
                b32(digest(0x11)),
                uint(100),
                uint(10),
                uint(1),
            ],
        ),
        v1(
            EventKind::AllocationCreated,
            103,
            0,
            vec![
                addr(indexer()),
                b32(digest(0x11)),
                uint(7),
                uint(900),
                addr(Address::repeat_byte(0xa1)),
                b32(digest(0x00)),
            ],
        ),
    ]
}

// ---------------------------------------------------------------------------
// Applying streams
// ---------------------------------------------------------------------------

#[test]
fn run_applies_stream_and_tracks_counters() {
    let mut p = pipeline();
    let events = stream();
    let report = p.run(&events).unwrap();

    assert_eq!(report.applied, 6);
    assert!(report.is_clean());
    assert_eq!(report.last_position, Some(EventPosition::new(103, 0)));

    let counter: Counter = require(&p, &key(SINGLETON_ID));
    assert_eq!(counter.event_count, 6);
    assert_eq!(counter.kind("StakeDelegated"), 1);
    assert_eq!(counter.domain("indexer"), 4);
    assert_eq!(counter.domain("subgraphDeployment"), 3);
    assert_eq!(p.counter(), Some(&counter));

    let checkpoint: Checkpoint = require(&p, &key(SINGLETON_ID));
    assert_eq!(checkpoint.position, EventPosition::new(103, 0));

    let registered: Indexer = require(&p, &address_key(&indexer()));
    assert_eq!(registered.url.as_deref(), Some("https://indexer.example"));
    assert_eq!(registered.geo_hash.as_deref(), Some("u4pruy"));

    let stake_key =
        EntityKey::join(&[address_key(&delegator()), address_key(&indexer())]).unwrap();
    let stake: DelegatedStake = require(&p, &stake_key);
    assert_eq!(stake.indexer, registered.id);
}

#[test]
fn entities_are_created_once_across_events() {
    let mut p = pipeline();
    p.run(&stream()).unwrap();

    // The deployment first seen in the publish keeps its creation block.
    let deployment: SubgraphDeployment = require(&p, &key(&format!("0x{}", "11".repeat(32))));
    assert_eq!(deployment.created_at, 100);
    let account: GraphAccount = require(&p, &address_key(&indexer()));
    assert_eq!(account.created_at, 100);
}

#[test]
fn failed_event_leaves_no_writes() {
    let mut p = pipeline();
    // One parameter too many: the handler runs and stages writes, then the
    // trailing parameter is rejected.
    let mut publish = publish_v1(100, 0, 0, 0x11, 0x22);
    publish.params.push(uint(1));

    let err = p.process(&publish).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedInput(_)));
    assert_eq!(p.store().write_count(), 0);
    assert!(p.store().is_empty().unwrap());
    assert!(load::<Subgraph>(&p, &key(PINNED_KEY)).is_none());
    assert!(load::<GraphAccount>(&p, &address_key(&owner())).is_none());
}

#[test]
fn unknown_signature_is_malformed_input() {
    let mut p = pipeline();
    let event = v1(EventKind::SubgraphVersionUpdated, 100, 0, vec![]);
    assert!(matches!(
        p.process(&event),
        Err(PipelineError::MalformedInput(_))
    ));
    assert_eq!(p.store().write_count(), 0);
}

#[test]
fn wrong_parameter_type_is_malformed_input() {
    let mut p = pipeline();
    let event = v1(EventKind::StakeDeposited, 100, 0, vec![uint(1), uint(1_000)]);
    assert!(matches!(
        p.process(&event),
        Err(PipelineError::MalformedInput(_))
    ));
}

#[test]
fn halt_on_fatal_stops_the_run() {
    let mut p = pipeline();
    let events = vec![
        v1(EventKind::StakeDeposited, 100, 0, vec![addr(indexer()), uint(1)]),
        v1(EventKind::StakeDeposited, 101, 0, vec![addr(indexer())]),
        v1(EventKind::StakeDeposited, 102, 0, vec![addr(indexer()), uint(3)]),
    ];
    let report = p.run(&events).unwrap();

    assert!(report.halted);
    assert_eq!(report.applied, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].position, EventPosition::new(101, 0));
    assert_eq!(report.last_position, Some(EventPosition::new(100, 0)));
}

#[test]
fn continue_on_fatal_records_and_proceeds() {
    let config = PipelineConfig {
        halt_on_fatal: false,
        ..PipelineConfig::default()
    };
    let mut p = pipeline_with(config, Default::default());
    let events = vec![
        v1(EventKind::StakeDeposited, 100, 0, vec![addr(indexer()), uint(1)]),
        v1(EventKind::StakeDeposited, 101, 0, vec![addr(indexer())]),
        v1(EventKind::StakeDeposited, 102, 0, vec![addr(indexer()), uint(3)]),
    ];
    let report = p.run(&events).unwrap();

    assert!(!report.halted);
    assert_eq!(report.applied, 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].error.is_event_fatal());
    assert_eq!(p.counter().unwrap().event_count, 2);
    assert!(load::<EventRecord>(&p, &events[1].event_id().unwrap()).is_none());
}

// ---------------------------------------------------------------------------
// Replay and determinism
// ---------------------------------------------------------------------------

#[test]
fn replayed_events_are_skipped() {
    let mut p = pipeline();
    let events = stream();
    p.run(&events).unwrap();
    let writes = p.store().write_count();
    let root = p.store().state_root().unwrap();

    let report = p.run(&events).unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.skipped, 6);
    assert_eq!(p.store().write_count(), writes);
    assert_eq!(p.store().state_root().unwrap(), root);
}

#[test]
fn checkpoint_survives_a_new_pipeline_over_the_same_store() {
    let mut p = pipeline();
    let events = stream();
    p.run(&events[..3]).unwrap();

    let mut resumed = Pipeline::new(p.into_store(), PipelineConfig::default());
    assert_eq!(resumed.checkpoint().unwrap(), Some(EventPosition::new(101, 0)));
    let report = resumed.run(&events).unwrap();
    assert_eq!(report.skipped, 3);
    assert_eq!(report.applied, 3);

    let counter = resumed.counter().unwrap();
    assert_eq!(counter.event_count, 6);
}

#[test]
fn state_root_is_deterministic_across_runs() {
    let events = stream();
    let mut a = pipeline();
    let mut b = pipeline();
    a.run(&events).unwrap();
    b.run(&events).unwrap();

    assert_eq!(
        a.store().state_root().unwrap(),
        b.store().state_root().unwrap()
    );
    assert_eq!(a.store().snapshot().unwrap(), b.store().snapshot().unwrap());
}

#[test]
fn applied_outcome_reports_write_count() {
    let mut p = pipeline();
    let outcome = p
        .process(&v1(EventKind::StakeDeposited, 100, 0, vec![addr(indexer()), uint(1)]))
        .unwrap();
    // Account, indexer, record, counter and checkpoint.
    assert_eq!(outcome, EventOutcome::Applied { writes: 5 });
}

/// Records the deposit without touching the indexer.
fn record_deposit_only(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> gni_pipeline::Result<()> {
    let indexer = p.address("indexer")?;
    let tokens = p.uint("tokens")?;
    ctx.save_record(ctx.event_record().address("indexer", &indexer).amount("tokens", tokens))
}

#[test]
fn custom_dispatch_table_replaces_standard_routes() {
    let mut table = DispatchTable::new();
    table.register(EventSignature::v1(EventKind::StakeDeposited), record_deposit_only);
    let mut p = Pipeline::new(InMemoryEntityStore::new(), PipelineConfig::default())
        .with_dispatch(table);

    let deposit = v1(EventKind::StakeDeposited, 100, 0, vec![addr(indexer()), uint(1)]);
    // Record, counter and checkpoint.
    assert_eq!(p.process(&deposit).unwrap(), EventOutcome::Applied { writes: 3 });
    assert!(load::<Indexer>(&p, &address_key(&indexer())).is_none());
    let record: EventRecord = require(&p, &deposit.event_id().unwrap());
    assert_eq!(record.fields["tokens"], "1");

    assert!(matches!(
        p.process(&publish_v1(101, 0, 0, 0x11, 0x22)),
        Err(PipelineError::MalformedInput(_))
    ));
}

// ---------------------------------------------------------------------------
// Configuration and validation
// ---------------------------------------------------------------------------

#[test]
fn metadata_dir_from_config_feeds_version_metadata() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(content_address(0x22)),
        r#"{"label": "from-disk"}"#,
    )
    .unwrap();
    let config = PipelineConfig::from_toml_str(&format!(
        "metadata_dir = {:?}\n",
        dir.path().display().to_string()
    ))
    .unwrap();

    let mut p = Pipeline::new(InMemoryEntityStore::new(), config);
    p.process(&publish_v1(100, 0, 0, 0x11, 0x22)).unwrap();
    let version: SubgraphVersion = require(&p, &key(&format!("{PINNED_KEY}-0")));
    assert_eq!(version.metadata.label, "from-disk");
}

#[test]
fn explicit_dir_fetcher_can_be_injected() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = pipeline().with_fetcher(DirContentFetcher::new(dir.path()));
    p.process(&publish_v1(100, 0, 0, 0x11, 0x22)).unwrap();
    let version: SubgraphVersion = require(&p, &key(&format!("{PINNED_KEY}-0")));
    assert_eq!(version.metadata.label, "");
}

#[test]
fn validator_accepts_the_sample_stream() {
    let report = StreamValidator::validate(&stream(), &gni_pipeline::DispatchTable::standard());
    assert!(report.is_valid(), "{:?}", report.violations);
}

#[test]
fn rewards_denylist_sets_and_clears_denial() {
    let mut p = pipeline();
    let deny = |block, since| {
        v1(
            EventKind::RewardsDenylistUpdated,
            block,
            0,
            vec![b32(digest(0x11)), uint(since)],
        )
    };
    p.process(&deny(100, 90)).unwrap();
    let id = key(&format!("0x{}", "11".repeat(32)));
    let deployment: SubgraphDeployment = require(&p, &id);
    assert_eq!(deployment.denied_at, Some(90));

    p.process(&deny(101, 0)).unwrap();
    let deployment: SubgraphDeployment = require(&p, &id);
    assert_eq!(deployment.denied_at, None);
}
