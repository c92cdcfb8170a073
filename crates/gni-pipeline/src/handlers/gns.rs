//! Name service: subgraph publication, versions, metadata and name signal.
//!
//! Contract generation 1 addresses a subgraph by `(graphAccount,
//! subgraphNumber)`, generation 2 by its numeric id. Both resolve to the
//! same key, so the two event families update the same rows.

use alloy_primitives::{B256, U256};
use gni_store::{Subgraph, SubgraphVersion, VersionMetadata};
use gni_types::{EntityKey, EventKind};

use crate::context::HandlerContext;
use crate::error::{PipelineError, Result};
use crate::params::ParamReader;

/// Record kind of the metadata sub-event emitted next to a version publish.
pub const VERSION_METADATA_UPDATED: &str = "SubgraphVersionMetadataUpdated";

/// Sub-event index of a version publish.
const PUBLISH: u32 = 0;
/// Sub-event index of a version metadata update.
const METADATA: u32 = 1;

/// Append a new version to `subgraph`.
///
/// The version index is the pre-increment `version_count`; the count is the
/// only source of the next index.
fn publish_version(
    ctx: &HandlerContext<'_>,
    subgraph: &mut Subgraph,
    deployment: &EntityKey,
) -> Result<SubgraphVersion> {
    let index = subgraph.version_count;
    let key = subgraph.id.child(index.to_string())?;
    if ctx.registry.exists::<SubgraphVersion>(&key)? {
        return Err(PipelineError::IntegrityViolation(format!(
            "version {key} already exists but subgraph {} counts {index} versions",
            subgraph.id
        )));
    }
    subgraph.version_count += 1;
    subgraph.current_version = Some(key.clone());
    Ok(SubgraphVersion {
        id: key,
        subgraph: subgraph.id.clone(),
        deployment: deployment.clone(),
        version: index,
        metadata_hash: None,
        metadata: VersionMetadata::default(),
        created_at: ctx.block(),
    })
}

fn attach_version_metadata(ctx: &HandlerContext<'_>, version: &mut SubgraphVersion, digest: &B256) {
    let (address, metadata) = ctx.version_metadata(digest);
    version.metadata_hash = Some(address);
    version.metadata = metadata;
}

fn metadata_record(
    ctx: &HandlerContext<'_>,
    subgraph: &Subgraph,
    version: &SubgraphVersion,
) -> Result<()> {
    let record = ctx
        .sub_record(VERSION_METADATA_UPDATED, METADATA)?
        .subgraph(&subgraph.id)
        .version(&version.id)
        .field(
            "metadataHash",
            version.metadata_hash.clone().unwrap_or_default(),
        )
        .account(&subgraph.owner);
    ctx.save_record(record)
}

// ---------------------------------------------------------------------------
// Publication
// ---------------------------------------------------------------------------

/// `SubgraphPublished(graphAccount, subgraphNumber, subgraphDeploymentID, versionMetadata)`
pub fn subgraph_published_v1(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let owner = p.address("graphAccount")?;
    let number = p.uint("subgraphNumber")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let metadata_digest = p.bytes32("versionMetadata")?;

    let key = ctx.subgraph_key_v1(&owner, number)?;
    let mut subgraph = ctx.subgraph(&key, &owner)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let mut version = publish_version(ctx, &mut subgraph, &deployment)?;
    attach_version_metadata(ctx, &mut version, &metadata_digest);

    let published = ctx
        .sub_record(ctx.kind().name(), PUBLISH)?
        .account(&subgraph.owner)
        .subgraph(&subgraph.id)
        .deployment(&deployment)
        .version(&version.id)
        .amount("subgraphNumber", number);
    ctx.save_record(published)?;
    metadata_record(ctx, &subgraph, &version)?;

    ctx.save(version)?;
    ctx.save(subgraph)
}

/// `SubgraphPublished(subgraphID, subgraphDeploymentID, reserveRatio)`
///
/// The version payload arrives with the next `SubgraphVersionUpdated`, so the
/// subgraph is left initializing.
pub fn subgraph_published_v2(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let id = p.uint("subgraphID")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let reserve_ratio = p.uint("reserveRatio")?;

    let key = ctx.subgraph_key(id)?;
    let mut subgraph = ctx.subgraph(&key, &ctx.event.transaction_from)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let version = publish_version(ctx, &mut subgraph, &deployment)?;
    subgraph.initializing = true;

    let record = ctx
        .event_record()
        .account(&subgraph.owner)
        .subgraph(&subgraph.id)
        .deployment(&deployment)
        .version(&version.id)
        .amount("reserveRatio", reserve_ratio);
    ctx.save_record(record)?;

    ctx.save(version)?;
    ctx.save(subgraph)
}

/// `SubgraphVersionUpdated(subgraphID, subgraphDeploymentID, versionMetadata)`
pub fn subgraph_version_updated_v2(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let id = p.uint("subgraphID")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let metadata_digest = p.bytes32("versionMetadata")?;

    let key = ctx.subgraph_key(id)?;
    let mut subgraph = ctx.require_subgraph(&key)?;
    let deployment = ctx.deployment(&deployment_id)?;

    if subgraph.initializing {
        // The publish already created the version; this event only carries
        // its metadata.
        let current = subgraph.current_version.clone().ok_or_else(|| {
            PipelineError::IntegrityViolation(format!(
                "initializing subgraph {key} has no current version"
            ))
        })?;
        let mut version = ctx.registry.load_required::<SubgraphVersion>(&current)?;
        attach_version_metadata(ctx, &mut version, &metadata_digest);
        subgraph.initializing = false;

        metadata_record(ctx, &subgraph, &version)?;
        ctx.save(version)?;
        return ctx.save(subgraph);
    }

    let mut version = publish_version(ctx, &mut subgraph, &deployment)?;
    attach_version_metadata(ctx, &mut version, &metadata_digest);

    let published = ctx
        .sub_record(ctx.kind().name(), PUBLISH)?
        .account(&subgraph.owner)
        .subgraph(&subgraph.id)
        .deployment(&deployment)
        .version(&version.id);
    ctx.save_record(published)?;
    metadata_record(ctx, &subgraph, &version)?;

    ctx.save(version)?;
    ctx.save(subgraph)
}

// ---------------------------------------------------------------------------
// Metadata and lifecycle
// ---------------------------------------------------------------------------

fn update_metadata(ctx: &HandlerContext<'_>, mut subgraph: Subgraph, digest: &B256) -> Result<()> {
    let (address, metadata) = ctx.subgraph_metadata(digest);
    subgraph.metadata_hash = Some(address.clone());
    subgraph.metadata = metadata;

    let record = ctx
        .event_record()
        .account(&subgraph.owner)
        .subgraph(&subgraph.id)
        .field("metadataHash", address);
    ctx.save_record(record)?;
    ctx.save(subgraph)
}

/// `SubgraphMetadataUpdated(graphAccount, subgraphNumber, subgraphMetadata)`
pub fn subgraph_metadata_updated_v1(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let owner = p.address("graphAccount")?;
    let number = p.uint("subgraphNumber")?;
    let digest = p.bytes32("subgraphMetadata")?;

    let key = ctx.subgraph_key_v1(&owner, number)?;
    let subgraph = ctx.subgraph(&key, &owner)?;
    update_metadata(ctx, subgraph, &digest)
}

/// `SubgraphMetadataUpdated(subgraphID, subgraphMetadata)`
pub fn subgraph_metadata_updated_v2(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let id = p.uint("subgraphID")?;
    let digest = p.bytes32("subgraphMetadata")?;

    let key = ctx.subgraph_key(id)?;
    let subgraph = ctx.subgraph(&key, &ctx.event.transaction_from)?;
    update_metadata(ctx, subgraph, &digest)
}

fn deprecate(ctx: &HandlerContext<'_>, key: &EntityKey, withdrawable: U256) -> Result<()> {
    let mut subgraph = ctx.require_subgraph(key)?;
    subgraph.active = false;

    let record = ctx
        .event_record()
        .account(&subgraph.owner)
        .subgraph(&subgraph.id)
        .amount("withdrawableGRT", withdrawable);
    ctx.save_record(record)?;
    ctx.save(subgraph)
}

/// `SubgraphDeprecated(graphAccount, subgraphNumber, withdrawableGRT)`
pub fn subgraph_deprecated_v1(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let owner = p.address("graphAccount")?;
    let number = p.uint("subgraphNumber")?;
    let withdrawable = p.uint("withdrawableGRT")?;
    let key = ctx.subgraph_key_v1(&owner, number)?;
    deprecate(ctx, &key, withdrawable)
}

/// `SubgraphDeprecated(subgraphID, withdrawableGRT)`
pub fn subgraph_deprecated_v2(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let id = p.uint("subgraphID")?;
    let withdrawable = p.uint("withdrawableGRT")?;
    let key = ctx.subgraph_key(id)?;
    deprecate(ctx, &key, withdrawable)
}

// ---------------------------------------------------------------------------
// Name signal
// ---------------------------------------------------------------------------

/// `NameSignalEnabled(graphAccount, subgraphNumber, subgraphDeploymentID, reserveRatio)`
pub fn name_signal_enabled_v1(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let owner = p.address("graphAccount")?;
    let number = p.uint("subgraphNumber")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let reserve_ratio = p.uint("reserveRatio")?;

    let key = ctx.subgraph_key_v1(&owner, number)?;
    let subgraph = ctx.subgraph(&key, &owner)?;
    let deployment = ctx.deployment(&deployment_id)?;

    let record = ctx
        .event_record()
        .account(&subgraph.owner)
        .subgraph(&subgraph.id)
        .deployment(&deployment)
        .amount("reserveRatio", reserve_ratio);
    ctx.save_record(record)
}

/// Shared tail of the mint and burn handlers. Amount names follow the
/// event kind: minting creates signal, burning burns it.
fn name_signal(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
    subgraph: &Subgraph,
    curator_param: &str,
) -> Result<()> {
    let curator_address = p.address(curator_param)?;
    let names: [&str; 3] = if ctx.kind() == EventKind::NSignalMinted {
        ["nSignalCreated", "vSignalCreated", "tokensDeposited"]
    } else {
        ["nSignalBurnt", "vSignalBurnt", "tokensReceived"]
    };
    let n_signal = p.uint(names[0])?;
    let v_signal = p.uint(names[1])?;
    let tokens = p.uint(names[2])?;

    let curator = ctx.curator(&curator_address)?;
    let name_signal_id = EntityKey::join(&[curator.as_str(), subgraph.id.as_str()])?;
    let record = ctx
        .event_record()
        .account(&curator)
        .account(&subgraph.owner)
        .subgraph(&subgraph.id)
        .field("nameSignalId", name_signal_id.as_str())
        .amount(names[0], n_signal)
        .amount(names[1], v_signal)
        .amount(names[2], tokens);
    ctx.save_record(record)
}

/// `NSignalMinted` / `NSignalBurned` with `(graphAccount, subgraphNumber, nameCurator, ...)`
pub fn name_signal_v1(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let owner = p.address("graphAccount")?;
    let number = p.uint("subgraphNumber")?;
    let key = ctx.subgraph_key_v1(&owner, number)?;
    let subgraph = ctx.subgraph(&key, &owner)?;
    name_signal(ctx, p, &subgraph, "nameCurator")
}

/// `NSignalMinted` / `NSignalBurned` with `(subgraphID, curator, ...)`
///
/// The event carries no owner, so the subgraph must already exist.
pub fn name_signal_v2(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let id = p.uint("subgraphID")?;
    let key = ctx.subgraph_key(id)?;
    let subgraph = ctx.require_subgraph(&key)?;
    name_signal(ctx, p, &subgraph, "curator")
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// `ParameterUpdated(param)`: the new value is read back from the contract.
pub fn parameter_updated(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let param = p.string("param")?;
    let value = ctx.read_state(&param);
    if value.is_none() {
        tracing::debug!(param = %param, contract = %ctx.event.contract, "parameter value unavailable");
    }
    let record = ctx
        .event_record()
        .field("param", param)
        .field("value", value.map_or(serde_json::Value::Null, serde_json::Value::String));
    ctx.save_record(record)
}
