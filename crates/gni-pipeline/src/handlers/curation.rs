//! Curation signal, the indexer service registry and the rewards denylist.

use gni_store::SubgraphDeployment;

use crate::context::HandlerContext;
use crate::error::Result;
use crate::params::ParamReader;

/// `Signalled(curator, subgraphDeploymentID, tokens, signal, curationTax)`
pub fn signalled(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let curator = p.address("curator")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let tokens = p.uint("tokens")?;
    let signal = p.uint("signal")?;
    let tax = p.uint("curationTax")?;

    let curator = ctx.curator(&curator)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let record = ctx
        .event_record()
        .account(&curator)
        .deployment(&deployment)
        .amount("tokens", tokens)
        .amount("signal", signal)
        .amount("curationTax", tax);
    ctx.save_record(record)
}

/// `Burned(curator, subgraphDeploymentID, tokens, signal)`
pub fn burned(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let curator = p.address("curator")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let tokens = p.uint("tokens")?;
    let signal = p.uint("signal")?;

    let curator = ctx.curator(&curator)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let record = ctx
        .event_record()
        .account(&curator)
        .deployment(&deployment)
        .amount("tokens", tokens)
        .amount("signal", signal);
    ctx.save_record(record)
}

/// `ServiceRegistered(indexer, url, geohash)`
pub fn service_registered(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let address = p.address("indexer")?;
    let url = p.string("url")?;
    let geo_hash = p.string("geohash")?;

    let mut indexer = ctx.indexer(&address)?;
    indexer.url = Some(url.clone());
    indexer.geo_hash = Some(geo_hash.clone());

    let record = ctx
        .event_record()
        .account(&indexer.id)
        .field("url", url)
        .field("geohash", geo_hash);
    ctx.save_record(record)?;
    ctx.save(indexer)
}

/// `ServiceUnregistered(indexer)`
pub fn service_unregistered(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let address = p.address("indexer")?;

    let mut indexer = ctx.indexer(&address)?;
    indexer.url = None;
    indexer.geo_hash = None;

    ctx.save_record(ctx.event_record().account(&indexer.id))?;
    ctx.save(indexer)
}

/// `RewardsDenylistUpdated(subgraphDeploymentID, sinceBlock)`
///
/// A `sinceBlock` of zero lifts the denial.
pub fn rewards_denylist_updated(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let since_block = p.uint_u64("sinceBlock")?;

    let key = ctx.deployment(&deployment_id)?;
    let mut deployment = ctx.registry.load_required::<SubgraphDeployment>(&key)?;
    deployment.denied_at = (since_block != 0).then_some(since_block);

    let record = ctx
        .event_record()
        .deployment(&key)
        .field("sinceBlock", since_block);
    ctx.save_record(record)?;
    ctx.save(deployment)
}
