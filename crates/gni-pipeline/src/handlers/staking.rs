//! Staking: indexer stake, delegation, allocations and rebates.
//!
//! These handlers establish identities only. Amounts land on the event
//! record untouched.

use crate::context::{address_key, HandlerContext};
use crate::error::Result;
use crate::params::ParamReader;

// ---------------------------------------------------------------------------
// Indexer stake
// ---------------------------------------------------------------------------

/// `StakeDeposited(indexer, tokens)`
pub fn stake_deposited(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let tokens = p.uint("tokens")?;

    let indexer = ctx.indexer(&indexer)?;
    ctx.save_record(ctx.event_record().account(&indexer.id).amount("tokens", tokens))
}

/// `StakeLocked(indexer, tokens, until)`
pub fn stake_locked(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let tokens = p.uint("tokens")?;
    let until = p.uint_u64("until")?;

    let indexer = ctx.indexer(&indexer)?;
    let record = ctx
        .event_record()
        .account(&indexer.id)
        .amount("tokens", tokens)
        .field("until", until);
    ctx.save_record(record)
}

/// `StakeWithdrawn(indexer, tokens)`
pub fn stake_withdrawn(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let tokens = p.uint("tokens")?;

    let indexer = ctx.indexer(&indexer)?;
    ctx.save_record(ctx.event_record().account(&indexer.id).amount("tokens", tokens))
}

/// `StakeSlashed(indexer, tokens, reward, beneficiary)`
pub fn stake_slashed(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let tokens = p.uint("tokens")?;
    let reward = p.uint("reward")?;
    let beneficiary = p.address("beneficiary")?;

    let indexer = ctx.indexer(&indexer)?;
    let beneficiary = ctx.account(&beneficiary)?;
    let record = ctx
        .event_record()
        .account(&indexer.id)
        .account(&beneficiary)
        .amount("tokens", tokens)
        .amount("reward", reward);
    ctx.save_record(record)
}

// ---------------------------------------------------------------------------
// Delegation
// ---------------------------------------------------------------------------

/// `StakeDelegated(indexer, delegator, tokens, shares)`
pub fn stake_delegated(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let delegator = p.address("delegator")?;
    let tokens = p.uint("tokens")?;
    let shares = p.uint("shares")?;

    let stake = ctx.delegated_stake(&delegator, &indexer)?;
    let record = ctx
        .event_record()
        .account(&address_key(&delegator)?)
        .account(&address_key(&indexer)?)
        .field("delegatedStake", stake.as_str())
        .amount("tokens", tokens)
        .amount("shares", shares);
    ctx.save_record(record)
}

/// `StakeDelegatedLocked(indexer, delegator, shares, tokens, until)`
pub fn stake_delegated_locked(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let delegator = p.address("delegator")?;
    let shares = p.uint("shares")?;
    let tokens = p.uint("tokens")?;
    let until = p.uint_u64("until")?;

    let stake = ctx.delegated_stake(&delegator, &indexer)?;
    let record = ctx
        .event_record()
        .account(&address_key(&delegator)?)
        .account(&address_key(&indexer)?)
        .field("delegatedStake", stake.as_str())
        .amount("shares", shares)
        .amount("tokens", tokens)
        .field("until", until);
    ctx.save_record(record)
}

/// `StakeDelegatedWithdrawn(indexer, delegator, tokens)`
pub fn stake_delegated_withdrawn(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let delegator = p.address("delegator")?;
    let tokens = p.uint("tokens")?;

    let stake = ctx.delegated_stake(&delegator, &indexer)?;
    let record = ctx
        .event_record()
        .account(&address_key(&delegator)?)
        .account(&address_key(&indexer)?)
        .field("delegatedStake", stake.as_str())
        .amount("tokens", tokens);
    ctx.save_record(record)
}

/// `DelegationParametersUpdated(indexer, indexingRewardCut, queryFeeCut, cooldownBlocks)`
pub fn delegation_parameters_updated(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let indexer = p.address("indexer")?;
    let indexing_reward_cut = p.uint("indexingRewardCut")?;
    let query_fee_cut = p.uint("queryFeeCut")?;
    let cooldown_blocks = p.uint("cooldownBlocks")?;

    let indexer = ctx.indexer(&indexer)?;
    let record = ctx
        .event_record()
        .account(&indexer.id)
        .amount("indexingRewardCut", indexing_reward_cut)
        .amount("queryFeeCut", query_fee_cut)
        .amount("cooldownBlocks", cooldown_blocks);
    ctx.save_record(record)
}

/// `SetOperator(indexer, operator, allowed)`
pub fn set_operator(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let operator = p.address("operator")?;
    let allowed = p.bool("allowed")?;

    let indexer = ctx.indexer(&indexer)?;
    let operator = ctx.account(&operator)?;
    let record = ctx
        .event_record()
        .account(&indexer.id)
        .account(&operator)
        .field("operator", operator.as_str())
        .field("allowed", allowed);
    ctx.save_record(record)
}

// ---------------------------------------------------------------------------
// Allocations
// ---------------------------------------------------------------------------

/// `AllocationCreated(indexer, subgraphDeploymentID, epoch, tokens, allocationID, metadata)`
pub fn allocation_created(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let epoch = p.uint_u64("epoch")?;
    let tokens = p.uint("tokens")?;
    let allocation = p.address("allocationID")?;
    let metadata = p.bytes32("metadata")?;

    let indexer = ctx.indexer(&indexer)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let record = ctx
        .event_record()
        .account(&indexer.id)
        .deployment(&deployment)
        .field("epoch", epoch)
        .amount("tokens", tokens)
        .address("allocationID", &allocation)
        .bytes32("metadata", &metadata);
    ctx.save_record(record)
}

/// `AllocationCollected(indexer, subgraphDeploymentID, epoch, tokens, allocationID, from, curationFees, rebateFees)`
pub fn allocation_collected(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let epoch = p.uint_u64("epoch")?;
    let tokens = p.uint("tokens")?;
    let allocation = p.address("allocationID")?;
    let from = p.address("from")?;
    let curation_fees = p.uint("curationFees")?;
    let rebate_fees = p.uint("rebateFees")?;

    let indexer = ctx.indexer(&indexer)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let record = ctx
        .event_record()
        .account(&indexer.id)
        .deployment(&deployment)
        .field("epoch", epoch)
        .amount("tokens", tokens)
        .address("allocationID", &allocation)
        .address("from", &from)
        .amount("curationFees", curation_fees)
        .amount("rebateFees", rebate_fees);
    ctx.save_record(record)
}

/// `AllocationClosed(indexer, subgraphDeploymentID, epoch, tokens, allocationID, effectiveAllocation, sender, poi, isPublic)`
pub fn allocation_closed_v1(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    allocation_closed(ctx, p, true)
}

/// `AllocationClosed(indexer, subgraphDeploymentID, epoch, tokens, allocationID, sender, poi, isPublic)`
pub fn allocation_closed_v2(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    allocation_closed(ctx, p, false)
}

fn allocation_closed(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
    with_effective_allocation: bool,
) -> Result<()> {
    let indexer = p.address("indexer")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let epoch = p.uint_u64("epoch")?;
    let tokens = p.uint("tokens")?;
    let allocation = p.address("allocationID")?;
    let effective = if with_effective_allocation {
        Some(p.uint("effectiveAllocation")?)
    } else {
        None
    };
    let sender = p.address("sender")?;
    let poi = p.bytes32("poi")?;
    let is_public = p.bool("isPublic")?;

    let indexer = ctx.indexer(&indexer)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let sender = ctx.account(&sender)?;
    let mut record = ctx
        .event_record()
        .account(&indexer.id)
        .account(&sender)
        .deployment(&deployment)
        .field("epoch", epoch)
        .amount("tokens", tokens)
        .address("allocationID", &allocation)
        .bytes32("poi", &poi)
        .field("isPublic", is_public);
    if let Some(effective) = effective {
        record = record.amount("effectiveAllocation", effective);
    }
    ctx.save_record(record)
}

// ---------------------------------------------------------------------------
// Rebates
// ---------------------------------------------------------------------------

/// `RebateClaimed(indexer, subgraphDeploymentID, allocationID, epoch, tokens, delegationFees)`
pub fn rebate_claimed(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let allocation = p.address("allocationID")?;
    let epoch = p.uint_u64("epoch")?;
    let tokens = p.uint("tokens")?;
    let delegation_fees = p.uint("delegationFees")?;

    let indexer = ctx.indexer(&indexer)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let record = ctx
        .event_record()
        .account(&indexer.id)
        .deployment(&deployment)
        .address("allocationID", &allocation)
        .field("epoch", epoch)
        .amount("tokens", tokens)
        .amount("delegationFees", delegation_fees);
    ctx.save_record(record)
}

/// `RebateCollected(indexer, subgraphDeploymentID, allocationID, epoch, queryFees, queryRebates, curationFees)`
pub fn rebate_collected(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let indexer = p.address("indexer")?;
    let deployment_id = p.bytes32("subgraphDeploymentID")?;
    let allocation = p.address("allocationID")?;
    let epoch = p.uint_u64("epoch")?;
    let query_fees = p.uint("queryFees")?;
    let query_rebates = p.uint("queryRebates")?;
    let curation_fees = p.uint("curationFees")?;

    let indexer = ctx.indexer(&indexer)?;
    let deployment = ctx.deployment(&deployment_id)?;
    let record = ctx
        .event_record()
        .account(&indexer.id)
        .deployment(&deployment)
        .address("allocationID", &allocation)
        .field("epoch", epoch)
        .amount("queryFees", query_fees)
        .amount("queryRebates", query_rebates)
        .amount("curationFees", curation_fees);
    ctx.save_record(record)
}
