//! Cross-layer bridge: subgraphs, curator balances, stake and delegation
//! moving between the two ledgers.

use crate::context::{address_key, HandlerContext};
use crate::error::Result;
use crate::linker::{finalize, link, LinkOutcome};
use crate::params::ParamReader;

fn outcome_name(outcome: LinkOutcome) -> &'static str {
    match outcome {
        LinkOutcome::Created => "created",
        LinkOutcome::AlreadyLinked => "alreadyLinked",
    }
}

// ---------------------------------------------------------------------------
// Subgraphs
// ---------------------------------------------------------------------------

/// `SubgraphSentToL2(subgraphID, l1Owner, l2Owner, tokens)`
///
/// The subgraph may predate the indexed range; the event names its owner,
/// so it is created on first sight.
pub fn subgraph_sent_to_l2(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let id = p.uint("subgraphID")?;
    let l1_owner = p.address("l1Owner")?;
    let l2_owner = p.address("l2Owner")?;
    let tokens = p.uint("tokens")?;

    let subgraph = ctx.subgraph(&ctx.subgraph_key(id)?, &l1_owner)?;
    let l1_owner = ctx.account(&l1_owner)?;
    let l2_owner = ctx.account(&l2_owner)?;
    let record = ctx
        .event_record()
        .account(&l1_owner)
        .account(&l2_owner)
        .subgraph(&subgraph.id)
        .amount("tokens", tokens);
    ctx.save_record(record)
}

/// `SubgraphReceivedFromL1(l1SubgraphID, l2SubgraphID, owner, tokens)`
///
/// Both identities get their own row and are linked to each other.
pub fn subgraph_received_from_l1(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let l1_id = p.uint("l1SubgraphID")?;
    let l2_id = p.uint("l2SubgraphID")?;
    let owner = p.address("owner")?;
    let tokens = p.uint("tokens")?;

    let l1 = ctx.subgraph(&ctx.subgraph_key(l1_id)?, &owner)?;
    let l2 = ctx.subgraph(&ctx.subgraph_key(l2_id)?, &owner)?;
    let l1_key = l1.id.clone();
    let l2_key = l2.id.clone();
    let owner_key = l2.owner.clone();
    let outcome = link(ctx, l1, l2)?;

    let record = ctx
        .event_record()
        .account(&owner_key)
        .subgraph(&l2_key)
        .field("l1Subgraph", l1_key.as_str())
        .amount("tokens", tokens)
        .field("link", outcome_name(outcome));
    ctx.save_record(record)
}

/// `SubgraphL2TransferFinalized(l2SubgraphID)`
pub fn subgraph_l2_transfer_finalized(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let l2_id = p.uint("l2SubgraphID")?;

    let key = ctx.subgraph_key(l2_id)?;
    let link = finalize(ctx, &key)?;
    let record = ctx
        .event_record()
        .subgraph(&key)
        .field("crossLayerLink", link.id.as_str());
    ctx.save_record(record)
}

// ---------------------------------------------------------------------------
// Curator balances
// ---------------------------------------------------------------------------

/// `CuratorBalanceSentToL2(subgraphID, l1Curator, l2Beneficiary, tokens)`
pub fn curator_balance_sent_to_l2(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let id = p.uint("subgraphID")?;
    let l1_curator = p.address("l1Curator")?;
    let l2_beneficiary = p.address("l2Beneficiary")?;
    let tokens = p.uint("tokens")?;

    let subgraph = ctx.subgraph_key(id)?;
    let curator = ctx.curator(&l1_curator)?;
    let beneficiary = ctx.account(&l2_beneficiary)?;
    let record = ctx
        .event_record()
        .account(&curator)
        .account(&beneficiary)
        .subgraph(&subgraph)
        .amount("tokens", tokens);
    ctx.save_record(record)
}

/// `CuratorBalanceReceived(l1SubgraphID, l2SubgraphID, l2Curator, tokens)`
pub fn curator_balance_received(ctx: &HandlerContext<'_>, p: &mut ParamReader<'_>) -> Result<()> {
    let l1_id = p.uint("l1SubgraphID")?;
    let l2_id = p.uint("l2SubgraphID")?;
    let l2_curator = p.address("l2Curator")?;
    let tokens = p.uint("tokens")?;

    let l1 = ctx.subgraph_key(l1_id)?;
    let l2 = ctx.subgraph_key(l2_id)?;
    let curator = ctx.curator(&l2_curator)?;
    let record = ctx
        .event_record()
        .account(&curator)
        .subgraph(&l2)
        .field("l1Subgraph", l1.as_str())
        .amount("tokens", tokens);
    ctx.save_record(record)
}

/// `CuratorBalanceReturnedToBeneficiary(l1SubgraphID, l2Curator, tokens)`
pub fn curator_balance_returned_to_beneficiary(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let l1_id = p.uint("l1SubgraphID")?;
    let l2_curator = p.address("l2Curator")?;
    let tokens = p.uint("tokens")?;

    let l1 = ctx.subgraph_key(l1_id)?;
    let curator = ctx.curator(&l2_curator)?;
    let record = ctx
        .event_record()
        .account(&curator)
        .field("l1Subgraph", l1.as_str())
        .amount("tokens", tokens);
    ctx.save_record(record)
}

// ---------------------------------------------------------------------------
// Stake and delegation
// ---------------------------------------------------------------------------

/// `IndexerStakeTransferredToL2(indexer, l2Indexer, transferredStakeTokens)`
pub fn indexer_stake_transferred_to_l2(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let l1 = p.address("indexer")?;
    let l2 = p.address("l2Indexer")?;
    let tokens = p.uint("transferredStakeTokens")?;

    let l1 = ctx.indexer(&l1)?;
    let l2 = ctx.indexer(&l2)?;
    let l1_key = l1.id.clone();
    let l2_key = l2.id.clone();
    let outcome = link(ctx, l1, l2)?;

    let record = ctx
        .event_record()
        .account(&l1_key)
        .account(&l2_key)
        .amount("transferredStakeTokens", tokens)
        .field("link", outcome_name(outcome));
    ctx.save_record(record)
}

/// `DelegationTransferredToL2(delegator, l2Delegator, indexer, l2Indexer, transferredDelegationTokens)`
pub fn delegation_transferred_to_l2(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let delegator = p.address("delegator")?;
    let l2_delegator = p.address("l2Delegator")?;
    let indexer = p.address("indexer")?;
    let l2_indexer = p.address("l2Indexer")?;
    let tokens = p.uint("transferredDelegationTokens")?;

    let stake = ctx.delegated_stake(&delegator, &indexer)?;
    let l2_delegator = ctx.account(&l2_delegator)?;
    let l2_indexer = ctx.account(&l2_indexer)?;
    let record = ctx
        .event_record()
        .account(&address_key(&delegator)?)
        .account(&address_key(&indexer)?)
        .account(&l2_delegator)
        .account(&l2_indexer)
        .field("delegatedStake", stake.as_str())
        .amount("transferredDelegationTokens", tokens);
    ctx.save_record(record)
}

/// `StakeDelegatedUnlockedDueToL2Transfer(indexer, delegator)`
pub fn stake_delegated_unlocked_due_to_l2_transfer(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let indexer = p.address("indexer")?;
    let delegator = p.address("delegator")?;

    let stake = ctx.delegated_stake(&delegator, &indexer)?;
    let record = ctx
        .event_record()
        .account(&address_key(&delegator)?)
        .account(&address_key(&indexer)?)
        .field("delegatedStake", stake.as_str());
    ctx.save_record(record)
}

/// `TransferredDelegationReturnedToDelegator(indexer, delegator, amount)`
pub fn transferred_delegation_returned_to_delegator(
    ctx: &HandlerContext<'_>,
    p: &mut ParamReader<'_>,
) -> Result<()> {
    let indexer = p.address("indexer")?;
    let delegator = p.address("delegator")?;
    let amount = p.uint("amount")?;

    let stake = ctx.delegated_stake(&delegator, &indexer)?;
    let record = ctx
        .event_record()
        .account(&address_key(&delegator)?)
        .account(&address_key(&indexer)?)
        .field("delegatedStake", stake.as_str())
        .amount("amount", amount);
    ctx.save_record(record)
}
