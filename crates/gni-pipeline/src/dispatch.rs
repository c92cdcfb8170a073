use std::collections::HashMap;

use gni_types::{EventKind, EventSchemaVersion, EventSignature};

use crate::context::HandlerContext;
use crate::error::{PipelineError, Result};
use crate::handlers::{bridge, curation, gns, staking};
use crate::params::ParamReader;

/// A reconciliation handler for one event signature.
pub type Handler = fn(&HandlerContext<'_>, &mut ParamReader<'_>) -> Result<()>;

/// Routes `(kind, generation)` signatures to handlers.
#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<EventSignature, Handler>,
}

impl DispatchTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every handler this crate ships.
    ///
    /// Events whose shape is the same in both contract generations are
    /// routed for both; the rest only for the generations that emit them.
    pub fn standard() -> Self {
        use EventKind::*;

        let mut table = Self::new();

        // Name service
        table.register_v1(SubgraphPublished, gns::subgraph_published_v1);
        table.register_v2(SubgraphPublished, gns::subgraph_published_v2);
        table.register_v2(SubgraphVersionUpdated, gns::subgraph_version_updated_v2);
        table.register_v1(SubgraphMetadataUpdated, gns::subgraph_metadata_updated_v1);
        table.register_v2(SubgraphMetadataUpdated, gns::subgraph_metadata_updated_v2);
        table.register_v1(SubgraphDeprecated, gns::subgraph_deprecated_v1);
        table.register_v2(SubgraphDeprecated, gns::subgraph_deprecated_v2);
        table.register_v1(NameSignalEnabled, gns::name_signal_enabled_v1);
        table.register_v1(NSignalMinted, gns::name_signal_v1);
        table.register_v2(NSignalMinted, gns::name_signal_v2);
        table.register_v1(NSignalBurned, gns::name_signal_v1);
        table.register_v2(NSignalBurned, gns::name_signal_v2);
        table.register_both(ParameterUpdated, gns::parameter_updated);

        // Curation, service registry, rewards
        table.register_both(Signalled, curation::signalled);
        table.register_both(Burned, curation::burned);
        table.register_both(ServiceRegistered, curation::service_registered);
        table.register_both(ServiceUnregistered, curation::service_unregistered);
        table.register_both(RewardsDenylistUpdated, curation::rewards_denylist_updated);

        // Staking
        table.register_both(StakeDeposited, staking::stake_deposited);
        table.register_both(StakeLocked, staking::stake_locked);
        table.register_both(StakeWithdrawn, staking::stake_withdrawn);
        table.register_both(StakeSlashed, staking::stake_slashed);
        table.register_both(StakeDelegated, staking::stake_delegated);
        table.register_both(StakeDelegatedLocked, staking::stake_delegated_locked);
        table.register_both(StakeDelegatedWithdrawn, staking::stake_delegated_withdrawn);
        table.register_both(AllocationCreated, staking::allocation_created);
        table.register_both(AllocationCollected, staking::allocation_collected);
        table.register_v1(AllocationClosed, staking::allocation_closed_v1);
        table.register_v2(AllocationClosed, staking::allocation_closed_v2);
        table.register_both(RebateClaimed, staking::rebate_claimed);
        table.register_both(RebateCollected, staking::rebate_collected);
        table.register_both(DelegationParametersUpdated, staking::delegation_parameters_updated);
        table.register_both(SetOperator, staking::set_operator);

        // Bridge
        table.register_v2(SubgraphSentToL2, bridge::subgraph_sent_to_l2);
        table.register_v2(SubgraphReceivedFromL1, bridge::subgraph_received_from_l1);
        table.register_v2(SubgraphL2TransferFinalized, bridge::subgraph_l2_transfer_finalized);
        table.register_v2(CuratorBalanceSentToL2, bridge::curator_balance_sent_to_l2);
        table.register_v2(CuratorBalanceReceived, bridge::curator_balance_received);
        table.register_v2(
            CuratorBalanceReturnedToBeneficiary,
            bridge::curator_balance_returned_to_beneficiary,
        );
        table.register_v2(IndexerStakeTransferredToL2, bridge::indexer_stake_transferred_to_l2);
        table.register_v2(DelegationTransferredToL2, bridge::delegation_transferred_to_l2);
        table.register_v2(
            StakeDelegatedUnlockedDueToL2Transfer,
            bridge::stake_delegated_unlocked_due_to_l2_transfer,
        );
        table.register_v2(
            TransferredDelegationReturnedToDelegator,
            bridge::transferred_delegation_returned_to_delegator,
        );

        table
    }

    /// Route `signature` to `handler`, replacing any previous route.
    pub fn register(&mut self, signature: EventSignature, handler: Handler) {
        self.handlers.insert(signature, handler);
    }

    fn register_v1(&mut self, kind: EventKind, handler: Handler) {
        self.register(EventSignature::v1(kind), handler);
    }

    fn register_v2(&mut self, kind: EventKind, handler: Handler) {
        self.register(EventSignature::v2(kind), handler);
    }

    fn register_both(&mut self, kind: EventKind, handler: Handler) {
        self.register_v1(kind, handler);
        self.register_v2(kind, handler);
    }

    pub fn resolve(&self, signature: &EventSignature) -> Result<Handler> {
        self.handlers.get(signature).copied().ok_or_else(|| {
            PipelineError::MalformedInput(format!("no handler for event signature {signature}"))
        })
    }

    pub fn supports(&self, signature: &EventSignature) -> bool {
        self.handlers.contains_key(signature)
    }

    /// Routed signatures in a stable order.
    pub fn signatures(&self) -> Vec<EventSignature> {
        let mut signatures: Vec<_> = self.handlers.keys().copied().collect();
        signatures.sort();
        signatures
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("signatures", &self.handlers.len())
            .finish()
    }
}
