//! # Supply Chain Service
//!
//! The transition gateway: the only path by which ledger state changes.
//!
//! ## Gateway Order
//!
//! Every mutating call runs under one write lock and checks, in order:
//!
//! 1. input validity (`InvalidInput`)
//! 2. caller role (`Unauthorized`)
//! 3. item existence (`NotFound`), or absence for creation (`AlreadyExists`)
//! 4. custody for owner-only rules (`Unauthorized`)
//! 5. current state (`InvalidState`)
//! 6. cross-item checks (`InvalidReference`, `InsufficientPayment`)
//! 7. payment settlement for Buy (`PaymentFailed`)
//!
//! Only then is the ledger mutated. The lock is released before the event is
//! published, and nothing is published for a rejected call.

use crate::config::SupplyChainConfig;
use crate::domain::{
    invariant_payment_covers_price, invariant_positive_upc, invariant_yarn_batch, Action,
    ErrorKind, FabricItem, FabricLedger, FabricRecord, RoleRegistry, Stage, SupplyChainError,
    TransitionRule, TransitionTable, YarnBufferOne, YarnBufferTwo, YarnItem, YarnLedger,
    YarnOrigin, YarnRecord,
};
use crate::ports::inbound::SupplyChainApi;
use crate::ports::outbound::{PaymentSettlement, SettlementInstruction, SettlementReceipt};

use async_trait::async_trait;
use fiber_telemetry::{log_item_event, metrics};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, SupplyChainEvent};
use shared_types::{Amount, Identity, ProductId, Role, Upc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Statistics for the Supply Chain Service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Committed transitions, by action.
    pub applied: HashMap<Action, u64>,
    /// Rejected calls, by action.
    pub rejected: HashMap<Action, u64>,
    /// Rejected calls, by error kind.
    pub rejected_by_kind: HashMap<ErrorKind, u64>,
    /// Events handed to the publisher.
    pub events_published: u64,
    /// Value settled to sellers.
    pub payment_volume: Amount,
}

impl ServiceStats {
    /// Committed count for one action.
    pub fn applied(&self, action: Action) -> u64 {
        self.applied.get(&action).copied().unwrap_or(0)
    }

    /// Rejected count for one action.
    pub fn rejected(&self, action: Action) -> u64 {
        self.rejected.get(&action).copied().unwrap_or(0)
    }

    /// Rejected count for one error kind.
    pub fn rejected_kind(&self, kind: ErrorKind) -> u64 {
        self.rejected_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Total committed transitions.
    pub fn total_applied(&self) -> u64 {
        self.applied.values().sum()
    }

    /// Total rejected calls.
    pub fn total_rejected(&self) -> u64 {
        self.rejected.values().sum()
    }
}

/// Everything guarded by the gateway lock.
#[derive(Debug)]
struct LedgerState {
    roles: RoleRegistry,
    yarns: YarnLedger,
    fabrics: FabricLedger,
}

/// Value returned to the caller plus the event to publish after commit.
type Outcome<T> = Result<(T, Option<SupplyChainEvent>), SupplyChainError>;

/// The provenance ledger service.
///
/// This service:
/// 1. Authorizes each call against the role registry and transition table
/// 2. Applies the transition to the Yarn or Fabric ledger
/// 3. Settles payment for Buy before ownership moves
/// 4. Publishes one event per committed transition
pub struct SupplyChainService<P: PaymentSettlement> {
    /// Service configuration.
    config: SupplyChainConfig,
    /// Lifecycle rules.
    table: TransitionTable,
    /// Registry and both ledgers; the single serialization point.
    state: RwLock<LedgerState>,
    /// Payment settlement adapter.
    settlement: Arc<P>,
    /// Event sink.
    publisher: Arc<dyn EventPublisher>,
    /// Service statistics.
    stats: Mutex<ServiceStats>,
}

impl<P: PaymentSettlement> SupplyChainService<P> {
    /// Create a service whose role registry is administered by `owner`.
    pub fn new(
        owner: Identity,
        config: SupplyChainConfig,
        settlement: P,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        info!(owner = %owner, sell_policy = %config.sell_policy, "Supply chain service created");
        Self {
            table: TransitionTable::new(&config.sell_policy),
            config,
            state: RwLock::new(LedgerState {
                roles: RoleRegistry::new(owner),
                yarns: YarnLedger::new(),
                fabrics: FabricLedger::new(),
            }),
            settlement: Arc::new(settlement),
            publisher,
            stats: Mutex::new(ServiceStats::default()),
        }
    }

    /// Service configuration.
    pub fn config(&self) -> &SupplyChainConfig {
        &self.config
    }

    /// Lifecycle rules in force.
    pub fn transition_table(&self) -> &TransitionTable {
        &self.table
    }

    /// Payment settlement adapter.
    pub fn settlement(&self) -> &P {
        &self.settlement
    }

    /// Registry administrator.
    pub async fn owner(&self) -> Identity {
        self.state.read().await.roles.owner()
    }

    /// Roles held by `account`.
    pub async fn roles_of(&self, account: Identity) -> Vec<Role> {
        self.state.read().await.roles.roles_of(&account)
    }

    /// Fabric a yarn was cut into, if any.
    pub async fn fabric_for_yarn(&self, yarn_upc: Upc) -> Option<Upc> {
        self.state.read().await.fabrics.consumed_by(yarn_upc)
    }

    /// Number of yarn and fabric items.
    pub async fn item_counts(&self) -> (usize, usize) {
        let state = self.state.read().await;
        (state.yarns.len(), state.fabrics.len())
    }

    // =========================================================================
    // GATEWAY CHECKS
    // =========================================================================

    fn guard_creation(
        rule: &TransitionRule,
        roles: &RoleRegistry,
        caller: &Identity,
        upc: Upc,
        exists: bool,
    ) -> Result<(), SupplyChainError> {
        invariant_positive_upc(upc)?;
        rule.authorize_role(roles, caller)?;
        if exists {
            return Err(SupplyChainError::AlreadyExists {
                entity: rule.entity,
                upc,
            });
        }
        Ok(())
    }

    fn guard_yarn<'a>(
        rule: &TransitionRule,
        state: &'a LedgerState,
        caller: &Identity,
        upc: Upc,
    ) -> Result<&'a YarnItem, SupplyChainError> {
        invariant_positive_upc(upc)?;
        rule.authorize_role(&state.roles, caller)?;
        let item = state.yarns.load(upc)?;
        rule.authorize_owner(caller, &item.owner_id)?;
        rule.check_stage(upc, Stage::Yarn(item.state))?;
        Ok(item)
    }

    fn guard_fabric<'a>(
        rule: &TransitionRule,
        state: &'a LedgerState,
        caller: &Identity,
        upc: Upc,
    ) -> Result<&'a FabricItem, SupplyChainError> {
        invariant_positive_upc(upc)?;
        rule.authorize_role(&state.roles, caller)?;
        let item = state.fabrics.load(upc)?;
        rule.authorize_owner(caller, &item.owner_id)?;
        rule.check_stage(upc, Stage::Fabric(item.state))?;
        Ok(item)
    }

    // =========================================================================
    // LOCKED TRANSITIONS
    // =========================================================================

    fn plant_locked(
        &self,
        state: &mut LedgerState,
        caller: Identity,
        upc: Upc,
        origin: YarnOrigin,
    ) -> Outcome<()> {
        let rule = self.table.rule(Action::PlantYarn)?;
        Self::guard_creation(rule, &state.roles, &caller, upc, state.yarns.contains(upc))?;
        state.yarns.plant(upc, caller, origin, rule.yarn_target()?);
        Ok(((), Some(SupplyChainEvent::YarnPlanted { upc, textile: caller })))
    }

    fn acquire_locked(
        &self,
        state: &mut LedgerState,
        caller: Identity,
        upc: Upc,
        notes: String,
    ) -> Outcome<()> {
        let rule = self.table.rule(Action::AcquireYarn)?;
        Self::guard_yarn(rule, state, &caller, upc)?;
        state.yarns.acquire(upc, notes, rule.yarn_target()?)?;
        Ok(((), Some(SupplyChainEvent::YarnAcquired { upc, textile: caller })))
    }

    fn audit_locked(
        &self,
        state: &mut LedgerState,
        caller: Identity,
        upc: Upc,
        notes: String,
    ) -> Outcome<()> {
        let rule = self.table.rule(Action::AuditYarn)?;
        Self::guard_yarn(rule, state, &caller, upc)?;
        state.yarns.audit(upc, notes, rule.yarn_target()?)?;
        Ok(((), Some(SupplyChainEvent::YarnAudited { upc, checker: caller })))
    }

    fn process_locked(&self, state: &mut LedgerState, caller: Identity, upc: Upc) -> Outcome<()> {
        let rule = self.table.rule(Action::ProcessYarn)?;
        Self::guard_yarn(rule, state, &caller, upc)?;
        state.yarns.process(upc, rule.yarn_target()?)?;
        Ok(((), Some(SupplyChainEvent::YarnProcessed { upc, textile: caller })))
    }

    fn create_locked(
        &self,
        state: &mut LedgerState,
        caller: Identity,
        upc: Upc,
        product_id: ProductId,
    ) -> Outcome<()> {
        let rule = self.table.rule(Action::CreateFabric)?;
        Self::guard_creation(rule, &state.roles, &caller, upc, state.fabrics.contains(upc))?;
        state.fabrics.create(upc, product_id, caller, rule.fabric_target()?);
        Ok((
            (),
            Some(SupplyChainEvent::FabricCreated {
                upc,
                product_id,
                producer: caller,
            }),
        ))
    }

    fn cut_locked(
        &self,
        state: &mut LedgerState,
        caller: Identity,
        upc: Upc,
        yarns: Vec<Upc>,
    ) -> Outcome<()> {
        let rule = self.table.rule(Action::CutFabric)?;
        for &yarn_upc in &yarns {
            invariant_positive_upc(yarn_upc)?;
        }
        Self::guard_fabric(rule, state, &caller, upc)?;
        invariant_yarn_batch(&yarns)?;
        state.fabrics.validate_yarn_references(&state.yarns, &yarns)?;

        state.fabrics.cut(upc, &yarns, rule.fabric_target()?)?;
        log_item_event!(debug, "fabric", upc, "Yarns consumed", yarns = ?yarns);
        Ok((
            (),
            Some(SupplyChainEvent::FabricCutted {
                upc,
                yarns,
                producer: caller,
            }),
        ))
    }

    fn produce_locked(
        &self,
        state: &mut LedgerState,
        caller: Identity,
        upc: Upc,
        notes: String,
        price: Amount,
    ) -> Outcome<()> {
        let rule = self.table.rule(Action::ProduceFabric)?;
        Self::guard_fabric(rule, state, &caller, upc)?;
        state.fabrics.produce(upc, notes, price, rule.fabric_target()?)?;
        Ok((
            (),
            Some(SupplyChainEvent::FabricProduced {
                upc,
                price,
                producer: caller,
            }),
        ))
    }

    fn certify_locked(
        &self,
        state: &mut LedgerState,
        caller: Identity,
        upc: Upc,
        notes: String,
    ) -> Outcome<()> {
        let rule = self.table.rule(Action::CertifyFabric)?;
        Self::guard_fabric(rule, state, &caller, upc)?;
        state.fabrics.certify(upc, notes, rule.fabric_target()?)?;
        Ok(((), Some(SupplyChainEvent::FabricCertified { upc, checker: caller })))
    }

    fn pack_locked(&self, state: &mut LedgerState, caller: Identity, upc: Upc) -> Outcome<()> {
        let rule = self.table.rule(Action::PackFabric)?;
        Self::guard_fabric(rule, state, &caller, upc)?;
        state.fabrics.pack(upc, rule.fabric_target()?)?;
        Ok(((), Some(SupplyChainEvent::FabricPacked { upc, producer: caller })))
    }

    fn sell_locked(&self, state: &mut LedgerState, caller: Identity, upc: Upc) -> Outcome<()> {
        let rule = self.table.rule(Action::SellFabric)?;
        let owner = Self::guard_fabric(rule, state, &caller, upc)?.owner_id;
        state.fabrics.list_for_sale(upc, rule.fabric_target()?)?;
        Ok((
            (),
            Some(SupplyChainEvent::FabricForSale {
                upc,
                seller: caller,
                owner,
            }),
        ))
    }

    async fn buy_locked(
        &self,
        state: &mut LedgerState,
        caller: Identity,
        upc: Upc,
        payment: Amount,
    ) -> Outcome<SettlementReceipt> {
        let rule = self.table.rule(Action::BuyFabric)?;
        let item = Self::guard_fabric(rule, state, &caller, upc)?;
        let (seller, price) = (item.owner_id, item.product_price);
        let refund = invariant_payment_covers_price(upc, price, payment)?;

        let receipt = self
            .settlement
            .settle(SettlementInstruction {
                fabric_upc: upc,
                buyer: caller,
                seller,
                payment,
                price,
                refund,
            })
            .await?;

        state.fabrics.purchase(upc, caller, rule.fabric_target()?)?;
        metrics::record_settlement(price);
        {
            let mut stats = self.stats.lock();
            stats.payment_volume = stats.payment_volume.saturating_add(price);
        }
        log_item_event!(info, "fabric", upc, "Payment settled", price, refund, seller = %seller);

        Ok((
            receipt,
            Some(SupplyChainEvent::FabricPurchased {
                upc,
                buyer: caller,
                seller,
                price,
                refund,
            }),
        ))
    }

    // =========================================================================
    // COMMIT
    // =========================================================================

    /// Record the outcome, then publish the event of a committed transition.
    async fn commit<T>(
        &self,
        action: Action,
        caller: Identity,
        outcome: Outcome<T>,
    ) -> Result<T, SupplyChainError> {
        match outcome {
            Ok((value, event)) => {
                *self.stats.lock().applied.entry(action).or_default() += 1;
                metrics::record_transition_applied(action.as_str());

                if let Some(event) = event {
                    info!(%action, caller = %caller, upc = ?event.upc(), event = event.name(), "Transition applied");
                    let receivers = self.publisher.publish(event).await;
                    self.stats.lock().events_published += 1;
                    metrics::record_event_published(receivers);
                } else {
                    debug!(%action, caller = %caller, "Applied without state change");
                }
                Ok(value)
            }
            Err(e) => {
                let kind = e.kind();
                warn!(%action, caller = %caller, reason = kind.as_str(), error = %e, "Transition rejected");
                {
                    let mut stats = self.stats.lock();
                    *stats.rejected.entry(action).or_default() += 1;
                    *stats.rejected_by_kind.entry(kind).or_default() += 1;
                }
                metrics::record_transition_rejected(action.as_str(), kind.as_str());
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<P: PaymentSettlement + 'static> SupplyChainApi for SupplyChainService<P> {
    #[instrument(skip(self, origin, caller), fields(caller = %caller))]
    async fn plant_yarn(
        &self,
        caller: Identity,
        upc: Upc,
        origin: YarnOrigin,
    ) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.plant_locked(&mut state, caller, upc, origin)
        };
        self.commit(Action::PlantYarn, caller, outcome).await
    }

    #[instrument(skip(self, acquisition_notes, caller), fields(caller = %caller))]
    async fn acquire_yarn(
        &self,
        caller: Identity,
        upc: Upc,
        acquisition_notes: String,
    ) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.acquire_locked(&mut state, caller, upc, acquisition_notes)
        };
        self.commit(Action::AcquireYarn, caller, outcome).await
    }

    #[instrument(skip(self, audit_notes, caller), fields(caller = %caller))]
    async fn audit_yarn(
        &self,
        caller: Identity,
        upc: Upc,
        audit_notes: String,
    ) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.audit_locked(&mut state, caller, upc, audit_notes)
        };
        self.commit(Action::AuditYarn, caller, outcome).await
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    async fn process_yarn(&self, caller: Identity, upc: Upc) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.process_locked(&mut state, caller, upc)
        };
        self.commit(Action::ProcessYarn, caller, outcome).await
    }

    async fn fetch_yarn(&self, upc: Upc) -> Result<YarnRecord, SupplyChainError> {
        debug!(upc, "Fetching yarn");
        self.state.read().await.yarns.load(upc).cloned()
    }

    async fn fetch_yarn_buffer_one(&self, upc: Upc) -> Result<YarnBufferOne, SupplyChainError> {
        self.state.read().await.yarns.load(upc).map(YarnBufferOne::from)
    }

    async fn fetch_yarn_buffer_two(&self, upc: Upc) -> Result<YarnBufferTwo, SupplyChainError> {
        self.state.read().await.yarns.load(upc).map(YarnBufferTwo::from)
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    async fn create_fabric(
        &self,
        caller: Identity,
        upc: Upc,
        product_id: ProductId,
    ) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.create_locked(&mut state, caller, upc, product_id)
        };
        self.commit(Action::CreateFabric, caller, outcome).await
    }

    async fn cut_fabric(
        &self,
        caller: Identity,
        fabric_upc: Upc,
        yarn_upc: Upc,
    ) -> Result<(), SupplyChainError> {
        self.cut_fabric_many(caller, fabric_upc, vec![yarn_upc]).await
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    async fn cut_fabric_many(
        &self,
        caller: Identity,
        fabric_upc: Upc,
        yarn_upcs: Vec<Upc>,
    ) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.cut_locked(&mut state, caller, fabric_upc, yarn_upcs)
        };
        self.commit(Action::CutFabric, caller, outcome).await
    }

    #[instrument(skip(self, product_notes, caller), fields(caller = %caller))]
    async fn produce_fabric(
        &self,
        caller: Identity,
        upc: Upc,
        product_notes: String,
        product_price: Amount,
    ) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.produce_locked(&mut state, caller, upc, product_notes, product_price)
        };
        self.commit(Action::ProduceFabric, caller, outcome).await
    }

    #[instrument(skip(self, certify_notes, caller), fields(caller = %caller))]
    async fn certify_fabric(
        &self,
        caller: Identity,
        upc: Upc,
        certify_notes: String,
    ) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.certify_locked(&mut state, caller, upc, certify_notes)
        };
        self.commit(Action::CertifyFabric, caller, outcome).await
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    async fn pack_fabric(&self, caller: Identity, upc: Upc) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.pack_locked(&mut state, caller, upc)
        };
        self.commit(Action::PackFabric, caller, outcome).await
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    async fn sell_fabric(&self, caller: Identity, upc: Upc) -> Result<(), SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            self.sell_locked(&mut state, caller, upc)
        };
        self.commit(Action::SellFabric, caller, outcome).await
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    async fn buy_fabric(
        &self,
        caller: Identity,
        upc: Upc,
        payment: Amount,
    ) -> Result<SettlementReceipt, SupplyChainError> {
        // Settlement runs under the write lock so no other call can observe
        // or race the item between payment and the ownership change.
        let outcome = {
            let mut state = self.state.write().await;
            self.buy_locked(&mut state, caller, upc, payment).await
        };
        self.commit(Action::BuyFabric, caller, outcome).await
    }

    async fn fetch_fabric(&self, upc: Upc) -> Result<FabricRecord, SupplyChainError> {
        debug!(upc, "Fetching fabric");
        self.state.read().await.fabrics.load(upc).cloned()
    }

    async fn fetch_fabric_buffer_one(&self, upc: Upc) -> Result<FabricRecord, SupplyChainError> {
        self.fetch_fabric(upc).await
    }

    #[instrument(skip(self, caller, account), fields(caller = %caller, account = %account))]
    async fn grant_role(
        &self,
        caller: Identity,
        account: Identity,
        role: Role,
    ) -> Result<bool, SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            state.roles.grant(&caller, account, role).map(|granted| {
                let event = granted.then_some(SupplyChainEvent::RoleGranted {
                    account,
                    role,
                    granted_by: caller,
                });
                (granted, event)
            })
        };
        self.commit(Action::GrantRole, caller, outcome).await
    }

    #[instrument(skip(self, caller, account), fields(caller = %caller, account = %account))]
    async fn revoke_role(
        &self,
        caller: Identity,
        account: Identity,
        role: Role,
    ) -> Result<bool, SupplyChainError> {
        let outcome = {
            let mut state = self.state.write().await;
            state.roles.revoke(&caller, &account, role).map(|revoked| {
                let event = revoked.then_some(SupplyChainEvent::RoleRevoked {
                    account,
                    role,
                    revoked_by: caller,
                });
                (revoked, event)
            })
        };
        self.commit(Action::RevokeRole, caller, outcome).await
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    async fn renounce_role(&self, caller: Identity, role: Role) -> bool {
        let renounced = {
            let mut state = self.state.write().await;
            state.roles.renounce(&caller, role)
        };
        let event = renounced.then_some(SupplyChainEvent::RoleRevoked {
            account: caller,
            role,
            revoked_by: caller,
        });
        // Renouncing cannot be rejected.
        self.commit(Action::RenounceRole, caller, Ok((renounced, event)))
            .await
            .unwrap_or(renounced)
    }

    async fn has_role(&self, account: Identity, role: Role) -> bool {
        self.state.read().await.roles.has_role(&account, role)
    }

    async fn stats(&self) -> ServiceStats {
        self.stats.lock().clone()
    }
}
