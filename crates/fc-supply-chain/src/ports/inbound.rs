//! # Inbound Ports
//!
//! API trait defining what the provenance ledger can do. Every method takes
//! an already-authenticated caller identity.

use crate::domain::{
    FabricRecord, SupplyChainError, YarnBufferOne, YarnBufferTwo, YarnOrigin, YarnRecord,
};
use crate::ports::outbound::SettlementReceipt;
use crate::service::ServiceStats;
use async_trait::async_trait;
use shared_types::{Amount, Identity, ProductId, Role, Upc};

/// Supply chain API - inbound port.
#[async_trait]
pub trait SupplyChainApi: Send + Sync {
    // =========================================================================
    // YARN
    // =========================================================================

    /// Register a new yarn in state Planted, owned by the caller.
    async fn plant_yarn(
        &self,
        caller: Identity,
        upc: Upc,
        origin: YarnOrigin,
    ) -> Result<(), SupplyChainError>;

    /// Planted → Acquired.
    async fn acquire_yarn(
        &self,
        caller: Identity,
        upc: Upc,
        acquisition_notes: String,
    ) -> Result<(), SupplyChainError>;

    /// Acquired → Audited.
    async fn audit_yarn(
        &self,
        caller: Identity,
        upc: Upc,
        audit_notes: String,
    ) -> Result<(), SupplyChainError>;

    /// Audited → Processed.
    async fn process_yarn(&self, caller: Identity, upc: Upc) -> Result<(), SupplyChainError>;

    /// Complete yarn record.
    async fn fetch_yarn(&self, upc: Upc) -> Result<YarnRecord, SupplyChainError>;

    /// Identity and origin view.
    async fn fetch_yarn_buffer_one(&self, upc: Upc) -> Result<YarnBufferOne, SupplyChainError>;

    /// Notes and state view.
    async fn fetch_yarn_buffer_two(&self, upc: Upc) -> Result<YarnBufferTwo, SupplyChainError>;

    // =========================================================================
    // FABRIC
    // =========================================================================

    /// Register a new fabric in state Created, owned by the caller.
    async fn create_fabric(
        &self,
        caller: Identity,
        upc: Upc,
        product_id: ProductId,
    ) -> Result<(), SupplyChainError>;

    /// Created → Cut, consuming one processed yarn.
    async fn cut_fabric(
        &self,
        caller: Identity,
        fabric_upc: Upc,
        yarn_upc: Upc,
    ) -> Result<(), SupplyChainError>;

    /// Created → Cut, consuming several processed yarns at once.
    async fn cut_fabric_many(
        &self,
        caller: Identity,
        fabric_upc: Upc,
        yarn_upcs: Vec<Upc>,
    ) -> Result<(), SupplyChainError>;

    /// Cut → Produced, fixing notes and price.
    async fn produce_fabric(
        &self,
        caller: Identity,
        upc: Upc,
        product_notes: String,
        product_price: Amount,
    ) -> Result<(), SupplyChainError>;

    /// Produced → Certified.
    async fn certify_fabric(
        &self,
        caller: Identity,
        upc: Upc,
        certify_notes: String,
    ) -> Result<(), SupplyChainError>;

    /// Certified → Packed.
    async fn pack_fabric(&self, caller: Identity, upc: Upc) -> Result<(), SupplyChainError>;

    /// Packed → ForSale. Ownership does not change.
    async fn sell_fabric(&self, caller: Identity, upc: Upc) -> Result<(), SupplyChainError>;

    /// ForSale → Purchased. Settles payment and moves ownership to the caller.
    async fn buy_fabric(
        &self,
        caller: Identity,
        upc: Upc,
        payment: Amount,
    ) -> Result<SettlementReceipt, SupplyChainError>;

    /// Complete fabric record.
    async fn fetch_fabric(&self, upc: Upc) -> Result<FabricRecord, SupplyChainError>;

    /// Same record as [`SupplyChainApi::fetch_fabric`].
    async fn fetch_fabric_buffer_one(&self, upc: Upc) -> Result<FabricRecord, SupplyChainError>;

    // =========================================================================
    // ROLES
    // =========================================================================

    /// Grant a role (owner only). Returns `true` if newly granted.
    async fn grant_role(
        &self,
        caller: Identity,
        account: Identity,
        role: Role,
    ) -> Result<bool, SupplyChainError>;

    /// Revoke a role (owner only). Returns `true` if it was held.
    async fn revoke_role(
        &self,
        caller: Identity,
        account: Identity,
        role: Role,
    ) -> Result<bool, SupplyChainError>;

    /// Drop one of the caller's own roles. Returns `true` if it was held.
    async fn renounce_role(&self, caller: Identity, role: Role) -> bool;

    /// Does `account` hold `role`?
    async fn has_role(&self, account: Identity, role: Role) -> bool;

    /// Grant Textile.
    async fn add_textile(&self, caller: Identity, account: Identity) -> Result<bool, SupplyChainError> {
        self.grant_role(caller, account, Role::Textile).await
    }

    /// Grant Producer.
    async fn add_producer(&self, caller: Identity, account: Identity) -> Result<bool, SupplyChainError> {
        self.grant_role(caller, account, Role::Producer).await
    }

    /// Grant QualityChecker.
    async fn add_quality_checker(
        &self,
        caller: Identity,
        account: Identity,
    ) -> Result<bool, SupplyChainError> {
        self.grant_role(caller, account, Role::QualityChecker).await
    }

    /// Grant Consumer.
    async fn add_consumer(&self, caller: Identity, account: Identity) -> Result<bool, SupplyChainError> {
        self.grant_role(caller, account, Role::Consumer).await
    }

    /// Applied and rejected transition counts.
    async fn stats(&self) -> ServiceStats;
}
