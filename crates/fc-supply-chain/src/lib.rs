//! # FC Supply Chain - Textile Provenance Ledger
//!
//! Tracks Yarn and Fabric items through fixed lifecycles. Every change goes
//! through a single role-gated transition gateway, and every committed
//! change is published as a [`shared_bus::SupplyChainEvent`].
//!
//! ## Lifecycles
//!
//! | Entity | States |
//! |--------|--------|
//! | Yarn | Planted → Acquired → Audited → Processed |
//! | Fabric | Created → Cut → Produced → Certified → Packed → ForSale → Purchased |
//!
//! Fabric is cut from Processed yarn. A yarn may be consumed by at most one
//! fabric.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One step forward at a time | `domain/transitions.rs` - `TransitionRule::check_stage()` |
//! | Only the gateway mutates | `domain/*_ledger.rs` - `pub(crate)` mutators |
//! | Role per transition | `domain/transitions.rs` - `TransitionTable::new()` |
//! | Custody moves only on Buy | `domain/fabric_ledger.rs` - `purchase()` |
//! | Payment covers price | `domain/invariants.rs` - `invariant_payment_covers_price()` |
//! | Yarn consumed once | `domain/fabric_ledger.rs` - `validate_yarn_references()` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose | Adapter |
//! |-------|---------|---------|
//! | `PaymentSettlement` | Buyer → seller transfer with refund | `InMemoryPaymentLedger` |
//! | `EventPublisher` | Event fan-out | `shared_bus::InMemoryEventBus` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use fc_supply_chain::prelude::*;
//!
//! let bus = Arc::new(InMemoryEventBus::new());
//! let service = SupplyChainService::new(owner, SupplyChainConfig::default(), ledger, bus);
//!
//! service.add_textile(owner, textile).await?;
//! service.plant_yarn(textile, 1, origin).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::{
        Action, EntityKind, ErrorKind, FabricItem, FabricRecord, FabricState, SellPolicy,
        SettlementError, Stage, SupplyChainError, YarnBufferOne, YarnBufferTwo, YarnItem,
        YarnOrigin, YarnRecord, YarnState,
    };

    // Ports
    pub use crate::ports::inbound::SupplyChainApi;
    pub use crate::ports::outbound::{
        PaymentSettlement, SettlementInstruction, SettlementReceipt,
    };

    // Adapters
    pub use crate::adapters::{InMemoryPaymentLedger, ProvenanceIndexer};

    // Service
    pub use crate::config::SupplyChainConfig;
    pub use crate::service::{ServiceStats, SupplyChainService};

    // Shared
    pub use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, SupplyChainEvent};
    pub use shared_types::{Amount, Identity, ProductId, Role, Upc};
    pub use std::sync::Arc;
}

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::SupplyChainConfig;
pub use domain::{SupplyChainError, YarnOrigin};
pub use ports::inbound::SupplyChainApi;
pub use service::{ServiceStats, SupplyChainService};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
