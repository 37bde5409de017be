//! # Value Objects
//!
//! Lifecycle states, entity kinds and the actions the gateway accepts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which table an item lives in. Yarn and Fabric UPCs are separate namespaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Raw yarn.
    Yarn,
    /// Fabric cut from processed yarn.
    Fabric,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yarn => f.write_str("yarn"),
            Self::Fabric => f.write_str("fabric"),
        }
    }
}

/// Yarn lifecycle.
///
/// ```text
/// Planted → Acquired → Audited → Processed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum YarnState {
    /// Registered by a textile.
    Planted = 0,
    /// Acquisition notes recorded.
    Acquired = 1,
    /// Inspected by a quality checker.
    Audited = 2,
    /// Ready to be cut into fabric. Terminal.
    Processed = 3,
}

impl YarnState {
    /// Numeric state code exposed by reads.
    #[must_use]
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// The single state that may follow this one.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Planted => Some(Self::Acquired),
            Self::Acquired => Some(Self::Audited),
            Self::Audited => Some(Self::Processed),
            Self::Processed => None,
        }
    }

    /// Check if this state can transition to another.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// No further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed)
    }
}

/// Fabric lifecycle.
///
/// ```text
/// Created → Cut → Produced → Certified → Packed → ForSale → Purchased
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum FabricState {
    /// Registered by a producer.
    Created = 0,
    /// Linked to one or more processed yarns.
    Cut = 1,
    /// Notes and price recorded.
    Produced = 2,
    /// Certified by a quality checker.
    Certified = 3,
    /// Packed by the producer.
    Packed = 4,
    /// Listed for sale.
    ForSale = 5,
    /// Bought by a consumer. Terminal.
    Purchased = 6,
}

impl FabricState {
    /// Numeric state code exposed by reads.
    #[must_use]
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// The single state that may follow this one.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Cut),
            Self::Cut => Some(Self::Produced),
            Self::Produced => Some(Self::Certified),
            Self::Certified => Some(Self::Packed),
            Self::Packed => Some(Self::ForSale),
            Self::ForSale => Some(Self::Purchased),
            Self::Purchased => None,
        }
    }

    /// Check if this state can transition to another.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// No further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Purchased)
    }
}

/// A state in either lifecycle, used by the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Yarn state.
    Yarn(YarnState),
    /// Fabric state.
    Fabric(FabricState),
}

impl Stage {
    /// Entity the stage belongs to.
    #[must_use]
    pub const fn entity(&self) -> EntityKind {
        match self {
            Self::Yarn(_) => EntityKind::Yarn,
            Self::Fabric(_) => EntityKind::Fabric,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yarn(state) => write!(f, "{state:?}"),
            Self::Fabric(state) => write!(f, "{state:?}"),
        }
    }
}

/// Every mutating operation the gateway accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Create a yarn item.
    PlantYarn,
    /// Planted → Acquired.
    AcquireYarn,
    /// Acquired → Audited.
    AuditYarn,
    /// Audited → Processed.
    ProcessYarn,
    /// Create a fabric item.
    CreateFabric,
    /// Created → Cut.
    CutFabric,
    /// Cut → Produced.
    ProduceFabric,
    /// Produced → Certified.
    CertifyFabric,
    /// Certified → Packed.
    PackFabric,
    /// Packed → ForSale.
    SellFabric,
    /// ForSale → Purchased.
    BuyFabric,
    /// Registry: add a role.
    GrantRole,
    /// Registry: remove a role from another account.
    RevokeRole,
    /// Registry: drop one of the caller's own roles.
    RenounceRole,
}

impl Action {
    /// Lifecycle actions, in pipeline order.
    pub const LIFECYCLE: [Action; 11] = [
        Action::PlantYarn,
        Action::AcquireYarn,
        Action::AuditYarn,
        Action::ProcessYarn,
        Action::CreateFabric,
        Action::CutFabric,
        Action::ProduceFabric,
        Action::CertifyFabric,
        Action::PackFabric,
        Action::SellFabric,
        Action::BuyFabric,
    ];

    /// Stable snake_case name, used as a metrics label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlantYarn => "plant_yarn",
            Self::AcquireYarn => "acquire_yarn",
            Self::AuditYarn => "audit_yarn",
            Self::ProcessYarn => "process_yarn",
            Self::CreateFabric => "create_fabric",
            Self::CutFabric => "cut_fabric",
            Self::ProduceFabric => "produce_fabric",
            Self::CertifyFabric => "certify_fabric",
            Self::PackFabric => "pack_fabric",
            Self::SellFabric => "sell_fabric",
            Self::BuyFabric => "buy_fabric",
            Self::GrantRole => "grant_role",
            Self::RevokeRole => "revoke_role",
            Self::RenounceRole => "renounce_role",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
