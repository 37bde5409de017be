//! # Supply Chain Events
//!
//! Every committed ledger transition produces exactly one of these. Each
//! event names the affected UPC (or account, for registry events) and the
//! identity that performed the transition, so observers can rebuild
//! provenance history without re-reading ledger state.

use serde::{Deserialize, Serialize};
use shared_types::{Amount, Identity, ProductId, Role, Upc};

/// All events that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyChainEvent {
    // =========================================================================
    // ROLE REGISTRY
    // =========================================================================
    /// A role was granted to an account.
    RoleGranted {
        /// Account receiving the role.
        account: Identity,
        /// Granted role.
        role: Role,
        /// Registry owner who granted it.
        granted_by: Identity,
    },

    /// A role was revoked from, or renounced by, an account.
    RoleRevoked {
        /// Account losing the role.
        account: Identity,
        /// Revoked role.
        role: Role,
        /// Owner (revoke) or the account itself (renounce).
        revoked_by: Identity,
    },

    // =========================================================================
    // YARN LEDGER
    // =========================================================================
    /// Yarn item created in state Planted.
    YarnPlanted {
        /// Yarn UPC.
        upc: Upc,
        /// Originating textile.
        textile: Identity,
    },

    /// Yarn moved to Acquired.
    YarnAcquired {
        /// Yarn UPC.
        upc: Upc,
        /// Custodian textile.
        textile: Identity,
    },

    /// Yarn moved to Audited.
    YarnAudited {
        /// Yarn UPC.
        upc: Upc,
        /// Auditing quality checker.
        checker: Identity,
    },

    /// Yarn moved to Processed.
    YarnProcessed {
        /// Yarn UPC.
        upc: Upc,
        /// Custodian textile.
        textile: Identity,
    },

    // =========================================================================
    // FABRIC LEDGER
    // =========================================================================
    /// Fabric item created in state Created.
    FabricCreated {
        /// Fabric UPC.
        upc: Upc,
        /// Product identifier.
        product_id: ProductId,
        /// Creating producer.
        producer: Identity,
    },

    /// Fabric cut from one or more processed yarns.
    FabricCutted {
        /// Fabric UPC.
        upc: Upc,
        /// Yarn UPCs linked by this cut.
        yarns: Vec<Upc>,
        /// Custodian producer.
        producer: Identity,
    },

    /// Fabric produced and priced.
    FabricProduced {
        /// Fabric UPC.
        upc: Upc,
        /// Listing price.
        price: Amount,
        /// Custodian producer.
        producer: Identity,
    },

    /// Fabric certified.
    FabricCertified {
        /// Fabric UPC.
        upc: Upc,
        /// Certifying quality checker.
        checker: Identity,
    },

    /// Fabric packed.
    FabricPacked {
        /// Fabric UPC.
        upc: Upc,
        /// Custodian producer.
        producer: Identity,
    },

    /// Fabric listed for sale. Custody has not moved.
    FabricForSale {
        /// Fabric UPC.
        upc: Upc,
        /// Identity that listed the item.
        seller: Identity,
        /// Custodian at listing time.
        owner: Identity,
    },

    /// Fabric bought. Custody moved from `seller` to `buyer`.
    FabricPurchased {
        /// Fabric UPC.
        upc: Upc,
        /// New custodian.
        buyer: Identity,
        /// Previous custodian, paid `price`.
        seller: Identity,
        /// Amount settled to the seller.
        price: Amount,
        /// Amount returned to the buyer.
        refund: Amount,
    },
}

impl SupplyChainEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::RoleGranted { .. } | Self::RoleRevoked { .. } => EventTopic::Registry,
            Self::YarnPlanted { .. }
            | Self::YarnAcquired { .. }
            | Self::YarnAudited { .. }
            | Self::YarnProcessed { .. } => EventTopic::Yarn,
            Self::FabricCreated { .. }
            | Self::FabricCutted { .. }
            | Self::FabricProduced { .. }
            | Self::FabricCertified { .. }
            | Self::FabricPacked { .. }
            | Self::FabricForSale { .. }
            | Self::FabricPurchased { .. } => EventTopic::Fabric,
        }
    }

    /// Event name as observers know it.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoleGranted { .. } => "RoleGranted",
            Self::RoleRevoked { .. } => "RoleRevoked",
            Self::YarnPlanted { .. } => "YarnPlanted",
            Self::YarnAcquired { .. } => "YarnAcquired",
            Self::YarnAudited { .. } => "YarnAudited",
            Self::YarnProcessed { .. } => "YarnProcessed",
            Self::FabricCreated { .. } => "FabricCreated",
            Self::FabricCutted { .. } => "FabricCutted",
            Self::FabricProduced { .. } => "FabricProduced",
            Self::FabricCertified { .. } => "FabricCertified",
            Self::FabricPacked { .. } => "FabricPacked",
            Self::FabricForSale { .. } => "FabricForSale",
            Self::FabricPurchased { .. } => "FabricPurchased",
        }
    }

    /// The item UPC, or `None` for registry events.
    #[must_use]
    pub fn upc(&self) -> Option<Upc> {
        match self {
            Self::RoleGranted { .. } | Self::RoleRevoked { .. } => None,
            Self::YarnPlanted { upc, .. }
            | Self::YarnAcquired { upc, .. }
            | Self::YarnAudited { upc, .. }
            | Self::YarnProcessed { upc, .. }
            | Self::FabricCreated { upc, .. }
            | Self::FabricCutted { upc, .. }
            | Self::FabricProduced { upc, .. }
            | Self::FabricCertified { upc, .. }
            | Self::FabricPacked { upc, .. }
            | Self::FabricForSale { upc, .. }
            | Self::FabricPurchased { upc, .. } => Some(*upc),
        }
    }

    /// Identity that performed the transition.
    #[must_use]
    pub fn actor(&self) -> Identity {
        match self {
            Self::RoleGranted { granted_by, .. } => *granted_by,
            Self::RoleRevoked { revoked_by, .. } => *revoked_by,
            Self::YarnPlanted { textile, .. }
            | Self::YarnAcquired { textile, .. }
            | Self::YarnProcessed { textile, .. } => *textile,
            Self::YarnAudited { checker, .. } | Self::FabricCertified { checker, .. } => *checker,
            Self::FabricCreated { producer, .. }
            | Self::FabricCutted { producer, .. }
            | Self::FabricProduced { producer, .. }
            | Self::FabricPacked { producer, .. } => *producer,
            Self::FabricForSale { seller, .. } => *seller,
            Self::FabricPurchased { buyer, .. } => *buyer,
        }
    }

    /// JSON encoding for observers outside the process.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Role grants and revocations.
    Registry,
    /// Yarn lifecycle.
    Yarn,
    /// Fabric lifecycle.
    Fabric,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// UPCs to include. Empty means every UPC; registry events carry no UPC
    /// and are excluded by a non-empty list.
    pub upcs: Vec<Upc>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            upcs: Vec::new(),
        }
    }

    /// Create a filter for events about specific UPCs.
    #[must_use]
    pub fn for_upcs(upcs: Vec<Upc>) -> Self {
        Self {
            topics: Vec::new(),
            upcs,
        }
    }

    /// Narrow an existing filter to the given UPCs.
    #[must_use]
    pub fn with_upcs(mut self, upcs: Vec<Upc>) -> Self {
        self.upcs = upcs;
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SupplyChainEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let upc_match = self.upcs.is_empty()
            || event.upc().is_some_and(|upc| self.upcs.contains(&upc));

        topic_match && upc_match
    }
}
