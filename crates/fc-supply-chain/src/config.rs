//! Ledger configuration.

use crate::domain::SellPolicy;
use serde::{Deserialize, Serialize};
use shared_bus::{InMemoryEventBus, DEFAULT_CHANNEL_CAPACITY};
use std::env;
use tracing::warn;

/// Supply chain service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyChainConfig {
    /// Who may list packed fabric for sale.
    pub sell_policy: SellPolicy,
    /// Buffer size of the provenance bus built by [`Self::build_event_bus`].
    pub event_bus_capacity: usize,
}

impl Default for SupplyChainConfig {
    fn default() -> Self {
        Self {
            sell_policy: SellPolicy::default(),
            event_bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl SupplyChainConfig {
    /// Create configuration from environment variables.
    ///
    /// - `FC_SELL_POLICY`: `owner`, or comma-separated roles (default: producer,consumer)
    /// - `FC_EVENT_BUS_CAPACITY`: bus buffer size (default: 1000)
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("FC_SELL_POLICY").ok().as_deref(),
            env::var("FC_EVENT_BUS_CAPACITY").ok().as_deref(),
        )
    }

    fn from_values(sell_policy: Option<&str>, capacity: Option<&str>) -> Self {
        let defaults = Self::default();

        let sell_policy = match sell_policy.map(str::parse::<SellPolicy>) {
            None => defaults.sell_policy,
            Some(Ok(policy)) => policy,
            Some(Err(e)) => {
                warn!(error = %e, "Invalid FC_SELL_POLICY, using default");
                defaults.sell_policy
            }
        };

        let event_bus_capacity = match capacity.map(str::parse::<usize>) {
            None => defaults.event_bus_capacity,
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                warn!(value = ?capacity, "Invalid FC_EVENT_BUS_CAPACITY, using default");
                defaults.event_bus_capacity
            }
        };

        Self {
            sell_policy,
            event_bus_capacity,
        }
    }

    /// Builder: set the sell policy.
    #[must_use]
    pub fn with_sell_policy(mut self, policy: SellPolicy) -> Self {
        self.sell_policy = policy;
        self
    }

    /// Provenance bus sized by this configuration.
    pub fn build_event_bus(&self) -> InMemoryEventBus {
        InMemoryEventBus::with_capacity(self.event_bus_capacity)
    }
}
