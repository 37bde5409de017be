//! # Yarn Ledger
//!
//! Yarn table. Mutators are crate-private: only the gateway applies them,
//! after it has checked role, custody and state. Each mutator takes the
//! state to land on from the transition rule it applies.

use super::entities::{YarnItem, YarnOrigin};
use super::errors::SupplyChainError;
use super::value_objects::{EntityKind, YarnState};
use shared_types::{Identity, Upc};
use std::collections::HashMap;

/// Yarn items keyed by UPC.
#[derive(Debug, Default, Clone)]
pub struct YarnLedger {
    items: HashMap<Upc, YarnItem>,
}

impl YarnLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a yarn.
    pub fn get(&self, upc: Upc) -> Option<&YarnItem> {
        self.items.get(&upc)
    }

    /// Look up a yarn, failing with `NotFound`.
    pub fn load(&self, upc: Upc) -> Result<&YarnItem, SupplyChainError> {
        self.items.get(&upc).ok_or(SupplyChainError::NotFound {
            entity: EntityKind::Yarn,
            upc,
        })
    }

    /// Is the UPC taken?
    pub fn contains(&self, upc: Upc) -> bool {
        self.items.contains_key(&upc)
    }

    /// Number of yarns.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No yarns yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn plant(
        &mut self,
        upc: Upc,
        owner: Identity,
        origin: YarnOrigin,
        to: YarnState,
    ) -> &YarnItem {
        self.items.entry(upc).or_insert_with(|| YarnItem {
            state: to,
            ..YarnItem::planted(upc, owner, origin)
        })
    }

    pub(crate) fn acquire(
        &mut self,
        upc: Upc,
        notes: String,
        to: YarnState,
    ) -> Result<(), SupplyChainError> {
        let item = self.item_mut(upc)?;
        item.acquisition_notes = notes;
        item.state = to;
        Ok(())
    }

    pub(crate) fn audit(
        &mut self,
        upc: Upc,
        notes: String,
        to: YarnState,
    ) -> Result<(), SupplyChainError> {
        let item = self.item_mut(upc)?;
        item.audit_notes = notes;
        item.state = to;
        Ok(())
    }

    pub(crate) fn process(&mut self, upc: Upc, to: YarnState) -> Result<(), SupplyChainError> {
        self.item_mut(upc)?.state = to;
        Ok(())
    }

    fn item_mut(&mut self, upc: Upc) -> Result<&mut YarnItem, SupplyChainError> {
        self.items.get_mut(&upc).ok_or(SupplyChainError::NotFound {
            entity: EntityKind::Yarn,
            upc,
        })
    }
}
