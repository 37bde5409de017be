//! # Fabric Ledger
//!
//! Fabric table plus the side table of consumed yarns. A yarn UPC may be
//! linked to at most one fabric, ever. As with yarns, each mutator lands on
//! the state its transition rule names.

use super::entities::FabricItem;
use super::errors::SupplyChainError;
use super::value_objects::{EntityKind, FabricState, YarnState};
use super::yarn_ledger::YarnLedger;
use shared_types::{Amount, Identity, ProductId, Upc};
use std::collections::HashMap;

/// Fabric items keyed by UPC.
#[derive(Debug, Default, Clone)]
pub struct FabricLedger {
    items: HashMap<Upc, FabricItem>,
    /// Yarn UPC → fabric UPC it was cut into.
    consumed: HashMap<Upc, Upc>,
}

impl FabricLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a fabric.
    pub fn get(&self, upc: Upc) -> Option<&FabricItem> {
        self.items.get(&upc)
    }

    /// Look up a fabric, failing with `NotFound`.
    pub fn load(&self, upc: Upc) -> Result<&FabricItem, SupplyChainError> {
        self.items.get(&upc).ok_or(SupplyChainError::NotFound {
            entity: EntityKind::Fabric,
            upc,
        })
    }

    /// Is the UPC taken?
    pub fn contains(&self, upc: Upc) -> bool {
        self.items.contains_key(&upc)
    }

    /// Number of fabrics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No fabrics yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fabric a yarn was cut into, if any.
    pub fn consumed_by(&self, yarn_upc: Upc) -> Option<Upc> {
        self.consumed.get(&yarn_upc).copied()
    }

    /// Check that every yarn exists, is Processed and is still unconsumed.
    pub fn validate_yarn_references(
        &self,
        yarns: &YarnLedger,
        batch: &[Upc],
    ) -> Result<(), SupplyChainError> {
        for &yarn_upc in batch {
            let reason = match yarns.get(yarn_upc) {
                None => Some("yarn does not exist".to_string()),
                Some(yarn) if yarn.state != YarnState::Processed => {
                    Some(format!("yarn is {:?}, not Processed", yarn.state))
                }
                Some(_) => self
                    .consumed_by(yarn_upc)
                    .map(|fabric| format!("already cut into fabric {fabric}")),
            };
            if let Some(reason) = reason {
                return Err(SupplyChainError::InvalidReference { yarn_upc, reason });
            }
        }
        Ok(())
    }

    pub(crate) fn create(
        &mut self,
        upc: Upc,
        product_id: ProductId,
        owner: Identity,
        to: FabricState,
    ) -> &FabricItem {
        self.items.entry(upc).or_insert_with(|| FabricItem {
            state: to,
            ..FabricItem::created(upc, product_id, owner)
        })
    }

    pub(crate) fn cut(
        &mut self,
        upc: Upc,
        batch: &[Upc],
        to: FabricState,
    ) -> Result<(), SupplyChainError> {
        let item = self.items.get_mut(&upc).ok_or(SupplyChainError::NotFound {
            entity: EntityKind::Fabric,
            upc,
        })?;
        item.yarns.extend_from_slice(batch);
        item.state = to;
        for &yarn_upc in batch {
            self.consumed.insert(yarn_upc, upc);
        }
        Ok(())
    }

    pub(crate) fn produce(
        &mut self,
        upc: Upc,
        notes: String,
        price: Amount,
        to: FabricState,
    ) -> Result<(), SupplyChainError> {
        let item = self.item_mut(upc)?;
        item.product_notes = notes;
        item.product_price = price;
        item.state = to;
        Ok(())
    }

    pub(crate) fn certify(
        &mut self,
        upc: Upc,
        notes: String,
        to: FabricState,
    ) -> Result<(), SupplyChainError> {
        let item = self.item_mut(upc)?;
        item.certify_notes = notes;
        item.state = to;
        Ok(())
    }

    pub(crate) fn pack(&mut self, upc: Upc, to: FabricState) -> Result<(), SupplyChainError> {
        self.item_mut(upc)?.state = to;
        Ok(())
    }

    pub(crate) fn list_for_sale(&mut self, upc: Upc, to: FabricState) -> Result<(), SupplyChainError> {
        self.item_mut(upc)?.state = to;
        Ok(())
    }

    pub(crate) fn purchase(
        &mut self,
        upc: Upc,
        buyer: Identity,
        to: FabricState,
    ) -> Result<(), SupplyChainError> {
        let item = self.item_mut(upc)?;
        item.owner_id = buyer;
        item.state = to;
        Ok(())
    }

    fn item_mut(&mut self, upc: Upc) -> Result<&mut FabricItem, SupplyChainError> {
        self.items.get_mut(&upc).ok_or(SupplyChainError::NotFound {
            entity: EntityKind::Fabric,
            upc,
        })
    }
}
