//! # Domain Entities
//!
//! Ledger items and their read projections.

use super::value_objects::{FabricState, YarnState};
use serde::{Deserialize, Serialize};
use shared_types::{Amount, Identity, ProductId, Upc};

/// Where a yarn came from. Fixed at planting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YarnOrigin {
    /// Originating textile.
    pub textile_id: Identity,
    /// Textile display name.
    pub textile_name: String,
    /// Free-form description (location, farm).
    pub textile_information: String,
    /// Latitude as supplied.
    pub latitude: String,
    /// Longitude as supplied.
    pub longitude: String,
}

/// A yarn item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YarnItem {
    /// Item key.
    pub upc: Upc,
    /// Current custodian.
    pub owner_id: Identity,
    /// Provenance, immutable.
    pub origin: YarnOrigin,
    /// Set on Acquire.
    pub acquisition_notes: String,
    /// Set on Audit.
    pub audit_notes: String,
    /// Lifecycle state.
    pub state: YarnState,
}

impl YarnItem {
    /// A freshly planted yarn owned by `owner`.
    pub fn planted(upc: Upc, owner: Identity, origin: YarnOrigin) -> Self {
        Self {
            upc,
            owner_id: owner,
            origin,
            acquisition_notes: String::new(),
            audit_notes: String::new(),
            state: YarnState::Planted,
        }
    }

    /// Numeric state code.
    pub fn item_state(&self) -> u8 {
        self.state.code()
    }
}

/// A fabric item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricItem {
    /// Item key.
    pub upc: Upc,
    /// Product identifier, immutable.
    pub product_id: ProductId,
    /// Current custodian.
    pub owner_id: Identity,
    /// Yarns consumed by Cut, append-only.
    pub yarns: Vec<Upc>,
    /// Set on Produce.
    pub product_notes: String,
    /// Set on Produce, immutable afterwards.
    pub product_price: Amount,
    /// Set on Certify.
    pub certify_notes: String,
    /// Lifecycle state.
    pub state: FabricState,
}

impl FabricItem {
    /// A freshly created fabric owned by `owner`.
    pub fn created(upc: Upc, product_id: ProductId, owner: Identity) -> Self {
        Self {
            upc,
            product_id,
            owner_id: owner,
            yarns: Vec::new(),
            product_notes: String::new(),
            product_price: 0,
            certify_notes: String::new(),
            state: FabricState::Created,
        }
    }

    /// Numeric state code.
    pub fn item_state(&self) -> u8 {
        self.state.code()
    }
}

/// Complete yarn read result.
pub type YarnRecord = YarnItem;

/// Complete fabric read result. `fetch_fabric_buffer_one` returns the same.
pub type FabricRecord = FabricItem;

/// Identity and origin half of a yarn read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct YarnBufferOne {
    pub upc: Upc,
    pub owner_id: Identity,
    pub origin_textile_id: Identity,
    pub origin_textile_name: String,
    pub origin_textile_information: String,
    pub origin_textile_latitude: String,
    pub origin_textile_longitude: String,
}

impl From<&YarnItem> for YarnBufferOne {
    fn from(item: &YarnItem) -> Self {
        Self {
            upc: item.upc,
            owner_id: item.owner_id,
            origin_textile_id: item.origin.textile_id,
            origin_textile_name: item.origin.textile_name.clone(),
            origin_textile_information: item.origin.textile_information.clone(),
            origin_textile_latitude: item.origin.latitude.clone(),
            origin_textile_longitude: item.origin.longitude.clone(),
        }
    }
}

/// Notes and state half of a yarn read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct YarnBufferTwo {
    pub upc: Upc,
    pub acquisition_notes: String,
    pub audit_notes: String,
    pub item_state: u8,
}

impl From<&YarnItem> for YarnBufferTwo {
    fn from(item: &YarnItem) -> Self {
        Self {
            upc: item.upc,
            acquisition_notes: item.acquisition_notes.clone(),
            audit_notes: item.audit_notes.clone(),
            item_state: item.item_state(),
        }
    }
}
