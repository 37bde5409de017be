//! # Outbound Ports
//!
//! Payment settlement used by Buy.

use crate::domain::SettlementError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{Amount, Identity, Upc};

/// Transfer instruction for one Buy.
///
/// `payment == price + refund` always holds for instructions built by the
/// gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInstruction {
    /// Fabric being bought.
    pub fabric_upc: Upc,
    /// Paying account.
    pub buyer: Identity,
    /// Previous owner, receives `price`.
    pub seller: Identity,
    /// Amount offered by the buyer.
    pub payment: Amount,
    /// Listing price.
    pub price: Amount,
    /// Excess returned to the buyer.
    pub refund: Amount,
}

/// Result of a completed settlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// Fabric bought.
    pub fabric_upc: Upc,
    /// Amount credited to the seller.
    pub paid_to_seller: Amount,
    /// Amount returned to the buyer.
    pub refunded: Amount,
    /// Escrow balance left over from this settlement.
    pub escrow_residual: Amount,
}

/// Payment settlement - outbound port.
///
/// A settlement is all-or-nothing: on error no balance has moved.
#[async_trait]
pub trait PaymentSettlement: Send + Sync {
    /// Move `price` from buyer to seller and return `refund` to the buyer.
    async fn settle(
        &self,
        instruction: SettlementInstruction,
    ) -> Result<SettlementReceipt, SettlementError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock settlement that records instructions and moves nothing.
#[derive(Default)]
pub struct MockSettlement {
    /// Should fail?
    pub should_fail: bool,
    settled: Mutex<Vec<SettlementInstruction>>,
}

impl MockSettlement {
    /// Mock that refuses every instruction.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Instructions settled so far.
    pub fn settled(&self) -> Vec<SettlementInstruction> {
        self.settled.lock().clone()
    }
}

#[async_trait]
impl PaymentSettlement for MockSettlement {
    async fn settle(
        &self,
        instruction: SettlementInstruction,
    ) -> Result<SettlementReceipt, SettlementError> {
        if self.should_fail {
            return Err(SettlementError::Rejected("Mock failure".to_string()));
        }
        let receipt = SettlementReceipt {
            fabric_upc: instruction.fabric_upc,
            paid_to_seller: instruction.price,
            refunded: instruction.refund,
            escrow_residual: 0,
        };
        self.settled.lock().push(instruction);
        Ok(receipt)
    }
}
