//! # Domain Invariants
//!
//! Business rules checked by the gateway before any mutation.

use super::errors::SupplyChainError;
use super::value_objects::Stage;
use shared_types::{Amount, Upc};
use std::collections::HashSet;

/// Invariant: UPCs are positive.
pub fn invariant_positive_upc(upc: Upc) -> Result<(), SupplyChainError> {
    if upc == 0 {
        return Err(SupplyChainError::InvalidInput("UPC must be positive".into()));
    }
    Ok(())
}

/// Invariant: a transition advances exactly one step within one entity.
pub fn invariant_single_step(from: Stage, to: Stage) -> bool {
    match (from, to) {
        (Stage::Yarn(a), Stage::Yarn(b)) => a.can_transition_to(b),
        (Stage::Fabric(a), Stage::Fabric(b)) => a.can_transition_to(b),
        _ => false,
    }
}

/// Invariant: payment covers the listing price.
///
/// Returns the refund owed to the buyer.
pub fn invariant_payment_covers_price(
    upc: Upc,
    price: Amount,
    paid: Amount,
) -> Result<Amount, SupplyChainError> {
    paid.checked_sub(price)
        .ok_or(SupplyChainError::InsufficientPayment { upc, price, paid })
}

/// Invariant: a cut batch is non-empty, positive and free of duplicates.
pub fn invariant_yarn_batch(yarns: &[Upc]) -> Result<(), SupplyChainError> {
    if yarns.is_empty() {
        return Err(SupplyChainError::InvalidInput(
            "cut requires at least one yarn".into(),
        ));
    }
    let mut seen = HashSet::with_capacity(yarns.len());
    for &yarn_upc in yarns {
        invariant_positive_upc(yarn_upc)?;
        if !seen.insert(yarn_upc) {
            return Err(SupplyChainError::InvalidReference {
                yarn_upc,
                reason: "listed more than once".into(),
            });
        }
    }
    Ok(())
}
