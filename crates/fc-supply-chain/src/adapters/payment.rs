//! # In-Memory Payment Ledger
//!
//! Account balances plus an escrow account. A settlement moves the buyer's
//! payment into escrow, pays `price` out to the seller and returns `refund`
//! to the buyer, so escrow ends where it started.

use crate::domain::SettlementError;
use crate::ports::outbound::{PaymentSettlement, SettlementInstruction, SettlementReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Amount, Identity};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct PaymentBook {
    balances: HashMap<Identity, Amount>,
    escrow: Amount,
    receipts: Vec<SettlementReceipt>,
    reject_reason: Option<String>,
}

impl PaymentBook {
    fn balance(&self, account: &Identity) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Add `amount` to the staged (or current) balance of `account`.
    fn stage_credit(
        &self,
        staged: &mut HashMap<Identity, Amount>,
        account: Identity,
        amount: Amount,
    ) -> Result<(), SettlementError> {
        let current = staged
            .get(&account)
            .copied()
            .unwrap_or_else(|| self.balance(&account));
        let next = current
            .checked_add(amount)
            .ok_or(SettlementError::BalanceOverflow { account })?;
        staged.insert(account, next);
        Ok(())
    }
}

/// Balance-tracking settlement adapter.
#[derive(Debug, Default)]
pub struct InMemoryPaymentLedger {
    book: Mutex<PaymentBook>,
}

impl InMemoryPaymentLedger {
    /// Empty ledger, every balance zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger seeded with balances.
    pub fn with_balances(balances: impl IntoIterator<Item = (Identity, Amount)>) -> Self {
        let ledger = Self::new();
        for (account, amount) in balances {
            ledger.deposit(account, amount);
        }
        ledger
    }

    /// Credit an account.
    pub fn deposit(&self, account: Identity, amount: Amount) {
        let mut book = self.book.lock();
        let balance = book.balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Current balance.
    pub fn balance_of(&self, account: &Identity) -> Amount {
        self.book.lock().balance(account)
    }

    /// Current escrow balance.
    pub fn escrow_balance(&self) -> Amount {
        self.book.lock().escrow
    }

    /// Make every settlement fail with `reason` until cleared with `None`.
    pub fn set_rejecting(&self, reason: Option<String>) {
        self.book.lock().reject_reason = reason;
    }

    /// Receipts of completed settlements, oldest first.
    pub fn receipts(&self) -> Vec<SettlementReceipt> {
        self.book.lock().receipts.clone()
    }
}

#[async_trait]
impl PaymentSettlement for InMemoryPaymentLedger {
    async fn settle(
        &self,
        instruction: SettlementInstruction,
    ) -> Result<SettlementReceipt, SettlementError> {
        let mut book = self.book.lock();

        if let Some(reason) = &book.reject_reason {
            warn!(upc = instruction.fabric_upc, %reason, "Settlement rejected");
            return Err(SettlementError::Rejected(reason.clone()));
        }

        if instruction.price.checked_add(instruction.refund) != Some(instruction.payment) {
            return Err(SettlementError::InvalidInstruction(format!(
                "payment {} != price {} + refund {}",
                instruction.payment, instruction.price, instruction.refund
            )));
        }

        let balance = book.balance(&instruction.buyer);
        if balance < instruction.payment {
            return Err(SettlementError::InsufficientFunds {
                account: instruction.buyer,
                balance,
                required: instruction.payment,
            });
        }

        // Stage every balance first; nothing is written unless all of it fits.
        let escrow_before = book.escrow;
        let escrow_peak = escrow_before.checked_add(instruction.payment).ok_or_else(|| {
            SettlementError::InvalidInstruction(format!(
                "escrow {} cannot hold payment {}",
                escrow_before, instruction.payment
            ))
        })?;
        let mut staged = HashMap::from([(instruction.buyer, balance - instruction.payment)]);
        book.stage_credit(&mut staged, instruction.seller, instruction.price)?;
        book.stage_credit(&mut staged, instruction.buyer, instruction.refund)?;
        let escrow_after = escrow_peak - instruction.price - instruction.refund;

        book.balances.extend(staged);
        book.escrow = escrow_after;

        let receipt = SettlementReceipt {
            fabric_upc: instruction.fabric_upc,
            paid_to_seller: instruction.price,
            refunded: instruction.refund,
            escrow_residual: escrow_after - escrow_before,
        };
        book.receipts.push(receipt.clone());

        debug!(
            upc = instruction.fabric_upc,
            buyer = %instruction.buyer,
            seller = %instruction.seller,
            price = instruction.price,
            refund = instruction.refund,
            "Settlement complete"
        );

        Ok(receipt)
    }
}
