//! # Domain Errors
//!
//! Every rejection is detected before any mutation, so an error always means
//! the ledger is unchanged and no event was published.

use super::value_objects::{Action, EntityKind};
use shared_types::{Amount, Identity, Upc};
use thiserror::Error;

/// Supply chain error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupplyChainError {
    /// Caller lacks the required role, or is not the item owner.
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized {
        /// Calling identity
        caller: Identity,
        /// Attempted action
        action: Action,
    },

    /// Item is not in the state the transition starts from.
    #[error("Invalid state for {entity} {upc}: expected {expected}, found {actual}")]
    InvalidState {
        /// Entity kind
        entity: EntityKind,
        /// Item UPC
        upc: Upc,
        /// State the transition requires
        expected: String,
        /// Current state
        actual: String,
    },

    /// No item with this UPC.
    #[error("{entity} {upc} not found")]
    NotFound {
        /// Entity kind
        entity: EntityKind,
        /// Item UPC
        upc: Upc,
    },

    /// Creation with a UPC that is already taken.
    #[error("{entity} {upc} already exists")]
    AlreadyExists {
        /// Entity kind
        entity: EntityKind,
        /// Item UPC
        upc: Upc,
    },

    /// Buy payment below the listing price.
    #[error("Insufficient payment for fabric {upc}: price {price}, paid {paid}")]
    InsufficientPayment {
        /// Fabric UPC
        upc: Upc,
        /// Listing price
        price: Amount,
        /// Offered payment
        paid: Amount,
    },

    /// Cut references a yarn that is missing, unprocessed or already consumed.
    #[error("Invalid yarn reference {yarn_upc}: {reason}")]
    InvalidReference {
        /// Referenced yarn UPC
        yarn_upc: Upc,
        /// Why the reference was refused
        reason: String,
    },

    /// Malformed argument (zero UPC, empty yarn list).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payment settlement refused the Buy. Nothing was transferred.
    #[error("Payment failed: {0}")]
    PaymentFailed(#[from] SettlementError),
}

/// Settlement adapter errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Buyer balance does not cover the payment.
    #[error("Insufficient funds for {account}: balance {balance}, required {required}")]
    InsufficientFunds {
        /// Paying account
        account: Identity,
        /// Available balance
        balance: Amount,
        /// Payment amount
        required: Amount,
    },

    /// Instruction amounts do not reconcile.
    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    /// Settlement backend refused the transfer.
    #[error("Settlement rejected: {0}")]
    Rejected(String),

    /// A credit would push an account past `Amount::MAX`.
    #[error("Balance overflow for {account}")]
    BalanceOverflow {
        /// Account that could not be credited
        account: Identity,
    },
}

/// Coarse error classification for matching and metrics labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`SupplyChainError::Unauthorized`].
    Unauthorized,
    /// See [`SupplyChainError::InvalidState`].
    InvalidState,
    /// See [`SupplyChainError::NotFound`].
    NotFound,
    /// See [`SupplyChainError::AlreadyExists`].
    AlreadyExists,
    /// See [`SupplyChainError::InsufficientPayment`].
    InsufficientPayment,
    /// See [`SupplyChainError::InvalidReference`].
    InvalidReference,
    /// See [`SupplyChainError::InvalidInput`].
    InvalidInput,
    /// See [`SupplyChainError::PaymentFailed`].
    PaymentFailed,
}

impl ErrorKind {
    /// Stable snake_case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidState => "invalid_state",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::InsufficientPayment => "insufficient_payment",
            Self::InvalidReference => "invalid_reference",
            Self::InvalidInput => "invalid_input",
            Self::PaymentFailed => "payment_failed",
        }
    }
}

impl SupplyChainError {
    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::InsufficientPayment { .. } => ErrorKind::InsufficientPayment,
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::PaymentFailed(_) => ErrorKind::PaymentFailed,
        }
    }
}
