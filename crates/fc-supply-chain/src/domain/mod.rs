//! # Domain Module
//!
//! Core domain types for the provenance ledger.

pub mod entities;
pub mod errors;
pub mod fabric_ledger;
pub mod invariants;
pub mod roles;
pub mod transitions;
pub mod value_objects;
pub mod yarn_ledger;

pub use entities::*;
pub use errors::*;
pub use fabric_ledger::FabricLedger;
pub use invariants::*;
pub use roles::RoleRegistry;
pub use transitions::{SellPolicy, TransitionRule, TransitionTable};
pub use value_objects::*;
pub use yarn_ledger::YarnLedger;
