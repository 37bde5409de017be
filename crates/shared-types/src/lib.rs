//! # Shared Types Crate
//!
//! Key and principal types used across the Fiber-Chain workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Identity`, `Upc` and `Role` are defined once
//!   here so the ledger, the event bus and the test suite agree on them.
//! - **Caller Identity Is Given**: an `Identity` arriving at the ledger has
//!   already been authenticated by the layer above; this crate never deals
//!   with keys or signatures.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
