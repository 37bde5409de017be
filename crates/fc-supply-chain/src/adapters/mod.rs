//! # Adapters
//!
//! Concrete implementations of the outbound ports, plus bus observers.

pub mod payment;
pub mod provenance;

pub use payment::InMemoryPaymentLedger;
pub use provenance::ProvenanceIndexer;
