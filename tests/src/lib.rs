//! # Fiber-Chain Test Suite
//!
//! Unified test crate.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks
//! └── src/integration/  # Gateway, settlement and bus flows across crates
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fc-tests
//! cargo test -p fc-tests integration::payment_flows
//!
//! # Benchmarks
//! cargo bench -p fc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
