//! # Shared Bus - Provenance Event Bus
//!
//! Carries the events the ledger emits after each committed transition to
//! any number of observers (indexers, UIs, audit sinks).
//!
//! ```text
//! ┌──────────────────┐   publish()   ┌──────────────┐  subscribe()  ┌───────────┐
//! │ TransitionGateway│ ────────────▶ │  Event Bus   │ ────────────▶ │ Observers │
//! └──────────────────┘  after commit └──────────────┘               └───────────┘
//! ```
//!
//! ## Rules
//!
//! - Events are published only after the ledger has committed the transition.
//! - Delivery is best-effort: a bus with no subscribers drops the event and
//!   the ledger is unaffected.
//! - Slow subscribers lag and skip events rather than blocking the ledger.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, SupplyChainEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
