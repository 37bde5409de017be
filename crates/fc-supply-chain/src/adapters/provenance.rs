//! # Provenance Indexer
//!
//! Bus observer that keeps an ordered per-item event history, so provenance
//! questions ("who handled fabric 7, and which yarns went into it?") are
//! answered without touching ledger state.

use crate::domain::EntityKind;
use parking_lot::RwLock;
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, Subscription, SupplyChainEvent};
use shared_types::{Identity, Upc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Per-item event history built from the bus.
#[derive(Debug, Default)]
pub struct ProvenanceIndexer {
    history: RwLock<HashMap<(EntityKind, Upc), Vec<SupplyChainEvent>>>,
    indexed: AtomicU64,
}

impl ProvenanceIndexer {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to item events and index them on a background task.
    ///
    /// The task ends when the bus is dropped.
    pub fn spawn(bus: &InMemoryEventBus) -> (Arc<Self>, JoinHandle<()>) {
        let indexer = Arc::new(Self::new());
        let subscription = bus.subscribe(Self::filter());
        let handle = tokio::spawn(Arc::clone(&indexer).run(subscription));
        (indexer, handle)
    }

    /// Item topics only; registry events carry no UPC.
    pub fn filter() -> EventFilter {
        EventFilter::topics(vec![EventTopic::Yarn, EventTopic::Fabric])
    }

    /// Index events until the subscription closes.
    pub async fn run(self: Arc<Self>, mut subscription: Subscription) {
        while let Some(event) = subscription.recv().await {
            self.record(event);
        }
        debug!(indexed = self.events_indexed(), "Provenance indexer stopped");
    }

    /// Index everything already buffered on `subscription`.
    pub fn index_pending(&self, subscription: &mut Subscription) -> usize {
        let events = subscription.drain();
        let count = events.len();
        for event in events {
            self.record(event);
        }
        count
    }

    /// Index one event. Registry events are ignored.
    pub fn record(&self, event: SupplyChainEvent) {
        let entity = match event.topic() {
            EventTopic::Yarn => EntityKind::Yarn,
            EventTopic::Fabric => EntityKind::Fabric,
            EventTopic::Registry | EventTopic::All => return,
        };
        let Some(upc) = event.upc() else {
            return;
        };
        trace!(event = event.name(), %entity, upc, "Indexing event");
        self.history
            .write()
            .entry((entity, upc))
            .or_default()
            .push(event);
        self.indexed.fetch_add(1, Ordering::Relaxed);
    }

    /// Ordered history for one item.
    pub fn history(&self, entity: EntityKind, upc: Upc) -> Vec<SupplyChainEvent> {
        self.history
            .read()
            .get(&(entity, upc))
            .cloned()
            .unwrap_or_default()
    }

    /// Yarns linked into a fabric, in cut order.
    pub fn yarns_of(&self, fabric_upc: Upc) -> Vec<Upc> {
        self.history(EntityKind::Fabric, fabric_upc)
            .into_iter()
            .filter_map(|event| match event {
                SupplyChainEvent::FabricCutted { yarns, .. } => Some(yarns),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Every identity that acted on an item, in order, without repeats in a row.
    pub fn handlers(&self, entity: EntityKind, upc: Upc) -> Vec<Identity> {
        let mut handlers: Vec<Identity> = Vec::new();
        for event in self.history(entity, upc) {
            let actor = event.actor();
            if handlers.last() != Some(&actor) {
                handlers.push(actor);
            }
        }
        handlers
    }

    /// Total item events indexed.
    pub fn events_indexed(&self) -> u64 {
        self.indexed.load(Ordering::Relaxed)
    }
}
