//! # Provenance Flows
//!
//! The provenance indexer rebuilds item history from bus events alone.

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    /// Wait until the indexer has caught up with `expected` events.
    async fn settle(indexer: &ProvenanceIndexer, expected: u64) {
        timeout(Duration::from_secs(2), async {
            while indexer.events_indexed() < expected {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("indexer fell behind");
    }

    #[tokio::test]
    async fn test_fabric_history_from_bus() {
        let p = Participants::default();
        let (service, bus) = funded_service(&p, 100).await;
        let (indexer, _task) = ProvenanceIndexer::spawn(&bus);

        processed_yarn(&service, &p, 1).await.unwrap();
        processed_yarn(&service, &p, 2).await.unwrap();
        fabric_for_sale(&service, &p, 10, vec![1, 2], 26)
            .await
            .unwrap();
        service.buy_fabric(p.consumer, 10, 26).await.unwrap();
        settle(&indexer, 8 + 7).await;

        assert_eq!(indexer.yarns_of(10), vec![1, 2]);
        assert_eq!(
            indexer.handlers(EntityKind::Fabric, 10),
            vec![p.producer, p.checker, p.producer, p.consumer]
        );
        assert_eq!(
            indexer.handlers(EntityKind::Yarn, 2),
            vec![p.textile, p.checker, p.textile]
        );

        let history = indexer.history(EntityKind::Fabric, 10);
        assert_eq!(history.len(), 7);
        assert!(matches!(
            history.last(),
            Some(SupplyChainEvent::FabricPurchased { price: 26, .. })
        ));
    }

    #[tokio::test]
    async fn test_rejected_calls_leave_no_history() {
        let p = Participants::default();
        let (service, bus) = funded_service(&p, 0).await;
        let mut subscription = bus.subscribe(ProvenanceIndexer::filter());
        let indexer = ProvenanceIndexer::new();

        service.plant_yarn(p.textile, 3, origin(p.textile)).await.unwrap();
        let _ = service.plant_yarn(p.textile, 3, origin(p.textile)).await;
        let _ = service.audit_yarn(p.checker, 3, "too early".to_string()).await;
        let _ = service.acquire_yarn(p.producer, 3, "not mine".to_string()).await;

        assert_eq!(indexer.index_pending(&mut subscription), 1);
        assert_eq!(
            indexer.history(EntityKind::Yarn, 3),
            vec![SupplyChainEvent::YarnPlanted {
                upc: 3,
                textile: p.textile
            }]
        );
    }

    #[tokio::test]
    async fn test_registry_changes_not_indexed() {
        let p = Participants::default();
        let (service, bus) = funded_service(&p, 0).await;
        let mut subscription = bus.subscribe(ProvenanceIndexer::filter());
        let indexer = ProvenanceIndexer::new();

        service
            .add_consumer(p.owner, Identity::from_low_u64(0xC1))
            .await
            .unwrap();
        service.renounce_role(p.checker, Role::QualityChecker).await;

        assert_eq!(indexer.index_pending(&mut subscription), 0);
        assert_eq!(indexer.events_indexed(), 0);
    }
}
