//! # Lifecycle Flows
//!
//! Full Yarn and Fabric lifecycles through the gateway, observed on the bus.
//!
//! ## Flow Tested:
//!
//! 1. Owner enrols one identity per role
//! 2. Textile plants yarn; checker audits; textile processes
//! 3. Producer cuts fabric from the yarn, prices, packs and lists it
//! 4. Consumer buys; custody moves and one event is published per step

#[cfg(test)]
mod tests {
    use super::super::*;
    use shared_bus::Subscription;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next_event(subscription: &mut Subscription) -> SupplyChainEvent {
        timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("timed out waiting for event")
            .expect("bus closed")
    }

    // =========================================================================
    // FULL LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_yarn_to_purchase_with_events() {
        let p = Participants::default();
        let (service, bus) = funded_service(&p, 1_000).await;
        let mut yarn_events = bus.subscribe(EventFilter::topics(vec![EventTopic::Yarn]));
        let mut fabric_events = bus.subscribe(EventFilter::topics(vec![EventTopic::Fabric]));

        processed_yarn(&service, &p, 1).await.unwrap();
        for expected in ["YarnPlanted", "YarnAcquired", "YarnAudited", "YarnProcessed"] {
            assert_eq!(next_event(&mut yarn_events).await.name(), expected);
        }

        fabric_for_sale(&service, &p, 10, vec![1], 26).await.unwrap();
        let receipt = service.buy_fabric(p.consumer, 10, 26).await.unwrap();
        assert_eq!(receipt.paid_to_seller, 26);

        let mut names = Vec::new();
        for _ in 0..7 {
            names.push(next_event(&mut fabric_events).await.name());
        }
        assert_eq!(
            names,
            vec![
                "FabricCreated",
                "FabricCutted",
                "FabricProduced",
                "FabricCertified",
                "FabricPacked",
                "FabricForSale",
                "FabricPurchased",
            ]
        );

        let fabric = service.fetch_fabric(10).await.unwrap();
        assert_eq!(fabric.owner_id, p.consumer);
        assert_eq!(fabric.state, FabricState::Purchased);
        assert_eq!(fabric.yarns, vec![1]);
        assert_eq!(service.fetch_yarn(1).await.unwrap().owner_id, p.textile);
        assert!(yarn_events.drain().is_empty(), "fabric steps leave yarn untouched");
    }

    #[tokio::test]
    async fn test_upc_filtered_subscription() {
        let p = Participants::default();
        let (service, bus) = funded_service(&p, 0).await;
        let mut only_two = bus.subscribe(EventFilter::for_upcs(vec![2]));

        service.plant_yarn(p.textile, 1, origin(p.textile)).await.unwrap();
        service.plant_yarn(p.textile, 2, origin(p.textile)).await.unwrap();
        service
            .acquire_yarn(p.textile, 1, "first lot".to_string())
            .await
            .unwrap();

        assert_eq!(
            next_event(&mut only_two).await,
            SupplyChainEvent::YarnPlanted {
                upc: 2,
                textile: p.textile
            }
        );
        assert!(only_two.drain().is_empty());
    }

    #[tokio::test]
    async fn test_events_serialize_for_external_observers() {
        let p = Participants::default();
        let (service, bus) = funded_service(&p, 0).await;
        let mut events = bus.subscribe(EventFilter::all());

        service.create_fabric(p.producer, 5, 77).await.unwrap();
        let json = next_event(&mut events).await.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["FabricCreated"]["upc"], 5);
        assert_eq!(value["FabricCreated"]["product_id"], 77);
    }

    // =========================================================================
    // REJECTIONS
    // =========================================================================

    #[tokio::test]
    async fn test_rejections_publish_nothing() {
        let p = Participants::default();
        let (service, bus) = funded_service(&p, 0).await;
        let mut events = bus.subscribe(EventFilter::all());

        let stranger = Identity::from_low_u64(0xFF);
        let attempts = [
            service.plant_yarn(stranger, 1, origin(stranger)).await,
            service.plant_yarn(p.textile, 0, origin(p.textile)).await,
            service.process_yarn(p.textile, 404).await,
            service.create_fabric(p.consumer, 1, 1).await,
        ];
        let kinds: Vec<_> = attempts
            .into_iter()
            .map(|r| r.unwrap_err().kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::Unauthorized,
                ErrorKind::InvalidInput,
                ErrorKind::NotFound,
                ErrorKind::Unauthorized,
            ]
        );
        assert!(events.drain().is_empty());
        assert_eq!(service.stats().await.total_rejected(), 4);
    }

    #[tokio::test]
    async fn test_fabric_needs_a_processed_yarn() {
        let p = Participants::default();
        let (service, _bus) = funded_service(&p, 0).await;
        service.plant_yarn(p.textile, 1, origin(p.textile)).await.unwrap();
        service.create_fabric(p.producer, 10, 1).await.unwrap();

        let err = service.cut_fabric(p.producer, 10, 1).await.unwrap_err();
        assert!(matches!(
            err,
            SupplyChainError::InvalidReference { yarn_upc: 1, .. }
        ));

        let err = service.cut_fabric(p.producer, 10, 2).await.unwrap_err();
        assert_eq!(
            err,
            SupplyChainError::InvalidReference {
                yarn_upc: 2,
                reason: "yarn does not exist".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_revoked_producer_loses_access() {
        let p = Participants::default();
        let (service, _bus) = funded_service(&p, 0).await;
        service.create_fabric(p.producer, 10, 1).await.unwrap();

        service
            .revoke_role(p.owner, p.producer, Role::Producer)
            .await
            .unwrap();
        assert!(!service.has_role(p.producer, Role::Producer).await);

        let err = service.cut_fabric(p.producer, 10, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            service.fetch_fabric(10).await.unwrap().owner_id,
            p.producer,
            "custody survives revocation"
        );
    }

    // =========================================================================
    // CONFIGURATION AND TELEMETRY
    // =========================================================================

    #[tokio::test]
    async fn test_config_from_json_drives_sell_policy() {
        let p = Participants::default();
        let config: SupplyChainConfig =
            serde_json::from_str(r#"{"sell_policy":"owner_only","event_bus_capacity":16}"#)
                .unwrap();
        let bus = Arc::new(config.build_event_bus());
        assert_eq!(bus.capacity(), 16);

        let service =
            SupplyChainService::new(p.owner, config, InMemoryPaymentLedger::new(), bus.clone());
        enrol(&service, &p).await.unwrap();
        processed_yarn(&service, &p, 1).await.unwrap();
        service.create_fabric(p.producer, 10, 1).await.unwrap();
        service.cut_fabric(p.producer, 10, 1).await.unwrap();
        service
            .produce_fabric(p.producer, 10, "notes".to_string(), 5)
            .await
            .unwrap();
        service
            .certify_fabric(p.checker, 10, "ok".to_string())
            .await
            .unwrap();
        service.pack_fabric(p.producer, 10).await.unwrap();

        let err = service.sell_fabric(p.consumer, 10).await.unwrap_err();
        assert_eq!(
            err,
            SupplyChainError::Unauthorized {
                caller: p.consumer,
                action: Action::SellFabric
            }
        );
    }

    #[tokio::test]
    async fn test_transitions_reach_prometheus() {
        let handle = fiber_telemetry::metrics::register_metrics().unwrap();
        let p = Participants::default();
        let (service, _bus) = funded_service(&p, 0).await;
        service.plant_yarn(p.textile, 1, origin(p.textile)).await.unwrap();
        let _ = service.plant_yarn(p.textile, 1, origin(p.textile)).await;

        let text = handle.gather().unwrap();
        assert!(text.contains("fc_transitions_applied_total"));
        assert!(text.contains(r#"action="plant_yarn""#));
        assert!(text.contains(r#"reason="already_exists""#));
    }
}
