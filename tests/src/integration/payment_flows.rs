//! # Payment Flows
//!
//! Buy through the gateway against a balance-tracking ledger.
//!
//! ## Properties Tested:
//!
//! - Seller receives exactly the price; any excess returns to the buyer
//! - A failed settlement leaves the fabric ForSale with no balance moved
//! - Concurrent buyers of one fabric settle exactly once

#[cfg(test)]
mod tests {
    use super::super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    type Listed = (
        Participants,
        SupplyChainService<InMemoryPaymentLedger>,
        Arc<InMemoryEventBus>,
    );

    /// Fabric 10, cut from yarn 1, listed at 26.
    async fn listed(consumer_balance: Amount) -> Listed {
        let p = Participants::default();
        let (service, bus) = funded_service(&p, consumer_balance).await;
        processed_yarn(&service, &p, 1).await.unwrap();
        fabric_for_sale(&service, &p, 10, vec![1], 26).await.unwrap();
        (p, service, bus)
    }

    // =========================================================================
    // SETTLEMENT
    // =========================================================================

    #[tokio::test]
    async fn test_exact_payment_settles() {
        let (p, service, _bus) = listed(100).await;
        service.buy_fabric(p.consumer, 10, 26).await.unwrap();

        let ledger = service.settlement();
        assert_eq!(ledger.balance_of(&p.consumer), 74);
        assert_eq!(ledger.balance_of(&p.producer), 26);
        assert_eq!(ledger.escrow_balance(), 0);
    }

    #[tokio::test]
    async fn test_overpayment_refunds_excess() {
        let (p, service, bus) = listed(100).await;
        let mut events = bus.subscribe(EventFilter::for_upcs(vec![10]));

        let receipt = service.buy_fabric(p.consumer, 10, 40).await.unwrap();
        assert_eq!(receipt.refunded, 14);
        assert_eq!(receipt.escrow_residual, 0);

        let ledger = service.settlement();
        assert_eq!(ledger.balance_of(&p.consumer), 74);
        assert_eq!(ledger.balance_of(&p.producer), 26);
        assert_eq!(
            events.drain(),
            vec![SupplyChainEvent::FabricPurchased {
                upc: 10,
                buyer: p.consumer,
                seller: p.producer,
                price: 26,
                refund: 14,
            }]
        );
    }

    #[tokio::test]
    async fn test_underpayment_never_reaches_ledger() {
        let (p, service, _bus) = listed(100).await;

        let err = service.buy_fabric(p.consumer, 10, 25).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPayment);
        assert!(service.settlement().receipts().is_empty());
        assert_eq!(service.settlement().balance_of(&p.consumer), 100);
    }

    #[tokio::test]
    async fn test_insufficient_funds_then_retry() {
        let (p, service, bus) = listed(10).await;
        let mut events = bus.subscribe(EventFilter::all());

        let err = service.buy_fabric(p.consumer, 10, 26).await.unwrap_err();
        assert_eq!(
            err,
            SupplyChainError::PaymentFailed(SettlementError::InsufficientFunds {
                account: p.consumer,
                balance: 10,
                required: 26,
            })
        );
        let fabric = service.fetch_fabric(10).await.unwrap();
        assert_eq!(fabric.state, FabricState::ForSale);
        assert_eq!(fabric.owner_id, p.producer);
        assert!(events.drain().is_empty());

        service.settlement().deposit(p.consumer, 16);
        service.buy_fabric(p.consumer, 10, 26).await.unwrap();
        assert_eq!(service.settlement().balance_of(&p.consumer), 0);
        assert_eq!(service.fetch_fabric(10).await.unwrap().owner_id, p.consumer);
    }

    #[tokio::test]
    async fn test_seller_overflow_keeps_listing_and_funds() {
        let (p, service, bus) = listed(100).await;
        service.settlement().deposit(p.producer, u64::MAX - 10);
        let mut events = bus.subscribe(EventFilter::all());

        let err = service.buy_fabric(p.consumer, 10, 26).await.unwrap_err();
        assert_eq!(
            err,
            SupplyChainError::PaymentFailed(SettlementError::BalanceOverflow {
                account: p.producer,
            })
        );

        let fabric = service.fetch_fabric(10).await.unwrap();
        assert_eq!(fabric.state, FabricState::ForSale);
        assert_eq!(fabric.owner_id, p.producer);
        assert_eq!(service.settlement().balance_of(&p.consumer), 100);
        assert_eq!(service.settlement().balance_of(&p.producer), u64::MAX - 10);
        assert!(service.settlement().receipts().is_empty());
        assert!(events.drain().is_empty());
    }

    #[tokio::test]
    async fn test_rejecting_ledger_keeps_listing() {
        let (p, service, _bus) = listed(100).await;
        service
            .settlement()
            .set_rejecting(Some("ledger offline".to_string()));

        let err = service.buy_fabric(p.consumer, 10, 26).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PaymentFailed);
        assert_eq!(
            service.stats().await.rejected_kind(ErrorKind::PaymentFailed),
            1
        );

        service.settlement().set_rejecting(None);
        service.buy_fabric(p.consumer, 10, 26).await.unwrap();
        assert_eq!(service.stats().await.payment_volume, 26);
    }

    #[tokio::test]
    async fn test_purchased_fabric_cannot_be_relisted() {
        let (p, service, _bus) = listed(100).await;
        service.buy_fabric(p.consumer, 10, 26).await.unwrap();

        let err = service.sell_fabric(p.consumer, 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    /// Settlement that yields before completing, so racing callers overlap.
    #[derive(Default)]
    struct SlowSettlement {
        calls: Mutex<Vec<SettlementInstruction>>,
    }

    #[async_trait]
    impl PaymentSettlement for SlowSettlement {
        async fn settle(
            &self,
            instruction: SettlementInstruction,
        ) -> Result<SettlementReceipt, SettlementError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let receipt = SettlementReceipt {
                fabric_upc: instruction.fabric_upc,
                paid_to_seller: instruction.price,
                refunded: instruction.refund,
                escrow_residual: 0,
            };
            self.calls.lock().push(instruction);
            Ok(receipt)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_buyers_settle_once() {
        let p = Participants::default();
        let bus = Arc::new(InMemoryEventBus::new());
        let service = Arc::new(SupplyChainService::new(
            p.owner,
            SupplyChainConfig::default(),
            SlowSettlement::default(),
            bus.clone(),
        ));
        enrol(service.as_ref(), &p).await.unwrap();
        processed_yarn(service.as_ref(), &p, 1).await.unwrap();
        fabric_for_sale(service.as_ref(), &p, 10, vec![1], 26)
            .await
            .unwrap();

        let buyers: Vec<Identity> = (0..8).map(|n| Identity::from_low_u64(0xB0 + n)).collect();
        for buyer in &buyers {
            service.add_consumer(p.owner, *buyer).await.unwrap();
        }

        let handles: Vec<_> = buyers
            .iter()
            .map(|&buyer| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { (buyer, service.buy_fabric(buyer, 10, 30).await) })
            })
            .collect();

        let mut winner = None;
        for handle in handles {
            let (buyer, result) = handle.await.unwrap();
            match result {
                Ok(receipt) => {
                    assert!(winner.is_none(), "two buyers won");
                    assert_eq!(receipt.refunded, 4);
                    winner = Some(buyer);
                }
                Err(e) => assert_eq!(e.kind(), ErrorKind::InvalidState),
            }
        }

        let winner = winner.expect("no buyer won");
        assert_eq!(service.fetch_fabric(10).await.unwrap().owner_id, winner);
        let calls = service.settlement().calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].buyer, winner);
        assert_eq!(calls[0].seller, p.producer);
    }
}
