//! # Integration Tests
//!
//! Flows that cross crate boundaries: the gateway in `fc-supply-chain`,
//! events on `shared-bus`, settlement through the payment ledger adapter,
//! and the metrics in `fiber-telemetry`.

pub mod lifecycle_flows;
pub mod payment_flows;
pub mod provenance_flows;

use fc_supply_chain::prelude::*;

/// One identity per supply chain role, plus the registry owner.
#[derive(Debug, Clone, Copy)]
pub struct Participants {
    /// Registry owner.
    pub owner: Identity,
    /// Plants and processes yarn.
    pub textile: Identity,
    /// Creates fabric.
    pub producer: Identity,
    /// Audits yarn and certifies fabric.
    pub checker: Identity,
    /// Buys fabric.
    pub consumer: Identity,
}

impl Default for Participants {
    fn default() -> Self {
        Self {
            owner: Identity::from_low_u64(0xA0),
            textile: Identity::from_low_u64(0xA1),
            producer: Identity::from_low_u64(0xA2),
            checker: Identity::from_low_u64(0xA3),
            consumer: Identity::from_low_u64(0xA4),
        }
    }
}

/// Origin record for a yarn planted by `textile`.
pub fn origin(textile: Identity) -> YarnOrigin {
    YarnOrigin {
        textile_id: textile,
        textile_name: "Aurora Textile".to_string(),
        textile_information: "Bento Goncalves, RS".to_string(),
        latitude: "-29.1652".to_string(),
        longitude: "-51.5166".to_string(),
    }
}

/// Grant each participant their role.
pub async fn enrol<S: SupplyChainApi + ?Sized>(
    api: &S,
    p: &Participants,
) -> Result<(), SupplyChainError> {
    api.add_textile(p.owner, p.textile).await?;
    api.add_producer(p.owner, p.producer).await?;
    api.add_quality_checker(p.owner, p.checker).await?;
    api.add_consumer(p.owner, p.consumer).await?;
    Ok(())
}

/// Drive a yarn from Planted to Processed.
pub async fn processed_yarn<S: SupplyChainApi + ?Sized>(
    api: &S,
    p: &Participants,
    upc: Upc,
) -> Result<(), SupplyChainError> {
    api.plant_yarn(p.textile, upc, origin(p.textile)).await?;
    api.acquire_yarn(p.textile, upc, "bordo wine".to_string())
        .await?;
    api.audit_yarn(p.checker, upc, "ISO9002 audit passed".to_string())
        .await?;
    api.process_yarn(p.textile, upc).await
}

/// Drive a fabric cut from already processed `yarns` to ForSale.
pub async fn fabric_for_sale<S: SupplyChainApi + ?Sized>(
    api: &S,
    p: &Participants,
    upc: Upc,
    yarns: Vec<Upc>,
    price: Amount,
) -> Result<(), SupplyChainError> {
    api.create_fabric(p.producer, upc, upc + 1000).await?;
    api.cut_fabric_many(p.producer, upc, yarns).await?;
    api.produce_fabric(p.producer, upc, "Organic Yarn Fabric".to_string(), price)
        .await?;
    api.certify_fabric(p.checker, upc, "ISO9002 Certified".to_string())
        .await?;
    api.pack_fabric(p.producer, upc).await?;
    api.sell_fabric(p.producer, upc).await
}

/// Service over a funded payment ledger and a fresh bus, with roles granted.
pub async fn funded_service(
    p: &Participants,
    consumer_balance: Amount,
) -> (SupplyChainService<InMemoryPaymentLedger>, Arc<InMemoryEventBus>) {
    let bus = Arc::new(InMemoryEventBus::new());
    let ledger = InMemoryPaymentLedger::with_balances([(p.consumer, consumer_balance)]);
    let service = SupplyChainService::new(p.owner, SupplyChainConfig::default(), ledger, bus.clone());
    if let Err(e) = enrol(&service, p).await {
        panic!("enrolment failed: {e}");
    }
    (service, bus)
}
