//! # Fiber-Chain Lifecycle Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | yarn-lifecycle | Plant through Processed, one item per iteration |
//! | fabric-lifecycle | Create through Purchased including settlement |
//! | reads | Record fetches against a populated ledger |
//! | bus-fanout | Publish cost as subscribers grow |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fc_supply_chain::prelude::*;
use rand::Rng;
use shared_bus::EventPublisher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Runtime;

const OWNER: u64 = 0xA0;
const TEXTILE: u64 = 0xA1;
const PRODUCER: u64 = 0xA2;
const CHECKER: u64 = 0xA3;
const CONSUMER: u64 = 0xA4;

fn id(n: u64) -> Identity {
    Identity::from_low_u64(n)
}

fn runtime() -> Runtime {
    Runtime::new().expect("tokio runtime")
}

fn service(rt: &Runtime) -> SupplyChainService<InMemoryPaymentLedger> {
    let ledger = InMemoryPaymentLedger::with_balances([(id(CONSUMER), u64::MAX / 2)]);
    let bus = Arc::new(InMemoryEventBus::new());
    let service = SupplyChainService::new(id(OWNER), SupplyChainConfig::default(), ledger, bus);
    rt.block_on(async {
        service.add_textile(id(OWNER), id(TEXTILE)).await.unwrap();
        service.add_producer(id(OWNER), id(PRODUCER)).await.unwrap();
        service.add_quality_checker(id(OWNER), id(CHECKER)).await.unwrap();
        service.add_consumer(id(OWNER), id(CONSUMER)).await.unwrap();
    });
    service
}

async fn yarn_lifecycle(service: &SupplyChainService<InMemoryPaymentLedger>, upc: Upc) {
    let origin = YarnOrigin {
        textile_id: id(TEXTILE),
        textile_name: "Aurora Textile".to_string(),
        ..YarnOrigin::default()
    };
    service.plant_yarn(id(TEXTILE), upc, origin).await.unwrap();
    service
        .acquire_yarn(id(TEXTILE), upc, "lot".to_string())
        .await
        .unwrap();
    service
        .audit_yarn(id(CHECKER), upc, "passed".to_string())
        .await
        .unwrap();
    service.process_yarn(id(TEXTILE), upc).await.unwrap();
}

async fn fabric_lifecycle(service: &SupplyChainService<InMemoryPaymentLedger>, upc: Upc, yarn: Upc) {
    service.create_fabric(id(PRODUCER), upc, 1).await.unwrap();
    service.cut_fabric(id(PRODUCER), upc, yarn).await.unwrap();
    service
        .produce_fabric(id(PRODUCER), upc, "notes".to_string(), 26)
        .await
        .unwrap();
    service
        .certify_fabric(id(CHECKER), upc, "ok".to_string())
        .await
        .unwrap();
    service.pack_fabric(id(PRODUCER), upc).await.unwrap();
    service.sell_fabric(id(PRODUCER), upc).await.unwrap();
    service.buy_fabric(id(CONSUMER), upc, 30).await.unwrap();
}

// ============================================================================
// LIFECYCLES
// ============================================================================

fn bench_yarn_lifecycle(c: &mut Criterion) {
    let rt = runtime();
    let service = service(&rt);
    let next_upc = AtomicU64::new(1);
    let (service, next_upc) = (&service, &next_upc);

    let mut group = c.benchmark_group("yarn-lifecycle");
    group.throughput(Throughput::Elements(4));
    group.bench_function("plant_to_processed", |b| {
        b.to_async(&rt).iter(|| async move {
            let upc = next_upc.fetch_add(1, Ordering::Relaxed);
            yarn_lifecycle(service, upc).await;
        })
    });
    group.finish();
}

fn bench_fabric_lifecycle(c: &mut Criterion) {
    let rt = runtime();
    let service = service(&rt);
    let next_upc = AtomicU64::new(1);
    let (service, next_upc) = (&service, &next_upc);

    let mut group = c.benchmark_group("fabric-lifecycle");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(11));
    group.bench_function("plant_to_purchased", |b| {
        b.to_async(&rt).iter(|| async move {
            let upc = next_upc.fetch_add(1, Ordering::Relaxed);
            yarn_lifecycle(service, upc).await;
            fabric_lifecycle(service, upc, upc).await;
        })
    });
    group.finish();
}

// ============================================================================
// READS
// ============================================================================

fn bench_reads(c: &mut Criterion) {
    let rt = runtime();
    let service = &service(&rt);

    let mut group = c.benchmark_group("reads");
    for size in [100u64, 1_000, 10_000] {
        rt.block_on(async {
            let (yarns, _) = service.item_counts().await;
            for upc in (yarns as u64 + 1)..=size {
                yarn_lifecycle(service, upc).await;
            }
        });

        group.bench_with_input(BenchmarkId::new("fetch_yarn", size), &size, |b, &size| {
            b.to_async(&rt).iter(|| async move {
                let upc = rand::thread_rng().gen_range(1..=size);
                black_box(service.fetch_yarn(upc).await.unwrap())
            })
        });
    }
    group.finish();
}

// ============================================================================
// BUS
// ============================================================================

fn bench_bus_fanout(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("bus-fanout");

    for subscribers in [0usize, 1, 8, 32] {
        let bus = InMemoryEventBus::with_capacity(1 << 16);
        let _subscriptions: Vec<_> = (0..subscribers)
            .map(|_| bus.subscribe(EventFilter::all()))
            .collect();
        let bus = &bus;

        group.bench_with_input(
            BenchmarkId::new("publish", subscribers),
            &subscribers,
            |b, _| {
                b.to_async(&rt).iter(|| async move {
                    black_box(
                        bus.publish(SupplyChainEvent::YarnPlanted {
                            upc: 1,
                            textile: id(TEXTILE),
                        })
                        .await,
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_yarn_lifecycle,
    bench_fabric_lifecycle,
    bench_reads,
    bench_bus_fanout
);
criterion_main!(benches);
