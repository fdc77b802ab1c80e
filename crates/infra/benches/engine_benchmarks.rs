use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use stockpile_core::{LocationId, ProductId, UserId};
use stockpile_infra::{
    InMemoryCatalog, InMemoryInventoryStore, InMemoryNotifier, MutationEngine, ProductInfo, StockFilter,
    StockListQuery, StockListingEngine, StockSort, StockSortKey,
};
use stockpile_inventory::{AdjustKind, AdjustStock, ReceiveStock, StockKey};

struct Seeded {
    engine: MutationEngine<Arc<InMemoryInventoryStore>, Arc<InMemoryCatalog>, Arc<InMemoryNotifier>>,
    listing: StockListingEngine<Arc<InMemoryInventoryStore>, Arc<InMemoryCatalog>>,
    first: stockpile_core::StockId,
}

/// `products` products, each stocked at `locations` locations.
fn seed(products: usize, locations: usize) -> Seeded {
    let store = Arc::new(InMemoryInventoryStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let engine = MutationEngine::new(store.clone(), catalog.clone(), Arc::new(InMemoryNotifier::new()));

    let locations: Vec<LocationId> = (0..locations)
        .map(|i| {
            let id = LocationId::new();
            catalog.upsert_location(id, format!("Site {i}"));
            id
        })
        .collect();

    let mut first = None;
    for p in 0..products {
        let product = ProductId::new();
        catalog.upsert_product(
            ProductInfo::new(product, format!("Part {p}"), format!("P-{p:05}"))
                .with_brand(if p % 2 == 0 { "Acme" } else { "Bolter" })
                .with_thresholds(10, 500),
        );
        for (i, location) in locations.iter().enumerate() {
            let out = engine
                .receive(ReceiveStock {
                    key: StockKey::new(product, *location),
                    quantity: ((p * 7 + i * 13) % 600) as i64 + 1,
                    reason: "seed".to_string(),
                    notes: None,
                    performed_by: UserId::new(),
                    reference_id: None,
                })
                .expect("seed receipt");
            first.get_or_insert(out.record.id_typed());
        }
    }

    Seeded {
        engine,
        listing: StockListingEngine::new(store, catalog),
        first: first.expect("at least one record"),
    }
}

fn bench_adjust(c: &mut Criterion) {
    let seeded = seed(10, 2);
    let mut group = c.benchmark_group("mutation_engine");
    group.throughput(Throughput::Elements(1));
    group.bench_function("adjust_add", |b| {
        b.iter(|| {
            seeded
                .engine
                .adjust(black_box(AdjustStock {
                    stock_id: seeded.first,
                    kind: AdjustKind::Add,
                    quantity: 1,
                    reason: "bench".to_string(),
                    notes: None,
                    performed_by: UserId::new(),
                }))
                .expect("adjust")
        })
    });
    group.finish();
}

fn bench_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("stock_listing");
    for products in [100usize, 1_000] {
        let seeded = seed(products, 3);
        let rows = (products * 3) as u64;
        group.throughput(Throughput::Elements(rows));

        group.bench_with_input(BenchmarkId::new("search_sorted", rows), &rows, |b, _| {
            let query = StockListQuery {
                filter: StockFilter {
                    search: Some("part 1".to_string()),
                    brand: Some("acme".to_string()),
                    ..Default::default()
                },
                sort: StockSort {
                    key: StockSortKey::ProductName,
                    ..Default::default()
                },
                page: Some(1),
                page_size: Some(50),
            };
            b.iter(|| seeded.listing.list(black_box(&query)).expect("list"))
        });

        group.bench_with_input(BenchmarkId::new("status_counts", rows), &rows, |b, _| {
            b.iter(|| seeded.listing.status_counts().expect("counts"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_adjust, bench_listing);
criterion_main!(benches);
