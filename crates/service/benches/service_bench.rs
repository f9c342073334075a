use criterion::{Criterion, criterion_group, criterion_main};
use tokio_util::sync::CancellationToken;

use domain::{BookId, Money, OrderLinePayload, OrderPayload, Page, UserId};
use service::OrderService;
use store::MemoryStore;

fn payload_for(lines: &[(BookId, i32)]) -> OrderPayload {
    OrderPayload {
        lines: lines
            .iter()
            .map(|&(book_id, quantity)| OrderLinePayload { book_id, quantity })
            .collect(),
    }
}

fn bench_place_single_line_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_service/place_single_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = MemoryStore::default();
                let book = store.seed_book("9781449373320", "DDIA", Money::from_cents(5000));
                let service = OrderService::new(store.clone(), store);
                let ctx = CancellationToken::new();
                service
                    .create_order(&ctx, UserId::new(), &payload_for(&[(book.id, 2)]))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_place_three_line_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_service/place_three_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = MemoryStore::default();
                let a = store.seed_book("9781449373320", "DDIA", Money::from_cents(5000));
                let b2 = store.seed_book("9780201835953", "Man-Month", Money::from_cents(3000));
                let c2 = store.seed_book("9780262510875", "SICP", Money::from_cents(5400));
                let service = OrderService::new(store.clone(), store);
                let ctx = CancellationToken::new();
                service
                    .create_order(
                        &ctx,
                        UserId::new(),
                        &payload_for(&[(a.id, 1), (b2.id, 2), (c2.id, 3)]),
                    )
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_order_history_page(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = MemoryStore::default();
    let service = OrderService::new(store.clone(), store.clone());
    let ctx = CancellationToken::new();
    let user_id = UserId::new();

    // Pre-populate with 25 single-line orders
    rt.block_on(async {
        let book = store.seed_book("9781449373320", "DDIA", Money::from_cents(5000));
        for _ in 0..25 {
            service
                .create_order(&ctx, user_id, &payload_for(&[(book.id, 1)]))
                .await
                .unwrap();
        }
    });

    c.bench_function("order_service/history_page_of_10", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .order_history(&ctx, user_id, Page::new(10, 0))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_hash_password(c: &mut Criterion) {
    c.bench_function("auth/hash_password", |b| {
        b.iter(|| {
            service::auth::hash_password("correct horse battery staple").unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_place_single_line_order,
    bench_place_three_line_order,
    bench_order_history_page,
    bench_hash_password,
);
criterion_main!(benches);
