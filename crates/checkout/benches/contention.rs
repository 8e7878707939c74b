use std::sync::{Arc, Barrier};

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use flashcart_cart::{CartStore, NewCartItem};
use flashcart_checkout::{CheckoutRequest, CheckoutService, CheckoutStrategy};
use flashcart_core::{CartId, DelayPolicy, Money, ProductId, UserId};
use flashcart_inventory::{InventoryStore, NewProduct};

const BUYERS: usize = 32;

/// One hot product, one single-line cart per buyer.
fn setup(stock: u32) -> (CheckoutService, ProductId, Vec<CheckoutRequest>) {
    let inventory = Arc::new(InventoryStore::new(DelayPolicy::none()));
    let carts = Arc::new(CartStore::new(DelayPolicy::none()));
    let product = inventory.insert(NewProduct {
        name: "Hot Item".into(),
        description: "Contended".into(),
        category: "Electronics".into(),
        price: Money::from_major(5),
        stock,
    });

    let requests = (0..BUYERS as u64)
        .map(|u| {
            let user = UserId::new(u);
            let cart = carts.create(user);
            carts
                .add_item_exclusive(
                    cart.id,
                    &NewCartItem {
                        product_id: product.id,
                        quantity: 1,
                        price: product.price,
                        name: product.name.clone(),
                    },
                )
                .unwrap();
            CheckoutRequest::new(cart.id, user)
        })
        .collect();

    let checkout = CheckoutService::new(inventory, carts, DelayPolicy::none());
    (checkout, product.id, requests)
}

fn run_parallel<F: Fn(usize) + Sync>(n: usize, f: F) {
    let barrier = Barrier::new(n);
    std::thread::scope(|s| {
        for i in 0..n {
            let barrier = &barrier;
            let f = &f;
            s.spawn(move || {
                barrier.wait();
                f(i);
            });
        }
    });
}

fn bench_checkout_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkout_contention");
    group.throughput(Throughput::Elements(BUYERS as u64));

    for strategy in [
        CheckoutStrategy::Unsynchronized,
        CheckoutStrategy::Safe,
        CheckoutStrategy::Optimistic,
        CheckoutStrategy::BatchReserve,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{strategy:?}")),
            &strategy,
            |b, &strategy| {
                b.iter_batched(
                    || setup(BUYERS as u32 / 2),
                    |(checkout, _, requests)| {
                        run_parallel(BUYERS, |i| {
                            let _ = checkout.create_order(strategy, &requests[i]);
                        });
                        checkout.stats()
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_flash_sale(c: &mut Criterion) {
    let mut group = c.benchmark_group("flash_sale");
    group.throughput(Throughput::Elements(BUYERS as u64));

    group.bench_function("protected_decrement", |b| {
        b.iter_batched(
            || setup(BUYERS as u32 / 4),
            |(checkout, product, _)| {
                run_parallel(BUYERS, |i| {
                    let _ = checkout.flash_sale_purchase(product, 1, UserId::new(i as u64));
                });
                checkout.stats()
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_cart_lookup(c: &mut Criterion) {
    let (checkout, _, requests) = setup(1);
    let ids: Vec<CartId> = requests.iter().map(|r| r.cart_id).collect();

    c.bench_function("cart_get_by_id", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % ids.len();
            checkout.carts().get_by_id(ids[i])
        });
    });
}

criterion_group!(benches, bench_checkout_strategies, bench_flash_sale, bench_cart_lookup);
criterion_main!(benches);
