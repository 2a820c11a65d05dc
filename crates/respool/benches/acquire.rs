//! Benchmarks for pool checkout and return.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use respool::Pool;
use respool_testing::MockFactory;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

/// Benchmark a single uncontended acquire/release cycle on a warm pool.
fn bench_uncontended(c: &mut Criterion) {
    let rt = runtime();
    let pool = rt.block_on(async {
        let pool = Pool::builder(MockFactory::new())
            .max_size(4)
            .reap_interval(None)
            .test_on_checkout(false)
            .build()
            .unwrap();
        drop(pool.acquire().await.unwrap());
        pool
    });

    c.bench_function("acquire_release_warm", |b| {
        b.to_async(&rt).iter(|| async {
            let conn = pool.acquire().await.unwrap();
            black_box(conn.id);
        })
    });
}

/// Benchmark 16 tasks sharing 4 resources.
fn bench_contended(c: &mut Criterion) {
    let rt = runtime();
    let pool = Arc::new(
        Pool::builder(MockFactory::new())
            .max_size(4)
            .reap_interval(None)
            .test_on_checkout(false)
            .build()
            .unwrap(),
    );

    let mut group = c.benchmark_group("contended");
    group.bench_function("16_tasks_4_resources", |b| {
        b.to_async(&rt).iter(|| {
            let pool = Arc::clone(&pool);
            async move {
                let mut handles = Vec::with_capacity(16);
                for _ in 0..16 {
                    let pool = Arc::clone(&pool);
                    handles.push(tokio::spawn(async move {
                        let mut conn = pool.acquire().await.unwrap();
                        black_box(conn.query().await);
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_uncontended, bench_contended);
criterion_main!(benches);
