//! Pool turnover and idle expiry example.
//!
//! This example drives a small pool with many short units of work, then lets
//! it sit idle until the reaper empties it.
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=respool=debug cargo run -p respool --example pool_turnover
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use respool::{Pool, PoolConfig, PoolError};
use respool_testing::MockFactory;
use tokio::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let props = std::env::var("POOL_PROPERTIES")
        .unwrap_or_else(|_| "max-size=5;idle-timeout=2;reap-interval=500ms".into());
    let config = PoolConfig::from_properties(&props)?;

    println!("=== Resource Pool Turnover Example ===\n");
    println!("Pool configuration:");
    println!("  Max size: {}", config.max_size);
    println!("  Idle timeout: {:?}", config.idle_timeout);
    println!("  Reap interval: {:?}", config.reap_interval);
    println!();

    let factory = MockFactory::new();
    let pool = Arc::new(Pool::new(factory.clone(), config)?);

    // 1. Turnover: far more units of work than resources
    println!("1. Turnover (2000 units of work, 5 at a time):");
    let start = Instant::now();
    let mut handles = vec![];
    for _ in 0..5 {
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            for _ in 0..400 {
                pool.with_resource(|conn| Box::pin(async move { Ok::<_, PoolError>(conn.query().await) }))
                    .await?;
            }
            Ok::<_, PoolError>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }
    println!("  Completed in {:?}", start.elapsed());
    print_pool_status(&pool, &factory);

    // 2. Exhaustion: hold everything, then ask for one more
    println!("\n2. Exhaustion:");
    let mut held = vec![];
    for _ in 0..pool.config().max_size {
        held.push(pool.acquire().await?);
    }
    match pool.acquire_timeout(Duration::from_millis(100)).await {
        Err(e) => println!("  Extra acquire failed as expected: {e}"),
        Ok(_) => println!("  Extra acquire unexpectedly succeeded"),
    }
    drop(held);

    // 3. Idle expiry
    println!("\n3. Idle expiry:");
    let wait = pool.config().idle_timeout + Duration::from_secs(1);
    println!("  Sleeping {wait:?}...");
    tokio::time::sleep(wait).await;
    print_pool_status(&pool, &factory);

    print_pool_metrics(&pool);

    println!("\n4. Graceful shutdown:");
    pool.close().await;
    println!("  Pool closed, {} connections live.", factory.live());

    Ok(())
}

fn print_pool_status(pool: &Pool<MockFactory>, factory: &MockFactory) {
    let stats = pool.stats();
    let status = pool.status();
    println!(
        "  Status: {} idle, {} in use, {} created, {} live ({:.1}% utilization)",
        stats.idle_count,
        stats.in_use_count,
        stats.created_total,
        factory.live(),
        status.utilization()
    );
}

fn print_pool_metrics(pool: &Pool<MockFactory>) {
    let metrics = pool.metrics();
    println!("  Metrics:");
    println!("    Resources created: {}", metrics.resources_created);
    println!("    Resources reaped: {}", metrics.resources_reaped);
    println!("    Hand-offs: {}", metrics.handoffs);
    println!(
        "    Checkout success rate: {:.2}%",
        metrics.checkout_success_rate() * 100.0
    );
}
