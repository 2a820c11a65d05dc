//! Idle reaper tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use respool::{Pool, PoolConfig, PoolError, ReapReport};
use respool_testing::MockFactory;

fn pool(factory: &MockFactory, config: PoolConfig) -> Pool<MockFactory> {
    Pool::new(factory.clone(), config).expect("valid pool config")
}

fn manual_sweeps(max_size: usize, idle_timeout: Duration) -> PoolConfig {
    PoolConfig::new()
        .max_size(max_size)
        .idle_timeout(idle_timeout)
        .reap_interval(None)
}

#[tokio::test(start_paused = true)]
async fn test_idle_expired_resource_is_reaped_and_replaced() {
    let factory = MockFactory::new();
    let pool = pool(&factory, manual_sweeps(5, Duration::from_secs(2)));

    let conn = pool.acquire().await.unwrap();
    pool.release(conn);
    assert_eq!(pool.stats().idle_count, 1);

    tokio::time::sleep(Duration::from_secs(3)).await;
    let report = pool.reap_idle().await;

    assert_eq!(
        report,
        ReapReport {
            reaped: 1,
            failed: 0,
            retained: 0
        }
    );
    let stats = pool.stats();
    assert_eq!(stats.idle_count, 0);
    assert_eq!(stats.created_total, 1);
    assert_eq!(factory.live(), 0);

    let _conn = pool.acquire().await.unwrap();
    assert_eq!(pool.stats().created_total, 2, "replacement must be created");
}

#[tokio::test(start_paused = true)]
async fn test_recently_released_resource_survives_sweep() {
    let factory = MockFactory::new();
    let pool = pool(&factory, manual_sweeps(5, Duration::from_secs(2)));

    drop(pool.acquire().await.unwrap());
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(pool.reap_idle().await.reaped, 0);
    assert_eq!(pool.stats().idle_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_idle_clock_restarts_on_release() {
    let factory = MockFactory::new();
    let pool = pool(&factory, manual_sweeps(1, Duration::from_secs(2)));

    drop(pool.acquire().await.unwrap());
    tokio::time::sleep(Duration::from_millis(1500)).await;
    drop(pool.acquire().await.unwrap());
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(pool.reap_idle().await.reaped, 0);
    assert_eq!(pool.stats().idle_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_in_use_resource_is_never_reaped() {
    let factory = MockFactory::new();
    let pool = pool(&factory, manual_sweeps(2, Duration::from_secs(2)));

    let held = pool.acquire().await.unwrap();
    drop(pool.acquire().await.unwrap());
    tokio::time::sleep(Duration::from_secs(10)).await;

    let report = pool.reap_idle().await;
    assert_eq!(report.reaped, 1);
    let stats = pool.stats();
    assert_eq!(stats.in_use_count, 1);
    assert_eq!(stats.idle_count, 0);
    assert_eq!(held.id, 1);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_reaps_resources_past_lifetime() {
    let factory = MockFactory::new();
    let config = manual_sweeps(2, Duration::from_secs(600)).max_lifetime(Some(Duration::from_secs(30)));
    let pool = pool(&factory, config);

    let conn = pool.acquire().await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;
    drop(conn);
    tokio::time::sleep(Duration::from_secs(15)).await;

    assert_eq!(pool.reap_idle().await.reaped, 1);
    assert_eq!(factory.live(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_background_reaper_sweeps_periodically() {
    let factory = MockFactory::new();
    let config = PoolConfig::new()
        .max_size(5)
        .idle_timeout(Duration::from_secs(2))
        .reap_interval(Some(Duration::from_millis(500)));
    let pool = pool(&factory, config);

    let conns = vec![
        pool.acquire().await.unwrap(),
        pool.acquire().await.unwrap(),
        pool.acquire().await.unwrap(),
    ];
    drop(conns);
    assert_eq!(pool.stats().idle_count, 3);

    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(pool.stats().idle_count, 0);
    assert_eq!(factory.live(), 0);
    assert_eq!(pool.metrics().resources_reaped, 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_destroy_is_retained_and_retried() {
    let factory = MockFactory::new();
    let pool = pool(&factory, manual_sweeps(1, Duration::from_secs(2)));

    drop(pool.acquire().await.unwrap());
    tokio::time::sleep(Duration::from_secs(3)).await;
    factory.fail_next_destroys(1);

    let report = pool.reap_idle().await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.retained, 1);
    assert_eq!(pool.stats().idle_count, 0);
    assert_eq!(pool.status().total, 1, "retained resource keeps its slot");

    // capacity is still accounted for
    let result = pool.acquire_timeout(Duration::ZERO).await;
    assert!(matches!(result, Err(PoolError::Exhausted { .. })));

    let report = pool.reap_idle().await;
    assert_eq!(report.reaped, 1);
    assert_eq!(report.retained, 0);
    assert_eq!(pool.status().total, 0);
    assert_eq!(factory.live(), 0);
    assert_eq!(pool.metrics().destroy_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_reaped_slot_goes_to_waiter() {
    let factory = MockFactory::new();
    let pool = pool(&factory, manual_sweeps(1, Duration::from_secs(2)));

    drop(pool.acquire().await.unwrap());
    tokio::time::sleep(Duration::from_secs(3)).await;
    factory.fail_next_destroys(1);
    assert_eq!(pool.reap_idle().await.retained, 1);

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move {
            pool.acquire_timeout(Duration::from_secs(10))
                .await
                .map(|conn| conn.id)
        })
    };
    assert!(respool_testing::wait_for_waiters(&pool, 1, Duration::from_secs(1)).await);

    pool.reap_idle().await;
    assert_eq!(waiter.await.unwrap().unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reaper_stops_on_close() {
    let factory = MockFactory::new();
    let config = PoolConfig::new()
        .max_size(2)
        .idle_timeout(Duration::from_secs(1))
        .reap_interval(Some(Duration::from_millis(100)));
    let pool = pool(&factory, config);

    drop(pool.acquire().await.unwrap());
    pool.close().await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(factory.live(), 0);
    assert_eq!(pool.metrics().resources_reaped, 0, "close destroys, reaper does not");
}

#[tokio::test(start_paused = true)]
async fn test_close_waits_for_sweep_in_progress() {
    let factory = MockFactory::new().with_destroy_delay(Duration::from_millis(100));
    let config = PoolConfig::new()
        .max_size(2)
        .idle_timeout(Duration::from_secs(1))
        .reap_interval(Some(Duration::from_secs(1)));
    let pool = pool(&factory, config);

    drop(pool.acquire().await.unwrap());
    // the sweep at 1s is now halfway through a 100ms destroy
    tokio::time::sleep(Duration::from_millis(1050)).await;
    pool.close().await;

    assert_eq!(factory.created(), 1);
    assert_eq!(factory.destroyed(), 1);
    assert_eq!(pool.metrics().resources_reaped, 1);
    assert_eq!(pool.status().total, 0);
}

#[tokio::test(start_paused = true)]
async fn test_close_destroys_resources_retained_by_sweep() {
    let factory = MockFactory::new().with_destroy_delay(Duration::from_millis(100));
    let config = PoolConfig::new()
        .max_size(1)
        .idle_timeout(Duration::from_secs(1))
        .reap_interval(Some(Duration::from_secs(1)));
    let pool = pool(&factory, config);

    drop(pool.acquire().await.unwrap());
    factory.fail_next_destroys(1);
    tokio::time::sleep(Duration::from_millis(1050)).await;
    pool.close().await;

    assert_eq!(factory.live(), 0);
    assert_eq!(pool.metrics().destroy_failures, 1);
    assert_eq!(pool.status().total, 0);
}

#[tokio::test(start_paused = true)]
async fn test_lifetime_expiry_counted_once_after_failed_destroy() {
    let factory = MockFactory::new();
    let config = PoolConfig::new()
        .max_size(1)
        .max_lifetime(Some(Duration::from_secs(5)))
        .reap_interval(None);
    let pool = pool(&factory, config);

    let conn = pool.acquire().await.unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;
    factory.fail_next_destroys(1);
    pool.release(conn);
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(pool.metrics().resources_reaped, 0);
    assert_eq!(pool.status().total, 1, "retained resource keeps its slot");

    let report = pool.reap_idle().await;
    assert_eq!(report.reaped, 1);
    assert_eq!(factory.live(), 0);
    assert_eq!(pool.metrics().resources_reaped, 1);
}
