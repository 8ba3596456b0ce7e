use std::sync::Arc;
use std::time::Duration;

use crate::error::SqlPoolError;
use crate::test_utils::TestConnector;

use super::config::PoolConfig;
use super::core::ConnectionPool;

fn pool_of(size: usize) -> (ConnectionPool<TestConnector>, TestConnector) {
    let connector = TestConnector::new();
    let config = PoolConfig::new(size).with_reaping_frequency_secs(0);
    let pool = ConnectionPool::new(config, connector.clone()).expect("pool config is valid");
    (pool, connector)
}

#[test]
fn nested_checkout_returns_the_same_connection() {
    let (pool, connector) = pool_of(2);

    let outer = pool.check_out().expect("first checkout");
    let inner = pool.check_out().expect("nested checkout");

    assert!(Arc::ptr_eq(outer.inner(), inner.inner()));
    assert_eq!(connector.created(), 1, "nesting must not create connections");
    assert_eq!(pool.stats().idle, 0);

    // The connection stays checked out until the last level releases.
    drop(inner);
    assert_eq!(pool.stats().idle, 0);
    drop(outer);
    assert_eq!(pool.stats().idle, 1);
}

#[test]
fn idle_connections_are_reused_fifo() {
    let (pool, connector) = pool_of(2);

    let first = pool.check_out().expect("checkout");
    let first_serial = first.serial();
    drop(first);

    let again = pool.check_out().expect("checkout after release");
    assert_eq!(again.serial(), first_serial);
    assert_eq!(connector.created(), 1);
}

#[test]
fn check_in_without_checkout_is_a_noop() {
    let (pool, _connector) = pool_of(2);

    pool.check_in();
    let stats = pool.stats();
    assert_eq!(stats.connections, 0);
    assert_eq!(stats.idle, 0);
}

#[test]
fn connector_failure_does_not_consume_capacity() {
    let (pool, connector) = pool_of(1);

    connector.fail_next();
    let err = pool.check_out().err().expect("injected failure propagates");
    assert!(matches!(err, SqlPoolError::ConnectionError(_)));
    assert_eq!(pool.stats().connections, 0);

    // The slot is still free afterwards.
    let conn = pool.check_out().expect("retry succeeds");
    assert_eq!(conn.serial(), 0);
    assert_eq!(pool.stats().connections, 1);
}

#[test]
fn zero_pool_size_is_rejected() {
    let err = ConnectionPool::new(PoolConfig::new(0), TestConnector::new())
        .err()
        .expect("zero-sized pool is invalid");
    assert!(matches!(err, SqlPoolError::ConfigError(_)));
}

#[test]
fn reap_is_a_noop_when_idle_timeout_is_zero() {
    let connector = TestConnector::new();
    let config = PoolConfig::new(1)
        .with_idle_timeout_secs(0)
        .with_reaping_frequency_secs(0);
    let pool = ConnectionPool::new(config, connector).expect("pool config is valid");

    drop(pool.check_out().expect("checkout"));
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(pool.reap_idle_connections(), 0);
    assert_eq!(pool.stats().idle, 1);
}

#[test]
fn on_demand_reap_frees_capacity() {
    let connector = TestConnector::new();
    let config = PoolConfig::new(1)
        .with_idle_timeout_secs(1)
        .with_reaping_frequency_secs(0);
    let pool = ConnectionPool::new(config, connector.clone()).expect("pool config is valid");

    drop(pool.check_out().expect("checkout"));
    assert_eq!(pool.reap_idle_connections(), 0, "not idle long enough yet");

    std::thread::sleep(Duration::from_millis(1200));
    assert_eq!(pool.reap_idle_connections(), 1);
    let stats = pool.stats();
    assert_eq!(stats.connections, 0);
    assert_eq!(stats.idle, 0);

    // Freed capacity is reused by creating a fresh connection.
    let conn = pool.check_out().expect("checkout after reap");
    assert_eq!(conn.serial(), 1);
    assert_eq!(connector.created(), 2);
}

#[test]
fn close_idle_connections_drains_regardless_of_age() {
    let (pool, _connector) = pool_of(2);

    drop(pool.check_out().expect("checkout"));
    assert_eq!(pool.close_idle_connections(), 1);
    let stats = pool.stats();
    assert_eq!(stats.connections, 0);
    assert_eq!(stats.idle, 0);
}

#[test]
fn stats_reflect_config_and_counts() {
    let connector = TestConnector::new();
    let config = PoolConfig::new(3)
        .with_checkout_timeout_secs(7)
        .with_idle_timeout_secs(0)
        .with_reaping_frequency_secs(0);
    let pool = ConnectionPool::new(config, connector).expect("pool config is valid");

    let held = pool.check_out().expect("checkout");
    let stats = pool.stats();
    assert_eq!(stats.max_size, 3);
    assert_eq!(stats.connections, 1);
    assert_eq!(stats.idle, 0);
    assert_eq!(stats.in_use(), 1);
    assert_eq!(stats.checkout_timeout, Duration::from_secs(7));
    assert_eq!(stats.idle_timeout, None);
    assert_eq!(stats.reaping_frequency, None);
    assert!(!stats.is_saturated());
    drop(held);
}

#[test]
fn config_defaults_match_documented_values() {
    let config = PoolConfig::default();
    assert_eq!(config.pool_size(), 5);
    assert_eq!(config.checkout_timeout(), Duration::from_secs(5));
    assert_eq!(config.idle_timeout(), Some(Duration::from_secs(300)));
    assert_eq!(config.reaping_frequency(), Some(Duration::from_secs(60)));
}

#[test]
fn config_deserializes_partial_options() {
    let config: PoolConfig =
        serde_json::from_str(r#"{"pool": 2, "checkout_timeout": 1}"#).expect("valid options");
    assert_eq!(config.pool_size(), 2);
    assert_eq!(config.checkout_timeout(), Duration::from_secs(1));
    assert_eq!(config.idle_timeout(), Some(Duration::from_secs(300)));
    assert_eq!(config.reaping_frequency(), Some(Duration::from_secs(60)));
}
