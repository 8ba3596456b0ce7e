//! Pool configuration options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default upper bound on concurrently open connections.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Seconds a connection is kept unused in the pool before it is closed by
/// the reaper. Zero keeps idle connections forever.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Seconds to wait for a connection to become available before giving up
/// with a timeout error.
pub const DEFAULT_CHECKOUT_TIMEOUT_SECS: u64 = 5;

/// Seconds between background reaping passes.
pub const DEFAULT_REAPING_FREQUENCY_SECS: u64 = 60;

/// Configuration for a [`ConnectionPool`](super::ConnectionPool).
///
/// Field names match the options recognized from an application's database
/// configuration, so a deserialized config section can be handed to the pool
/// directly. All durations are whole seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of connections ever open at once (`pool` option).
    pool: usize,
    /// Seconds before an idle connection is closed; zero disables reaping.
    idle_timeout: u64,
    /// Seconds a checkout may block while the pool is saturated.
    checkout_timeout: u64,
    /// Seconds between reaping passes; zero disables the background reaper.
    reaping_frequency: u64,
}

impl PoolConfig {
    /// Create a configuration with the given maximum pool size and default
    /// timeouts.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool: pool_size,
            ..Self::default()
        }
    }

    /// Set the idle timeout in seconds. Zero keeps idle connections forever.
    pub fn with_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.idle_timeout = secs;
        self
    }

    /// Set the checkout timeout in seconds.
    pub fn with_checkout_timeout_secs(mut self, secs: u64) -> Self {
        self.checkout_timeout = secs;
        self
    }

    /// Set the interval between background reaping passes in seconds. Zero
    /// disables the background reaper; on-demand reaping still works.
    pub fn with_reaping_frequency_secs(mut self, secs: u64) -> Self {
        self.reaping_frequency = secs;
        self
    }

    /// Maximum number of connections the pool will ever have open at once.
    pub fn pool_size(&self) -> usize {
        self.pool
    }

    /// Idle timeout, or `None` when idle connections are kept forever.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout > 0).then(|| Duration::from_secs(self.idle_timeout))
    }

    /// How long a checkout may block while the pool is saturated.
    pub fn checkout_timeout(&self) -> Duration {
        Duration::from_secs(self.checkout_timeout)
    }

    /// Interval between background reaping passes, or `None` when the
    /// background reaper is disabled.
    pub fn reaping_frequency(&self) -> Option<Duration> {
        (self.reaping_frequency > 0).then(|| Duration::from_secs(self.reaping_frequency))
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_POOL_SIZE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT_SECS,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT_SECS,
            reaping_frequency: DEFAULT_REAPING_FREQUENCY_SECS,
        }
    }
}
