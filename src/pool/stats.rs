//! Point-in-time pool statistics.

use std::time::Duration;

use serde::Serialize;

/// Snapshot of a pool's state for monitoring.
///
/// Produced by [`ConnectionPool::stats`](super::ConnectionPool::stats),
/// which reads every field under the pool lock so the counts are mutually
/// consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Configured upper bound on concurrently open connections.
    pub max_size: usize,
    /// Connections currently allocated from the connector (created minus
    /// permanently closed).
    pub connections: usize,
    /// Connections sitting in the idle queue.
    pub idle: usize,
    /// Configured checkout timeout.
    pub checkout_timeout: Duration,
    /// Configured idle timeout; `None` when idle connections are kept
    /// forever.
    pub idle_timeout: Option<Duration>,
    /// Configured reaping interval; `None` when the background reaper is
    /// disabled.
    pub reaping_frequency: Option<Duration>,
}

impl PoolStats {
    /// Connections currently checked out.
    pub fn in_use(&self) -> usize {
        self.connections - self.idle
    }

    /// Whether every permitted connection exists and is checked out.
    pub fn is_saturated(&self) -> bool {
        self.idle == 0 && self.connections >= self.max_size
    }
}
