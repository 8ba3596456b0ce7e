//! The pool core: bounded creation, FIFO idle reuse, reentrant per-thread
//! checkout, and blocking acquisition against a deadline.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::error::SqlPoolError;

use super::config::PoolConfig;
use super::connection::{Connect, PooledConnection};
use super::reaper::Reaper;
use super::stats::PoolStats;

/// An idle connection and the moment it went idle.
struct Idle<C> {
    conn: Arc<C>,
    since: Instant,
}

/// What a thread currently holds: its connection and the number of nested
/// checkouts outstanding. Present in the affinity map iff count >= 1.
struct Lease<C> {
    conn: Arc<C>,
    count: usize,
}

struct PoolState<C> {
    idle: VecDeque<Idle<C>>,
    leases: HashMap<ThreadId, Lease<C>>,
    created: usize,
}

/// State shared between the pool handle and the reaper thread. Everything
/// mutable lives behind the one mutex.
pub(super) struct Shared<M: Connect> {
    connector: M,
    config: PoolConfig,
    state: Mutex<PoolState<M::Connection>>,
    available: Condvar,
}

impl<M: Connect> Shared<M> {
    pub(super) fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn check_in(&self, thread: ThreadId) {
        let mut state = self.state.lock();
        match state.leases.get_mut(&thread) {
            None => return,
            Some(lease) if lease.count > 1 => {
                lease.count -= 1;
                return;
            }
            Some(_) => {}
        }
        if let Some(lease) = state.leases.remove(&thread) {
            state.idle.push_back(Idle {
                conn: lease.conn,
                since: Instant::now(),
            });
            self.available.notify_all();
        }
    }

    pub(super) fn reap_idle_connections(&self) -> usize {
        let Some(idle_timeout) = self.config.idle_timeout() else {
            return 0;
        };
        let mut state = self.state.lock();
        let before = state.idle.len();
        state.idle.retain(|idle| idle.since.elapsed() <= idle_timeout);
        let closed = before - state.idle.len();
        if closed > 0 {
            state.created -= closed;
            debug!(closed, open = state.created, "reaped idle connections");
            self.available.notify_all();
        }
        closed
    }

    fn close_idle_connections(&self) -> usize {
        let mut state = self.state.lock();
        let drained = state.idle.len();
        state.idle.clear();
        if drained > 0 {
            state.created -= drained;
            debug!(drained, open = state.created, "drained idle connections");
            self.available.notify_all();
        }
        drained
    }

    fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            max_size: self.config.pool_size(),
            connections: state.created,
            idle: state.idle.len(),
            checkout_timeout: self.config.checkout_timeout(),
            idle_timeout: self.config.idle_timeout(),
            reaping_frequency: self.config.reaping_frequency(),
        }
    }
}

/// A bounded, thread-aware pool of database connections.
///
/// At most `pool_size` connections exist at once. A thread that already
/// holds a connection gets the same one back from [`check_out`], so nested
/// acquisition scopes never deadlock against their own checkout. When the
/// pool is saturated, [`check_out`] blocks until a connection is checked in
/// or the checkout timeout elapses.
///
/// Blocked waiters are not served in strict arrival order: a thread that
/// calls [`check_out`] after a waiter blocked may take a freed slot or an
/// idle connection ahead of that waiter being woken. This relaxation is
/// deliberate; idle connections themselves are still reused FIFO.
///
/// Dropping the pool stops and joins the background reaper. Idle
/// connections close when the pool (and any outstanding guards) drop.
///
/// [`check_out`]: ConnectionPool::check_out
pub struct ConnectionPool<M: Connect> {
    shared: Arc<Shared<M>>,
    _reaper: Option<Reaper>,
}

impl<M: Connect> ConnectionPool<M> {
    /// Create a pool over the given connector. No connections are opened
    /// until first demanded.
    ///
    /// Spawns the background reaper unless `idle_timeout` or
    /// `reaping_frequency` is zero.
    ///
    /// # Errors
    /// Returns `SqlPoolError::ConfigError` if the configured pool size is
    /// zero, or `SqlPoolError::ConnectionError` if the reaper thread cannot
    /// be spawned.
    pub fn new(config: PoolConfig, connector: M) -> Result<Self, SqlPoolError> {
        if config.pool_size() == 0 {
            return Err(SqlPoolError::ConfigError(
                "pool size must be at least 1".to_string(),
            ));
        }
        let shared = Arc::new(Shared {
            connector,
            config,
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                leases: HashMap::new(),
                created: 0,
            }),
            available: Condvar::new(),
        });
        let reaper = Reaper::spawn(&shared)?;
        Ok(Self {
            shared,
            _reaper: reaper,
        })
    }

    /// Check a connection out for the calling thread.
    ///
    /// Reentrant: if this thread already holds a connection, its reentrancy
    /// count is bumped and the same connection is returned without blocking.
    /// Otherwise, under the pool lock: reuse the oldest idle connection, or
    /// create a new one while under capacity, or block until one is checked
    /// in. The wait is bounded by the checkout timeout as a single deadline
    /// across the whole retry loop; a spurious wakeup re-checks the deadline
    /// rather than starting a fresh window.
    ///
    /// # Errors
    /// [`SqlPoolError::ConnectionTimeout`] when the deadline elapses with
    /// the pool still saturated; [`SqlPoolError::ConnectionError`] when the
    /// connector fails.
    pub fn check_out(&self) -> Result<PooledConnection<'_, M>, SqlPoolError> {
        let thread = thread::current().id();
        let shared = &self.shared;
        let mut state = shared.state.lock();

        if let Some(lease) = state.leases.get_mut(&thread) {
            lease.count += 1;
            let conn = Arc::clone(&lease.conn);
            return Ok(PooledConnection::new(self, conn));
        }

        let deadline = Instant::now() + shared.config.checkout_timeout();
        loop {
            if let Some(idle) = state.idle.pop_front() {
                let conn = idle.conn;
                state.leases.insert(
                    thread,
                    Lease {
                        conn: Arc::clone(&conn),
                        count: 1,
                    },
                );
                return Ok(PooledConnection::new(self, conn));
            }

            if state.created < shared.config.pool_size() {
                // The connector runs under the pool lock, keeping the
                // capacity check and the creation atomic; setup is assumed
                // bounded and uninterruptible.
                let conn = match shared.connector.connect() {
                    Ok(conn) => Arc::new(conn),
                    Err(err) => return Err(SqlPoolError::ConnectionError(err)),
                };
                state.created += 1;
                debug!(
                    open = state.created,
                    max = shared.config.pool_size(),
                    "opened new pooled connection"
                );
                state.leases.insert(
                    thread,
                    Lease {
                        conn: Arc::clone(&conn),
                        count: 1,
                    },
                );
                return Ok(PooledConnection::new(self, conn));
            }

            if shared.available.wait_until(&mut state, deadline).timed_out()
                && state.idle.is_empty()
                && state.created >= shared.config.pool_size()
            {
                // A check_in can race the deadline; only fail once the
                // deadline has passed with the pool still saturated.
                let timeout = shared.config.checkout_timeout();
                warn!(
                    pool_size = shared.config.pool_size(),
                    ?timeout,
                    "checkout timed out"
                );
                return Err(SqlPoolError::ConnectionTimeout {
                    pool_size: shared.config.pool_size(),
                    timeout,
                });
            }
        }
    }

    /// Release one level of checkout held by the calling thread.
    ///
    /// When the last outstanding level is released, the connection goes to
    /// the back of the idle queue and blocked checkouts are woken. Calling
    /// this on a thread with no outstanding checkout is a no-op, so
    /// guarded-release callers may invoke it unconditionally. Guards call
    /// this on drop; manual calls are only for code managing release by
    /// hand.
    pub fn check_in(&self) {
        self.shared.check_in(thread::current().id());
    }

    /// Close idle connections that have exceeded the idle timeout, freeing
    /// their capacity. Returns how many were closed. No-op when the idle
    /// timeout is zero.
    pub fn reap_idle_connections(&self) -> usize {
        self.shared.reap_idle_connections()
    }

    /// Close every idle connection regardless of age. Checked-out
    /// connections are untouched. Returns how many were closed.
    pub fn close_idle_connections(&self) -> usize {
        self.shared.close_idle_connections()
    }

    /// A consistent point-in-time snapshot of the pool, read under the lock.
    pub fn stats(&self) -> PoolStats {
        self.shared.stats()
    }

    /// The configuration this pool was built with.
    pub fn config(&self) -> &PoolConfig {
        self.shared.config()
    }
}
