//! Thin execution wrapper guaranteeing checkout/check-in pairing.

use std::sync::Arc;

use crate::error::SqlPoolError;
use crate::pool::{Connect, ConnectionPool};

/// Database access wrapper over a shared [`ConnectionPool`].
///
/// Callers hand [`execute`](Database::execute) a unit of work; the wrapper
/// checks a connection out, runs the work, and releases the checkout on
/// every exit path. Cloning is cheap and shares the pool.
pub struct Database<M: Connect> {
    pool: Arc<ConnectionPool<M>>,
}

impl<M: Connect> Database<M> {
    pub fn new(pool: Arc<ConnectionPool<M>>) -> Self {
        Self { pool }
    }

    /// The pool backing this wrapper.
    pub fn pool(&self) -> &Arc<ConnectionPool<M>> {
        &self.pool
    }

    /// Run `work` with a pooled connection.
    ///
    /// The checkout is released exactly once however `work` exits: normal
    /// return, error return, or unwinding panic (the guard releases during
    /// unwind, then the panic continues). Errors from `work` propagate
    /// unchanged; the pool's bookkeeping stays consistent either way.
    ///
    /// Reentrant: work that calls back into this wrapper (or the pool) on
    /// the same thread receives the same connection.
    ///
    /// # Errors
    /// [`SqlPoolError::ConnectionTimeout`] when no connection becomes
    /// available within the checkout timeout,
    /// [`SqlPoolError::ConnectionError`] when the connector fails, or
    /// whatever `work` itself returns.
    pub fn execute<F, R>(&self, work: F) -> Result<R, SqlPoolError>
    where
        F: FnOnce(&M::Connection) -> Result<R, SqlPoolError>,
    {
        let conn = self.pool.check_out()?;
        work(&conn)
    }
}

impl<M: Connect> Clone for Database<M> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
        }
    }
}
