//! The connector seam and the checkout guard.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::BoxDynError;

use super::core::ConnectionPool;

/// Factory for live, ready-to-use connections.
///
/// The pool never inspects what a connector produces; it only tracks
/// lifecycle and ownership. Closing a connection is dropping it, so the
/// connection type needs no pool-facing methods at all. Connections are
/// shared across nested checkouts on one thread, so anything mutated through
/// them wants interior mutability (a `Mutex<T>` around a raw client is the
/// usual shape).
///
/// Implemented for any `Fn() -> Result<C, E>` closure.
pub trait Connect: Send + Sync + 'static {
    type Connection: Send + Sync + 'static;

    /// Produce one new connection.
    ///
    /// # Errors
    /// Failures propagate out of [`ConnectionPool::check_out`] unchanged; a
    /// failed attempt never consumes pool capacity.
    fn connect(&self) -> Result<Self::Connection, BoxDynError>;
}

impl<C, E, F> Connect for F
where
    F: Fn() -> Result<C, E> + Send + Sync + 'static,
    C: Send + Sync + 'static,
    E: Into<BoxDynError>,
{
    type Connection = C;

    fn connect(&self) -> Result<C, BoxDynError> {
        (self)().map_err(Into::into)
    }
}

/// A checked-out connection.
///
/// Dropping the guard releases one level of ownership; the connection itself
/// goes back on the idle queue once every nested checkout on the owning
/// thread has been released. The guard cannot leave the thread that checked
/// it out (ownership is tracked per thread).
pub struct PooledConnection<'a, M: Connect> {
    pool: &'a ConnectionPool<M>,
    conn: Arc<M::Connection>,
    // checkout ownership is keyed by thread identity
    _thread_affine: PhantomData<*const ()>,
}

impl<'a, M: Connect> PooledConnection<'a, M> {
    pub(super) fn new(pool: &'a ConnectionPool<M>, conn: Arc<M::Connection>) -> Self {
        Self {
            pool,
            conn,
            _thread_affine: PhantomData,
        }
    }

    /// Shared handle to the underlying connection.
    pub fn inner(&self) -> &Arc<M::Connection> {
        &self.conn
    }
}

impl<M: Connect> Deref for PooledConnection<'_, M> {
    type Target = M::Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<M: Connect> Drop for PooledConnection<'_, M> {
    fn drop(&mut self) {
        self.pool.check_in();
    }
}
