//! Bounded, thread-aware connection pooling for SQL clients.
//!
//! The core is [`pool::ConnectionPool`]: a fixed upper bound on open
//! connections, FIFO reuse of idle ones, reentrant checkout on the calling
//! thread, blocking acquisition with a deadline, and background reclamation
//! of connections that sit idle too long. [`executor::Database`] wraps the
//! pool with a run-with-connection API that releases on every exit path.

pub mod error;
pub mod executor;
pub mod pool;
pub mod prelude;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{BoxDynError, SqlPoolError};
pub use executor::Database;
pub use pool::{Connect, ConnectionPool, PoolConfig, PoolStats, PooledConnection};
