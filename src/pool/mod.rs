//! Connection pooling with reentrant, thread-affine checkout.
//!
//! A [`ConnectionPool`] caps how many connections may exist at once, reuses
//! idle ones FIFO, lets the same thread check out its held connection again
//! without blocking, and makes saturated callers wait on a deadline. A
//! background reaper closes connections that sit idle past the configured
//! timeout, freeing capacity.
//!
//! # Example
//!
//! ```ignore
//! use sql_pool::pool::{ConnectionPool, PoolConfig};
//!
//! let config = PoolConfig::new(5)
//!     .with_checkout_timeout_secs(5)
//!     .with_idle_timeout_secs(300);
//! let pool = ConnectionPool::new(config, connector)?;
//!
//! let conn = pool.check_out()?;
//! // Use the connection; it returns to the pool when the guard drops.
//! ```

pub mod config;
pub mod connection;
pub mod stats;

mod core;
mod reaper;

#[cfg(test)]
mod tests;

pub use config::PoolConfig;
pub use connection::{Connect, PooledConnection};
pub use self::core::ConnectionPool;
pub use stats::PoolStats;
