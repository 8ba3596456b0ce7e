use std::time::Duration;

use thiserror::Error;

/// Boxed error type accepted from connectors.
pub type BoxDynError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SqlPoolError {
    /// No connection became available within the configured checkout timeout.
    ///
    /// Carries the configured pool size so operators can see at a glance
    /// whether the pool needs to grow. Never retried internally.
    #[error(
        "could not obtain a database connection within {timeout:?}; the pool size is currently {pool_size}, consider increasing it"
    )]
    ConnectionTimeout { pool_size: usize, timeout: Duration },

    /// The connector failed to produce a connection. Propagated unchanged;
    /// a failed attempt never consumes pool capacity.
    #[error("Connection error: {0}")]
    ConnectionError(#[source] BoxDynError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}
