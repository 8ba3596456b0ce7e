//! Convenient imports for common functionality.

pub use crate::error::{BoxDynError, SqlPoolError};
pub use crate::executor::Database;
pub use crate::pool::{Connect, ConnectionPool, PoolConfig, PoolStats, PooledConnection};
