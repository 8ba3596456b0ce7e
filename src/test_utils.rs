//! Test doubles for exercising the pool without a real database.
//!
//! Enabled with the `test-utils` feature (the crate's own tests and benches
//! turn it on through the self dev-dependency).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::BoxDynError;
use crate::pool::Connect;

/// A fake connection carrying the order in which it was created.
#[derive(Debug)]
pub struct TestConnection {
    serial: usize,
}

impl TestConnection {
    /// Zero-based creation order of this connection.
    pub fn serial(&self) -> usize {
        self.serial
    }
}

/// Connector double that counts creations and can be made faulty.
///
/// Clones share the same counters, so tests keep a clone and hand the
/// original to the pool.
#[derive(Clone, Default)]
pub struct TestConnector {
    created: Arc<AtomicUsize>,
    fail_next: Arc<AtomicBool>,
}

impl TestConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total connections handed out so far.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Make the next `connect` call fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl Connect for TestConnector {
    type Connection = TestConnection;

    fn connect(&self) -> Result<TestConnection, BoxDynError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("injected connect failure".into());
        }
        let serial = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(TestConnection { serial })
    }
}
