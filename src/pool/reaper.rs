//! Background eviction of idle connections.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::SqlPoolError;

use super::connection::Connect;
use super::core::Shared;

/// Periodic reaping task owned by the pool. Dropping it (which happens when
/// the pool drops) signals the thread and joins it, so the loop never
/// outlives its owner.
pub(super) struct Reaper {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Reaper {
    /// Spawn the reaper thread, or return `None` when reaping is disabled
    /// (zero idle timeout or zero reaping frequency).
    pub(super) fn spawn<M: Connect>(
        shared: &Arc<Shared<M>>,
    ) -> Result<Option<Self>, SqlPoolError> {
        let config = shared.config();
        let frequency = match (config.reaping_frequency(), config.idle_timeout()) {
            (Some(frequency), Some(_)) => frequency,
            _ => return Ok(None),
        };
        let (shutdown, ticks) = mpsc::channel::<()>();
        let shared = Arc::clone(shared);
        let handle = thread::Builder::new()
            .name("sql-pool-reaper".to_string())
            .spawn(move || run_reaper(&shared, &ticks, frequency))
            .map_err(|err| {
                SqlPoolError::ConnectionError(
                    format!("failed to spawn reaper thread: {err}").into(),
                )
            })?;
        Ok(Some(Self {
            shutdown,
            handle: Some(handle),
        }))
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_reaper<M: Connect>(shared: &Shared<M>, ticks: &Receiver<()>, frequency: Duration) {
    loop {
        match ticks.recv_timeout(frequency) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                shared.reap_idle_connections();
            }
        }
    }
}
