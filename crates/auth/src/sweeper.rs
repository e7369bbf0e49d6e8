//! Background eviction of expired revocation entries.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::RevocationStore;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Handle to a running sweep loop.
///
/// `stop` (or dropping the handle) wakes the loop immediately and joins it, so
/// shutdown never waits out a full interval.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: Option<mpsc::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl SweeperHandle {
    /// Request shutdown and wait for the loop to exit.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

/// Periodic sweep over a [`RevocationStore`].
#[derive(Debug)]
pub struct RevocationSweeper;

impl RevocationSweeper {
    /// Spawn the sweep loop on its own thread, ticking every `interval`.
    pub fn start(
        store: Arc<dyn RevocationStore>,
        interval: Duration,
    ) -> std::io::Result<SweeperHandle> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name("revocation-sweeper".to_string())
            .spawn(move || sweep_loop(store, interval, shutdown_rx))?;

        info!(interval_secs = interval.as_secs(), "revocation sweeper started");

        Ok(SweeperHandle {
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }
}

fn sweep_loop(store: Arc<dyn RevocationStore>, interval: Duration, shutdown_rx: mpsc::Receiver<()>) {
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let removed = store.sweep();
                if removed > 0 {
                    debug!(removed, "swept expired revocations");
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!("revocation sweeper stopped");
}
