//! Periodic housekeeping: prunes command-tracking windows on a dedicated
//! thread until the ticker is dropped.

use crate::error::{FishingError, FishingResult};
use crate::tracking::CommandTracker;
use crossbeam_channel::{bounded, select, tick, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Handle to the maintenance thread. Dropping it stops the thread.
pub struct MaintenanceTicker {
    shutdown: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    interval: Duration,
}

impl MaintenanceTicker {
    /// Prunes `commands` every `interval`.
    pub fn start(
        tracker: Arc<CommandTracker>,
        commands: Vec<String>,
        interval: Duration,
    ) -> FishingResult<Self> {
        let (shutdown, stop) = bounded::<()>(0);
        let ticks = tick(interval);

        let worker = thread::Builder::new()
            .name("fishy-maintenance".into())
            .spawn(move || loop {
                select! {
                    recv(ticks) -> _ => Self::prune_all(&tracker, &commands),
                    recv(stop) -> _ => break,
                }
            })
            .map_err(|e| FishingError::Config(format!("failed to spawn maintenance: {e}")))?;

        tracing::info!(interval_secs = interval.as_secs(), "maintenance started");
        Ok(Self {
            shutdown: Some(shutdown),
            worker: Some(worker),
            interval,
        })
    }

    fn prune_all(tracker: &CommandTracker, commands: &[String]) {
        for command in commands {
            match tracker.prune(command) {
                Ok(removed) => tracing::debug!(command = %command, removed, "tracking pruned"),
                Err(error) => tracing::warn!(command = %command, %error, "tracking prune failed"),
            }
        }
    }

    /// Tick interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for MaintenanceTicker {
    fn drop(&mut self) {
        // Disconnecting the stop channel wakes the select.
        self.shutdown.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for MaintenanceTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceTicker")
            .field("interval", &self.interval)
            .finish()
    }
}
