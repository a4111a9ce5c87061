use std::future::Future;
use std::path::PathBuf;
use std::pin::pin;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{Either, select};
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::change_log::ChangeLog;
use crate::filesystem::FileSystem;
use crate::synchronizer::{SyncError, TreeSynchronizer};

/// Runs synchronization passes back to back with a fixed pause in between.
pub struct Scheduler<F, L> {
    synchronizer: TreeSynchronizer<F, L>,
    source: PathBuf,
    destination: PathBuf,
    interval: Duration,
}

impl<F: FileSystem, L: ChangeLog> Scheduler<F, L> {
    pub fn new(config: &RuntimeConfig, synchronizer: TreeSynchronizer<F, L>) -> Self {
        Self {
            synchronizer,
            source: config.source.clone(),
            destination: config.destination.clone(),
            interval: config.interval,
        }
    }

    /// Loops until `shutdown` resolves and returns the number of completed
    /// passes. `shutdown` is checked before each pass and raced against the
    /// pause; a pass that has started always runs to the end.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<usize, SchedulerError> {
        let mut shutdown = pin!(shutdown);
        let mut passes = 0;

        loop {
            if shutdown.as_mut().now_or_never().is_some() {
                debug!("Shutdown requested before pass {}", passes + 1);
                break;
            }

            let report = self
                .synchronizer
                .synchronize(&self.source, &self.destination)
                .await
                .context(PassSnafu { pass: passes + 1 })?;
            passes += 1;
            if report.is_empty() {
                debug!("Pass {} found the destination up to date", passes);
            } else {
                info!(
                    "Pass {} finished: {} added, {} removed, {} copied",
                    passes, report.added, report.removed, report.copied
                );
            }

            debug!("Sleeping for {:?}", self.interval);
            let pause = pin!(compio::time::sleep(self.interval));
            if let Either::Right(_) = select(pause, shutdown.as_mut()).await {
                debug!("Shutdown requested while waiting");
                break;
            }
        }

        info!("Stopped after {} passes", passes);
        Ok(passes)
    }
}

#[derive(Debug, Snafu)]
pub enum SchedulerError {
    #[snafu(display("Synchronization pass {} failed", pass))]
    PassError { pass: usize, source: SyncError },
}
