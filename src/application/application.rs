use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::{RuntimeConfig, RuntimeConfigError};
use crate::change_log::{ChangeLogError, FileChangeLog};
use crate::cli::Cli;
use crate::filesystem::LocalFileSystem;
use crate::scheduler::{Scheduler, SchedulerError};
use crate::synchronizer::TreeSynchronizer;

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let config = RuntimeConfig::try_from(cli).context(ConfigSnafu)?;
        debug!("Resolved runtime config: {:?}", config);

        let change_log = FileChangeLog::open(&config.log_file).context(ChangeLogSnafu)?;
        let synchronizer = TreeSynchronizer::new(LocalFileSystem, change_log);

        info!(
            "Mirroring {} into {} every {:?}",
            config.source.display(),
            config.destination.display(),
            config.interval
        );
        Scheduler::new(&config, synchronizer)
            .run(interrupted())
            .await
            .context(SchedulerSnafu)?;

        Ok(())
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    match compio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupted, stopping"),
        Err(err) => {
            warn!("Cannot listen for Ctrl-C, only a kill will stop the process: {err}");
            std::future::pending::<()>().await
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: RuntimeConfigError },
    #[snafu(display("Critical failure encountered while opening the change log"))]
    ChangeLogError { source: ChangeLogError },
    #[snafu(display("Critical failure encountered during synchronization"))]
    SchedulerError { source: SchedulerError },
}
