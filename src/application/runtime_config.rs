use std::path::{Path, PathBuf};
use std::time::Duration;

use snafu::{ResultExt, Snafu, ensure};

use crate::cli::Cli;
use crate::ext::BestEffortPathExt;
use crate::synchronizer::RootRole;

/// Settings resolved once at startup and handed to the scheduler.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Canonical, existing directory.
    pub source: PathBuf,
    /// Canonical, existing directory.
    pub destination: PathBuf,
    pub log_file: PathBuf,
    pub interval: Duration,
}

impl TryFrom<Cli> for RuntimeConfig {
    type Error = RuntimeConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        Ok(Self {
            source: resolve_root(RootRole::Source, &cli.source_dir)?,
            destination: resolve_root(RootRole::Destination, &cli.destination_dir)?,
            log_file: cli.log_file,
            interval: Duration::from_secs(cli.interval_seconds.get()),
        })
    }
}

fn resolve_root(role: RootRole, path: &Path) -> Result<PathBuf, RuntimeConfigError> {
    let canonical = path.canonicalize().context(UnresolvableRootSnafu { role, path })?;
    ensure!(
        canonical.is_dir(),
        NotADirectorySnafu {
            role,
            path: canonical
        }
    );
    Ok(canonical)
}

#[derive(Debug, Snafu)]
pub enum RuntimeConfigError {
    #[snafu(display("{role} directory {} cannot be resolved", path.best_effort_path_display()))]
    UnresolvableRoot {
        role: RootRole,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{role} path {} is not a directory", path.display()))]
    NotADirectory { role: RootRole, path: PathBuf },
}
