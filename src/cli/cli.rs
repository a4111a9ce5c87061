use std::num::NonZeroU64;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Periodically mirrors a source directory onto a destination directory.
///
/// Destination entries missing from the source are removed, missing entries
/// are added and files whose content differs are overwritten. Every change is
/// appended to the log file and printed.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Directory to mirror from
    pub source_dir: PathBuf,
    /// Directory to mirror into, must already exist
    pub destination_dir: PathBuf,
    /// File every change is appended to, created if absent
    pub log_file: PathBuf,
    /// Seconds to wait between synchronization passes
    #[clap(default_value = "30")]
    pub interval_seconds: NonZeroU64,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
