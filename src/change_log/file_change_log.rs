use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use colored::Colorize;
use snafu::{ResultExt, Snafu};
use supports_color::Stream;
use tracing::debug;

use super::{Change, ChangeAction, ChangeLog};
use crate::ext::BestEffortPathExt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Appends each change to a text file and echoes it on stdout.
#[derive(Debug)]
pub struct FileChangeLog {
    path: PathBuf,
    file: File,
    colorize: bool,
}

impl FileChangeLog {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self, ChangeLogError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context(OpenSnafu {
                path: path.to_path_buf(),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            colorize: supports_color::on(Stream::Stdout).is_some(),
        })
    }

    pub fn format_line<Tz>(timestamp: &DateTime<Tz>, change: &Change) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        format!("{} - {}", timestamp.format(TIMESTAMP_FORMAT), change)
    }

    fn console_line(&self, timestamp: &DateTime<Local>, change: &Change) -> String {
        if !self.colorize {
            return Self::format_line(timestamp, change);
        }

        let tag = change.action.to_string();
        let tag = match change.action {
            ChangeAction::Added => tag.green(),
            ChangeAction::Removed => tag.red(),
            ChangeAction::Copied => tag.yellow(),
        };
        format!(
            "{} - {} {} {}",
            timestamp.format(TIMESTAMP_FORMAT),
            tag.bold(),
            change.noun(),
            change.path.display()
        )
    }
}

impl ChangeLog for FileChangeLog {
    fn record(&self, change: &Change) -> Result<(), ChangeLogError> {
        let timestamp = Local::now();
        let line = Self::format_line(&timestamp, change);

        writeln!(&self.file, "{line}").context(WriteSnafu {
            path: self.path.clone(),
        })?;
        echo(std::io::stdout().lock(), &self.console_line(&timestamp, change));

        Ok(())
    }
}

// Stdout write errors such as a closed pipe are ignored; the log file keeps the record.
fn echo(mut out: impl Write, line: &str) {
    if let Err(error) = writeln!(out, "{line}") {
        debug!("Cannot echo change to stdout: {error}");
    }
}

#[derive(Debug, Snafu)]
pub enum ChangeLogError {
    #[snafu(display("Failed to open log file {}", path.best_effort_path_display()))]
    OpenError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to append to log file {}", path.best_effort_path_display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}
