use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use derive_more::Display;
use futures::future::{FutureExt, LocalBoxFuture};
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::change_log::{Change, ChangeAction, ChangeLog, ChangeLogError};
use crate::comparator::files_match;
use crate::ext::BestEffortPathExt;
use crate::filesystem::{DirectoryListing, EntryKind, FileSystem, FsError};

/// Counts of the changes recorded during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub removed: usize,
    pub copied: usize,
}

impl SyncReport {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.copied
    }

    /// True exactly when the pass recorded nothing.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn count(&mut self, action: ChangeAction) {
        match action {
            ChangeAction::Added => self.added += 1,
            ChangeAction::Removed => self.removed += 1,
            ChangeAction::Copied => self.copied += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RootRole {
    #[display("Source")]
    Source,
    #[display("Destination")]
    Destination,
}

/// Makes a destination directory an exact mirror of a source directory.
///
/// Each level is handled in two passes over fresh listings: first every
/// destination entry missing from the source is removed, then every source
/// entry is added, overwritten when its content digest differs, or recursed
/// into. Nothing is cached between calls; the destination tree is the only
/// state. The first failing operation aborts the whole pass and may leave the
/// destination partially synchronized.
pub struct TreeSynchronizer<F, L> {
    fs: F,
    log: L,
}

impl<F: FileSystem, L: ChangeLog> TreeSynchronizer<F, L> {
    pub fn new(fs: F, log: L) -> Self {
        Self { fs, log }
    }

    /// Both roots must already exist as directories.
    pub async fn synchronize(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<SyncReport, SyncError> {
        self.ensure_root(RootRole::Source, source).await?;
        self.ensure_root(RootRole::Destination, destination).await?;

        let mut report = SyncReport::default();
        self.synchronize_directory(source, destination, &mut report)
            .await?;
        Ok(report)
    }

    async fn ensure_root(&self, role: RootRole, path: &Path) -> Result<(), SyncError> {
        match self.fs.kind(path).await {
            Ok(EntryKind::Directory) => Ok(()),
            Ok(kind) => RootNotDirectorySnafu { role, path, kind }.fail(),
            Err(FsError::NotFound { .. }) => MissingRootSnafu { role, path }.fail(),
            Err(source) => Err(SyncError::FileSystemError { source }),
        }
    }

    fn synchronize_directory<'a>(
        &'a self,
        source: &'a Path,
        destination: &'a Path,
        report: &'a mut SyncReport,
    ) -> LocalBoxFuture<'a, Result<(), SyncError>> {
        async move {
            debug!(
                "Synchronizing {} into {}",
                source.display(),
                destination.display()
            );
            let source_listing = self.fs.list(source).await.context(FileSystemSnafu)?;
            let destination_listing = self
                .fs
                .list(destination)
                .await
                .context(FileSystemSnafu)?;
            debug!(
                "{} source entries, {} destination entries",
                source_listing.len(),
                destination_listing.len()
            );

            // Pruning first keeps a stale name from colliding with its replacement.
            self.prune(&source_listing, &destination_listing, destination, report)
                .await?;
            self.merge(
                &source_listing,
                &destination_listing,
                source,
                destination,
                report,
            )
            .await
        }
        .boxed_local()
    }

    async fn prune(
        &self,
        source_listing: &DirectoryListing,
        destination_listing: &DirectoryListing,
        destination: &Path,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let foreign = destination_listing
            .iter()
            .filter(|name| !source_listing.contains(name));

        for name in foreign {
            let path = destination.join(name);
            match self.fs.kind(&path).await.context(FileSystemSnafu)? {
                EntryKind::Directory => {
                    self.fs.remove_tree(&path).await.context(FileSystemSnafu)?;
                    self.record(ChangeAction::Removed, EntryKind::Directory, &path, report)?;
                }
                EntryKind::File | EntryKind::Other => {
                    self.fs.remove_file(&path).await.context(FileSystemSnafu)?;
                    self.record(ChangeAction::Removed, EntryKind::File, &path, report)?;
                }
            }
        }

        Ok(())
    }

    async fn merge(
        &self,
        source_listing: &DirectoryListing,
        destination_listing: &DirectoryListing,
        source: &Path,
        destination: &Path,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        for name in source_listing.iter() {
            let source_path = source.join(name);
            let destination_path = destination.join(name);

            match self.fs.kind(&source_path).await.context(FileSystemSnafu)? {
                EntryKind::File => {
                    match self
                        .destination_kind(destination_listing, name, &destination_path, report)
                        .await?
                    {
                        None => {
                            self.fs
                                .copy_file(&source_path, &destination_path)
                                .await
                                .context(FileSystemSnafu)?;
                            self.record(
                                ChangeAction::Added,
                                EntryKind::File,
                                &destination_path,
                                report,
                            )?;
                        }
                        Some(EntryKind::File) => {
                            let unchanged =
                                files_match(&self.fs, &source_path, &destination_path)
                                    .await
                                    .context(FileSystemSnafu)?;
                            if unchanged {
                                continue;
                            }
                            self.fs
                                .copy_file(&source_path, &destination_path)
                                .await
                                .context(FileSystemSnafu)?;
                            self.record(
                                ChangeAction::Copied,
                                EntryKind::File,
                                &destination_path,
                                report,
                            )?;
                        }
                        Some(destination_kind) => {
                            return KindMismatchSnafu {
                                path: &destination_path,
                                source_kind: EntryKind::File,
                                destination_kind,
                            }
                            .fail();
                        }
                    }
                }
                EntryKind::Directory => {
                    match self
                        .destination_kind(destination_listing, name, &destination_path, report)
                        .await?
                    {
                        None => {
                            self.fs
                                .copy_tree(&source_path, &destination_path)
                                .await
                                .context(FileSystemSnafu)?;
                            self.record(
                                ChangeAction::Added,
                                EntryKind::Directory,
                                &destination_path,
                                report,
                            )?;
                        }
                        Some(EntryKind::Directory) => {
                            self.synchronize_directory(&source_path, &destination_path, report)
                                .await?;
                        }
                        Some(destination_kind) => {
                            return KindMismatchSnafu {
                                path: &destination_path,
                                source_kind: EntryKind::Directory,
                                destination_kind,
                            }
                            .fail();
                        }
                    }
                }
                // A destination entry of the same name is left untouched, even
                // when it is a stale copy of what used to be a regular file.
                EntryKind::Other => {
                    debug!("Skipping special entry {}", source_path.display());
                }
            }
        }

        Ok(())
    }

    /// Kind of the destination entry named `name`, or `None` when there is
    /// nothing usable there. A special entry in the way is removed first.
    async fn destination_kind(
        &self,
        destination_listing: &DirectoryListing,
        name: &OsStr,
        path: &Path,
        report: &mut SyncReport,
    ) -> Result<Option<EntryKind>, SyncError> {
        if !destination_listing.contains(name) {
            return Ok(None);
        }

        match self.fs.kind(path).await.context(FileSystemSnafu)? {
            EntryKind::Other => {
                self.fs.remove_file(path).await.context(FileSystemSnafu)?;
                self.record(ChangeAction::Removed, EntryKind::File, path, report)?;
                Ok(None)
            }
            kind => Ok(Some(kind)),
        }
    }

    fn record(
        &self,
        action: ChangeAction,
        kind: EntryKind,
        path: &Path,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        self.log
            .record(&Change::new(action, kind, path))
            .context(RecordSnafu)?;
        report.count(action);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum SyncError {
    #[snafu(display("{role} directory {} does not exist", path.best_effort_path_display()))]
    MissingRoot { role: RootRole, path: PathBuf },
    #[snafu(display("{role} path {} is a {kind}, not a directory", path.best_effort_path_display()))]
    RootNotDirectory {
        role: RootRole,
        path: PathBuf,
        kind: EntryKind,
    },
    #[snafu(display(
        "{} is a {source_kind} in the source but a {destination_kind} in the destination",
        path.best_effort_path_display()
    ))]
    KindMismatch {
        path: PathBuf,
        source_kind: EntryKind,
        destination_kind: EntryKind,
    },
    #[snafu(display("Filesystem operation failed during synchronization"))]
    FileSystemError { source: FsError },
    #[snafu(display("Failed to record a change"))]
    RecordError { source: ChangeLogError },
}
