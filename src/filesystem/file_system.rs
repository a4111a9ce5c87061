use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use derive_more::Display;
use hashlink::LinkedHashSet;
use snafu::Snafu;

use crate::ext::BestEffortPathExt;

/// What a path resolves to. Resolved independently on each side of a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
    /// Sockets, fifos, devices and dangling links. Never mirrored.
    #[display("special entry")]
    Other,
}

/// Names found in one directory, unique, kept in the order the adapter
/// produced them.
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    names: LinkedHashSet<OsString>,
}

impl DirectoryListing {
    pub fn contains(&self, name: &OsStr) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OsStr> {
        self.names.iter().map(OsString::as_os_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl FromIterator<OsString> for DirectoryListing {
    /// A repeated name keeps its first position.
    fn from_iter<I: IntoIterator<Item = OsString>>(iter: I) -> Self {
        let mut names = LinkedHashSet::new();
        for name in iter {
            if !names.contains(&name) {
                names.insert(name);
            }
        }
        Self { names }
    }
}

/// The capability set the synchronizer needs from a filesystem.
pub trait FileSystem {
    async fn list(&self, dir: &Path) -> Result<DirectoryListing, FsError>;
    /// Follows symlinks.
    async fn kind(&self, path: &Path) -> Result<EntryKind, FsError>;
    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, FsError>;
    /// Copies content and basic metadata, overwriting `destination` if present.
    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), FsError>;
    /// `destination` must not exist yet.
    async fn copy_tree(&self, source: &Path, destination: &Path) -> Result<(), FsError>;
    async fn remove_file(&self, path: &Path) -> Result<(), FsError>;
    async fn remove_tree(&self, path: &Path) -> Result<(), FsError>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    async fn list(&self, dir: &Path) -> Result<DirectoryListing, FsError> {
        (**self).list(dir).await
    }

    async fn kind(&self, path: &Path) -> Result<EntryKind, FsError> {
        (**self).kind(path).await
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        (**self).read_bytes(path).await
    }

    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), FsError> {
        (**self).copy_file(source, destination).await
    }

    async fn copy_tree(&self, source: &Path, destination: &Path) -> Result<(), FsError> {
        (**self).copy_tree(source, destination).await
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        (**self).remove_file(path).await
    }

    async fn remove_tree(&self, path: &Path) -> Result<(), FsError> {
        (**self).remove_tree(path).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FsOperation {
    #[display("list")]
    List,
    #[display("inspect")]
    Inspect,
    #[display("read")]
    Read,
    #[display("copy file")]
    CopyFile,
    #[display("copy directory")]
    CopyTree,
    #[display("remove file")]
    RemoveFile,
    #[display("remove directory")]
    RemoveTree,
}

#[derive(Debug, Snafu)]
pub enum FsError {
    #[snafu(display("Cannot {operation} {}: path does not exist", path.best_effort_path_display()))]
    NotFound {
        operation: FsOperation,
        path: PathBuf,
        source: io::Error,
    },
    #[snafu(display("Cannot {operation} {}: permission denied", path.best_effort_path_display()))]
    PermissionDenied {
        operation: FsOperation,
        path: PathBuf,
        source: io::Error,
    },
    #[snafu(display("Failed to {operation} {}", path.best_effort_path_display()))]
    IoFailure {
        operation: FsOperation,
        path: PathBuf,
        source: io::Error,
    },
}

impl FsError {
    /// Sorts an I/O error into the taxonomy by its kind.
    pub fn from_io(operation: FsOperation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => FsError::NotFound {
                operation,
                path,
                source,
            },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied {
                operation,
                path,
                source,
            },
            _ => FsError::IoFailure {
                operation,
                path,
                source,
            },
        }
    }

    /// Adapter for `map_err`.
    pub fn io(operation: FsOperation, path: &Path) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::from_io(operation, path, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(io::ErrorKind::NotFound, "does not exist")]
    #[case(io::ErrorKind::PermissionDenied, "permission denied")]
    #[case(io::ErrorKind::Other, "Failed to read")]
    fn io_errors_are_classified_by_kind(#[case] kind: io::ErrorKind, #[case] message: &str) {
        let error = FsError::from_io(
            FsOperation::Read,
            "/mirror/src/a.txt",
            io::Error::from(kind),
        );

        let expected_variant = match kind {
            io::ErrorKind::NotFound => matches!(error, FsError::NotFound { .. }),
            io::ErrorKind::PermissionDenied => matches!(error, FsError::PermissionDenied { .. }),
            _ => matches!(error, FsError::IoFailure { .. }),
        };
        assert!(expected_variant, "unexpected variant: {error:?}");
        assert!(error.to_string().contains(message));
        assert!(error.to_string().contains("/mirror/src/a.txt"));
    }

    #[test]
    fn listing_keeps_first_occurrence_order() {
        let listing: DirectoryListing = ["b", "a", "b", "c"]
            .into_iter()
            .map(OsString::from)
            .collect();

        assert_eq!(listing.len(), 3);
        assert!(listing.contains(OsStr::new("a")));
        assert!(!listing.contains(OsStr::new("d")));
        let names: Vec<_> = listing.iter().collect();
        assert_eq!(names, vec![OsStr::new("b"), OsStr::new("a"), OsStr::new("c")]);
    }
}
