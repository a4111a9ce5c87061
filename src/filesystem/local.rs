use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;

use tracing::debug;

use super::{DirectoryListing, EntryKind, FileSystem, FsError, FsOperation};

/// The real disk. File contents go through compio, directory walking and
/// copies through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    async fn list(&self, dir: &Path) -> Result<DirectoryListing, FsError> {
        let mut names = fs::read_dir(dir)
            .and_then(|entries| {
                entries
                    .map(|entry| entry.map(|entry| entry.file_name()))
                    .collect::<io::Result<Vec<_>>>()
            })
            .map_err(FsError::io(FsOperation::List, dir))?;
        names.sort();
        Ok(names.into_iter().collect())
    }

    async fn kind(&self, path: &Path) -> Result<EntryKind, FsError> {
        inspect(path)
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        compio::fs::read(path)
            .await
            .map_err(FsError::io(FsOperation::Read, path))
    }

    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), FsError> {
        copy_file_with_metadata(source, destination)
            .map_err(FsError::io(FsOperation::CopyFile, source))
    }

    async fn copy_tree(&self, source: &Path, destination: &Path) -> Result<(), FsError> {
        copy_tree_recursively(source, destination)
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        compio::fs::remove_file(path)
            .await
            .map_err(FsError::io(FsOperation::RemoveFile, path))
    }

    async fn remove_tree(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_dir_all(path).map_err(FsError::io(FsOperation::RemoveTree, path))
    }
}

fn inspect(path: &Path) -> Result<EntryKind, FsError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(kind_of(&metadata)),
        // A link whose target is gone is still listed by its parent.
        Err(err)
            if err.kind() == io::ErrorKind::NotFound
                && fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink()) =>
        {
            Ok(EntryKind::Other)
        }
        Err(err) => Err(FsError::from_io(FsOperation::Inspect, path, err)),
    }
}

fn kind_of(metadata: &Metadata) -> EntryKind {
    if metadata.is_file() {
        EntryKind::File
    } else if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    }
}

/// Content, permissions and modification time.
fn copy_file_with_metadata(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;
    let modified = fs::metadata(source)?.modified()?;
    File::open(destination)?.set_modified(modified)
}

fn copy_tree_recursively(source: &Path, destination: &Path) -> Result<(), FsError> {
    fs::create_dir(destination).map_err(FsError::io(FsOperation::CopyTree, destination))?;

    let entries = fs::read_dir(source).map_err(FsError::io(FsOperation::List, source))?;
    for entry in entries {
        let entry = entry.map_err(FsError::io(FsOperation::List, source))?;
        let from = entry.path();
        let to = destination.join(entry.file_name());

        match inspect(&from)? {
            EntryKind::File => copy_file_with_metadata(&from, &to)
                .map_err(FsError::io(FsOperation::CopyFile, &from))?,
            EntryKind::Directory => copy_tree_recursively(&from, &to)?,
            EntryKind::Other => debug!("Not copying special entry {}", from.display()),
        }
    }

    let permissions = fs::metadata(source)
        .map_err(FsError::io(FsOperation::Inspect, source))?
        .permissions();
    fs::set_permissions(destination, permissions)
        .map_err(FsError::io(FsOperation::CopyTree, destination))
}
