use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use super::{DirectoryListing, EntryKind, FileSystem, FsError, FsOperation};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    File(Vec<u8>),
    Directory,
}

/// In-memory tree keyed by absolute path. Parents are created implicitly by
/// the builder helpers; paths in `denied` fail every operation with
/// `PermissionDenied`.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    denied: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.insert_parents(path.as_ref());
        self.nodes
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), Node::Directory);
        self
    }

    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        self.insert_parents(path.as_ref());
        self.nodes.borrow_mut().insert(
            path.as_ref().to_path_buf(),
            Node::File(content.as_ref().to_vec()),
        );
        self
    }

    pub fn deny(&self, path: impl AsRef<Path>) {
        self.denied.borrow_mut().insert(path.as_ref().to_path_buf());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes.borrow().get(path.as_ref()) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.nodes.borrow().get(path.as_ref()), Some(Node::Directory))
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.nodes.borrow().contains_key(path.as_ref())
    }

    /// Every path below `root`, relative to it, with file contents.
    pub fn snapshot(&self, root: impl AsRef<Path>) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
        let root = root.as_ref();
        self.nodes
            .borrow()
            .iter()
            .filter(|(path, _)| path.starts_with(root) && path.as_path() != root)
            .map(|(path, node)| {
                let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
                let content = match node {
                    Node::File(bytes) => Some(bytes.clone()),
                    Node::Directory => None,
                };
                (relative, content)
            })
            .collect()
    }

    fn insert_parents(&self, path: &Path) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Directory);
        }
    }

    fn check_access(&self, operation: FsOperation, path: &Path) -> Result<(), FsError> {
        if self.denied.borrow().contains(path) {
            return Err(FsError::from_io(
                operation,
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
            ));
        }
        Ok(())
    }

    fn node(&self, operation: FsOperation, path: &Path) -> Result<Node, FsError> {
        self.check_access(operation, path)?;
        self.nodes.borrow().get(path).cloned().ok_or_else(|| {
            FsError::from_io(operation, path, io::Error::from(io::ErrorKind::NotFound))
        })
    }

    fn subtree(&self, root: &Path) -> Vec<(PathBuf, Node)> {
        self.nodes
            .borrow()
            .iter()
            .filter(|(path, _)| path.starts_with(root))
            .map(|(path, node)| (path.clone(), node.clone()))
            .collect()
    }
}

impl FileSystem for MemoryFileSystem {
    async fn list(&self, dir: &Path) -> Result<DirectoryListing, FsError> {
        if self.node(FsOperation::List, dir)? != Node::Directory {
            return Err(FsError::from_io(
                FsOperation::List,
                dir,
                io::Error::other("not a directory"),
            ));
        }
        Ok(self
            .nodes
            .borrow()
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name().map(ToOwned::to_owned))
            .collect())
    }

    async fn kind(&self, path: &Path) -> Result<EntryKind, FsError> {
        Ok(match self.node(FsOperation::Inspect, path)? {
            Node::File(_) => EntryKind::File,
            Node::Directory => EntryKind::Directory,
        })
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        match self.node(FsOperation::Read, path)? {
            Node::File(bytes) => Ok(bytes),
            Node::Directory => Err(FsError::from_io(
                FsOperation::Read,
                path,
                io::Error::other("is a directory"),
            )),
        }
    }

    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), FsError> {
        let node = self.node(FsOperation::CopyFile, source)?;
        self.check_access(FsOperation::CopyFile, destination)?;
        self.nodes
            .borrow_mut()
            .insert(destination.to_path_buf(), node);
        Ok(())
    }

    async fn copy_tree(&self, source: &Path, destination: &Path) -> Result<(), FsError> {
        self.node(FsOperation::CopyTree, source)?;
        self.check_access(FsOperation::CopyTree, destination)?;
        for (path, node) in self.subtree(source) {
            let target = match path.strip_prefix(source) {
                Ok(relative) if !relative.as_os_str().is_empty() => destination.join(relative),
                _ => destination.to_path_buf(),
            };
            self.nodes.borrow_mut().insert(target, node);
        }
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        self.node(FsOperation::RemoveFile, path)?;
        self.nodes.borrow_mut().remove(path);
        Ok(())
    }

    async fn remove_tree(&self, path: &Path) -> Result<(), FsError> {
        self.node(FsOperation::RemoveTree, path)?;
        self.nodes
            .borrow_mut()
            .retain(|candidate, _| !candidate.starts_with(path));
        Ok(())
    }
}
