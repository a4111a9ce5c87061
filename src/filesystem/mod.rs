//! Filesystem capabilities consumed by the synchronizer.
//!
//! The synchronizer never touches the disk directly. It talks to a
//! [`FileSystem`], which lets tests swap the real disk for an in-memory tree.

mod file_system;
mod local;
#[cfg(test)]
mod memory;

pub use file_system::{DirectoryListing, EntryKind, FileSystem, FsError, FsOperation};
pub use local::LocalFileSystem;
#[cfg(test)]
pub use memory::MemoryFileSystem;
