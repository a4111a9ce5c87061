mod tree_synchronizer;

pub use tree_synchronizer::{RootRole, SyncError, TreeSynchronizer};
