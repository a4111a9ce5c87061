use std::fmt;
use std::path::PathBuf;

use derive_more::Display;

use crate::filesystem::EntryKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ChangeAction {
    #[display("ADDED")]
    Added,
    #[display("REMOVED")]
    Removed,
    #[display("COPIED")]
    Copied,
}

/// One mutation of the destination tree, e.g. `ADDED subdirectory /dst/sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub action: ChangeAction,
    pub kind: EntryKind,
    pub path: PathBuf,
}

impl Change {
    pub fn new(action: ChangeAction, kind: EntryKind, path: impl Into<PathBuf>) -> Self {
        Self {
            action,
            kind,
            path: path.into(),
        }
    }

    pub fn noun(&self) -> &'static str {
        match self.kind {
            EntryKind::Directory => "subdirectory",
            EntryKind::File | EntryKind::Other => "file",
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.action, self.noun(), self.path.display())
    }
}
