use std::cell::RefCell;

use super::{Change, ChangeLog, ChangeLogError};

/// Keeps records in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct MemoryChangeLog {
    changes: RefCell<Vec<Change>>,
}

impl MemoryChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<Change> {
        self.changes.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.changes.borrow().iter().map(ToString::to_string).collect()
    }

    pub fn clear(&self) {
        self.changes.borrow_mut().clear();
    }
}

impl ChangeLog for MemoryChangeLog {
    fn record(&self, change: &Change) -> Result<(), ChangeLogError> {
        self.changes.borrow_mut().push(change.clone());
        Ok(())
    }
}
