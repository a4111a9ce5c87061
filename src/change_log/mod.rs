//! Append-only record of every change made to the destination tree.

mod change;
mod file_change_log;
#[cfg(test)]
mod memory;

pub use change::{Change, ChangeAction};
pub use file_change_log::{ChangeLogError, FileChangeLog};
#[cfg(test)]
pub use memory::MemoryChangeLog;

pub trait ChangeLog {
    fn record(&self, change: &Change) -> Result<(), ChangeLogError>;
}

impl<T: ChangeLog + ?Sized> ChangeLog for &T {
    fn record(&self, change: &Change) -> Result<(), ChangeLogError> {
        (**self).record(change)
    }
}
