//! Download task and outcome types shared by the resolver, scheduler, and
//! orchestrator.

use std::path::PathBuf;

use crate::api::{CatalogEntry, SizeVariant};

use super::DownloadError;

/// One resolved transfer: which rendition of which entry goes where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// The catalog entry this task was derived from.
    pub entry: CatalogEntry,
    /// The chosen rendition.
    pub variant: SizeVariant,
    /// Final destination path.
    pub destination: PathBuf,
}

impl DownloadTask {
    /// Creates a task.
    #[must_use]
    pub fn new(entry: CatalogEntry, variant: SizeVariant, destination: PathBuf) -> Self {
        Self {
            entry,
            variant,
            destination,
        }
    }
}

/// Terminal state of a scheduled task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Every byte was written and the file promoted to its final name.
    Downloaded {
        /// Bytes written.
        bytes: u64,
    },
    /// Transfer or storage failure; siblings are unaffected.
    Failed(DownloadError),
}

impl TaskOutcome {
    /// Returns true for [`TaskOutcome::Downloaded`].
    #[must_use]
    pub fn is_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

/// A task paired with its terminal outcome.
#[derive(Debug)]
pub struct TaskReport {
    /// The task that finished.
    pub task: DownloadTask,
    /// How it finished.
    pub outcome: TaskOutcome,
}
