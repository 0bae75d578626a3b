//! Run events and the running tally.

use std::path::PathBuf;

use crate::api::{CatalogEntry, CollectionInfo};

/// Counters for one run. Owned and written only by the coordinator.
///
/// At the end of a run `processed == downloaded + skipped + warnings`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    /// Entries that reached a terminal outcome.
    pub processed: u64,
    /// Files written.
    pub downloaded: u64,
    /// Entries skipped because the file already existed.
    pub skipped: u64,
    /// Entries that failed to resolve or download.
    pub warnings: u64,
}

impl RunTally {
    pub(crate) fn record_downloaded(&mut self) {
        self.processed += 1;
        self.downloaded += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.processed += 1;
        self.skipped += 1;
    }

    pub(crate) fn record_warning(&mut self) {
        self.processed += 1;
        self.warnings += 1;
    }

    /// True when no entry ended in a warning.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings == 0
    }
}

impl std::fmt::Display for RunTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed: {} downloaded, {} skipped, {} warnings",
            self.processed, self.downloaded, self.skipped, self.warnings
        )
    }
}

/// Progress notifications, delivered in the order the tally advances.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// First page arrived; `info.total` sizes progress displays.
    SetInfo(CollectionInfo),
    /// A file was written.
    PhotoDownloaded {
        /// The entry.
        entry: CatalogEntry,
        /// Where it was written.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
        /// Tally after this entry.
        tally: RunTally,
    },
    /// The file already existed and overwriting is disabled.
    PhotoSkipped {
        /// The entry.
        entry: CatalogEntry,
        /// Existing file.
        path: PathBuf,
        /// Tally after this entry.
        tally: RunTally,
    },
    /// An entry failed; the run continues.
    Warning {
        /// The entry, when the failure is tied to one.
        entry: Option<CatalogEntry>,
        /// Human-readable cause.
        message: String,
        /// Tally after this entry.
        tally: RunTally,
    },
    /// The run cannot continue. No `Done` follows.
    Error {
        /// Human-readable cause.
        message: String,
        /// Tally at the point of failure.
        tally: RunTally,
    },
    /// Every page fetched and every task terminal.
    Done {
        /// Final tally.
        tally: RunTally,
    },
}

impl RunEvent {
    /// Tally snapshot carried by the event, if any.
    #[must_use]
    pub fn tally(&self) -> Option<RunTally> {
        match self {
            Self::SetInfo(_) => None,
            Self::PhotoDownloaded { tally, .. }
            | Self::PhotoSkipped { tally, .. }
            | Self::Warning { tally, .. }
            | Self::Error { tally, .. }
            | Self::Done { tally } => Some(*tally),
        }
    }

    /// True for `Done` and `Error`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}
