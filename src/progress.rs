//! Progress bar driven by run events.

use indicatif::{ProgressBar, ProgressStyle};
use setget_core::RunEvent;
use tracing::{error, info, warn};

/// Renders a run's events: a bar on terminals, log lines everywhere.
pub(crate) struct RunProgress {
    bar: Option<ProgressBar>,
    enabled: bool,
}

impl RunProgress {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { bar: None, enabled }
    }

    /// Applies one event. The bar is created on `SetInfo`, sized to the set.
    pub(crate) fn handle(&mut self, event: &RunEvent) {
        match event {
            RunEvent::SetInfo(info) => {
                info!(
                    title = %info.title,
                    owner = %info.owner_name,
                    total = info.total,
                    "Downloading set"
                );
                if self.enabled {
                    let bar = ProgressBar::new(info.total);
                    bar.set_style(
                        ProgressStyle::with_template(
                            "{spinner} [{bar:30}] {pos}/{len} {wide_msg}",
                        )
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=> "),
                    );
                    bar.set_message(info.title.clone());
                    self.bar = Some(bar);
                }
            }
            RunEvent::PhotoDownloaded {
                path, bytes, tally, ..
            } => {
                self.advance(tally.processed, &path.display().to_string());
                self.log(|| info!(path = %path.display(), bytes, "Downloaded"));
            }
            RunEvent::PhotoSkipped { path, tally, .. } => {
                self.advance(tally.processed, &path.display().to_string());
                self.log(|| info!(path = %path.display(), "Skipped existing file"));
            }
            RunEvent::Warning {
                entry,
                message,
                tally,
            } => {
                self.advance(tally.processed, "warning");
                let item_id = entry.as_ref().map_or("-", |e| e.id.as_str());
                self.log(|| warn!(item_id, "{message}"));
            }
            RunEvent::Error { message, .. } => {
                self.log(|| error!("{message}"));
            }
            RunEvent::Done { tally } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                info!(
                    processed = tally.processed,
                    downloaded = tally.downloaded,
                    skipped = tally.skipped,
                    warnings = tally.warnings,
                    "Set download complete"
                );
            }
        }
    }

    /// Clears the bar if the run ended without `Done`.
    pub(crate) fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }

    fn advance(&self, processed: u64, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_position(processed);
            bar.set_message(message.to_string());
        }
    }

    /// Logs without tearing the bar.
    fn log(&self, write: impl FnOnce()) {
        match &self.bar {
            Some(bar) => bar.suspend(write),
            None => write(),
        }
    }
}
