//! The single coordinating task of a run: pagination, dispatch, and tally.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, trace, warn};

use super::{RunConfig, RunError, RunEvent, RunTally};
use crate::api::{ApiError, CatalogEntry, CollectionPage, PhotoApi};
use crate::download::filename::{disambiguated_path, numbered_path};
use crate::download::{DownloadEngine, DownloadTask, HttpClient, OverwritePolicy, TaskOutcome, TaskReport};
use crate::resolve::ItemResolver;

/// Owns the tally and the event sender; nothing else writes either.
pub(super) struct Coordinator {
    api: Arc<dyn PhotoApi>,
    resolver: ItemResolver,
    engine: DownloadEngine,
    policy: OverwritePolicy,
    output_dir: PathBuf,
    /// Destinations handed out so far in this run.
    claimed: HashSet<PathBuf>,
    tally: RunTally,
    events: mpsc::Sender<RunEvent>,
}

impl Coordinator {
    pub(super) fn new(
        api: Arc<dyn PhotoApi>,
        client: HttpClient,
        config: RunConfig,
        events: mpsc::Sender<RunEvent>,
    ) -> Result<Self, RunError> {
        let engine = DownloadEngine::new(config.concurrency, client).map_err(RunError::Engine)?;
        Ok(Self {
            resolver: ItemResolver::new(Arc::clone(&api), config.size),
            api,
            engine,
            policy: OverwritePolicy::from_no_overwrite(config.no_overwrite),
            output_dir: config.output_dir,
            claimed: HashSet::new(),
            tally: RunTally::default(),
            events,
        })
    }

    /// Runs to `Done` or `Error`, returning the final tally.
    #[instrument(skip(self))]
    pub(super) async fn run(mut self, set_id: String, user_id: String) -> Result<RunTally, RunError> {
        match self.drive(&set_id, &user_id).await {
            Ok(()) => {
                info!(tally = %self.tally, peak_running = self.engine.peak_running(), "set download complete");
                let tally = self.tally;
                self.emit(RunEvent::Done { tally }).await;
                Ok(tally)
            }
            Err(run_error) => {
                self.engine.abort_all();
                error!(error = %run_error, tally = %self.tally, "set download failed");
                let tally = self.tally;
                self.emit(RunEvent::Error {
                    message: run_error.to_string(),
                    tally,
                })
                .await;
                Err(run_error)
            }
        }
    }

    async fn drive(&mut self, set_id: &str, user_id: &str) -> Result<(), RunError> {
        let mut page: u32 = 1;
        loop {
            debug!(page, "fetching page");
            let listing = self
                .fetch_page(set_id, user_id, page)
                .await
                .map_err(RunError::Api)?;

            if page == 1 {
                info!(
                    title = %listing.info.title,
                    owner = %listing.info.owner_name,
                    total = listing.info.total,
                    "set found"
                );
                self.emit(RunEvent::SetInfo(listing.info.clone())).await;
            }

            let count = listing.entries.len();
            for entry in listing.entries {
                self.dispatch(entry).await?;
                self.drain_ready().await;
            }

            // An empty page ends pagination even if the service claims more.
            if !listing.has_more || count == 0 {
                break;
            }
            page += 1;
        }

        debug!(in_flight = self.engine.in_flight(), "all pages fetched, draining");
        while let Some(report) = self.engine.next_report().await {
            self.record(report).await;
        }
        Ok(())
    }

    /// Fetches one page while recording transfers that finish meanwhile.
    async fn fetch_page(
        &mut self,
        set_id: &str,
        user_id: &str,
        page: u32,
    ) -> Result<CollectionPage, ApiError> {
        let api = Arc::clone(&self.api);
        let fetch = async move { api.collection_page(set_id, user_id, page).await };
        tokio::pin!(fetch);

        loop {
            if self.engine.in_flight() == 0 {
                return fetch.await;
            }
            tokio::select! {
                listing = &mut fetch => return listing,
                report = self.engine.next_report() => {
                    if let Some(report) = report {
                        self.record(report).await;
                    }
                }
            }
        }
    }

    /// Resolve, apply the overwrite policy, then queue.
    async fn dispatch(&mut self, entry: CatalogEntry) -> Result<(), RunError> {
        let task = match self.resolver.resolve(&entry, &self.output_dir).await {
            Ok(task) => self.claim(task),
            Err(resolve_error) => {
                self.report_warning(Some(entry), resolve_error.to_string()).await;
                return Ok(());
            }
        };

        if !self.policy.should_download(&task.destination).await {
            self.tally.record_skipped();
            let tally = self.tally;
            self.emit(RunEvent::PhotoSkipped {
                entry: task.entry,
                path: task.destination,
                tally,
            })
            .await;
            return Ok(());
        }

        self.engine.submit(task).await.map_err(RunError::Engine)
    }

    /// Gives a later entry a distinct name when an earlier one took it.
    ///
    /// Tries `<name>_<id>`, then `<name>_<id>_2`, `_3`, ... until a name no
    /// other entry of this run holds.
    fn claim(&mut self, mut task: DownloadTask) -> DownloadTask {
        if self.claimed.contains(&task.destination) {
            let base = disambiguated_path(&task.destination, &task.entry.id);
            let mut renamed = base.clone();
            let mut attempt: u32 = 2;
            while self.claimed.contains(&renamed) {
                renamed = numbered_path(&base, attempt);
                attempt += 1;
            }
            debug!(
                from = %task.destination.display(),
                to = %renamed.display(),
                "destination already claimed in this run"
            );
            task.destination = renamed;
        }
        self.claimed.insert(task.destination.clone());
        task
    }

    async fn drain_ready(&mut self) {
        while let Some(report) = self.engine.try_next_report() {
            self.record(report).await;
        }
    }

    async fn record(&mut self, report: TaskReport) {
        let TaskReport { task, outcome } = report;
        match outcome {
            TaskOutcome::Downloaded { bytes } => {
                self.tally.record_downloaded();
                let tally = self.tally;
                self.emit(RunEvent::PhotoDownloaded {
                    entry: task.entry,
                    path: task.destination,
                    bytes,
                    tally,
                })
                .await;
            }
            TaskOutcome::Failed(download_error) => {
                self.report_warning(Some(task.entry), download_error.to_string()).await;
            }
        }
    }

    async fn report_warning(&mut self, entry: Option<CatalogEntry>, message: String) {
        self.tally.record_warning();
        warn!(
            item_id = entry.as_ref().map_or("-", |e| e.id.as_str()),
            %message,
            "item failed"
        );
        let tally = self.tally;
        self.emit(RunEvent::Warning {
            entry,
            message,
            tally,
        })
        .await;
    }

    async fn emit(&self, event: RunEvent) {
        if self.events.send(event).await.is_err() {
            trace!("event receiver dropped");
        }
    }
}
