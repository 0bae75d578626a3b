//! Set download orchestration.
//!
//! A run pages through one set, resolves each entry, applies the overwrite
//! policy, and feeds the download scheduler. Downloads start while later
//! pages are still being fetched.
//!
//! Progress is reported as an ordered stream of [`RunEvent`]s: `SetInfo`
//! first, then one of `PhotoDownloaded`, `PhotoSkipped`, or `Warning` per
//! entry, then `Done`. A fatal failure ends the stream with `Error`
//! instead.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use setget_core::{ApiCredentials, FlickrClient, HttpClient, RunConfig, RunEvent, SetDownloader};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(FlickrClient::new(ApiCredentials::new("key"))?);
//! let config = RunConfig {
//!     output_dir: "./harbour".into(),
//!     ..RunConfig::default()
//! };
//! let downloader = SetDownloader::new(api, HttpClient::new()?, config)?;
//!
//! let mut run = downloader.download_set("72157600000000000", "12345678@N00");
//! while let Some(event) = run.next_event().await {
//!     if let RunEvent::Warning { message, .. } = &event {
//!         eprintln!("warning: {message}");
//!     }
//! }
//! let tally = run.finish().await?;
//! println!("{tally}");
//! # Ok(())
//! # }
//! ```

mod coordinator;
mod error;
mod events;

pub use error::RunError;
pub use events::{RunEvent, RunTally};

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::api::PhotoApi;
use crate::download::{DEFAULT_CONCURRENCY, HttpClient, validate_concurrency};
use coordinator::Coordinator;

/// Events buffered between the coordinator and a slow consumer.
const EVENT_BUFFER: usize = 64;

/// Options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum simultaneous transfers (at least 1).
    pub concurrency: usize,
    /// Directory files are written into.
    pub output_dir: PathBuf,
    /// Requested size label; `None` picks the best available.
    pub size: Option<String>,
    /// Skip entries whose destination already exists.
    pub no_overwrite: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            output_dir: PathBuf::from("."),
            size: None,
            no_overwrite: false,
        }
    }
}

/// Entry point for downloading sets with one gateway and configuration.
#[derive(Clone)]
pub struct SetDownloader {
    api: Arc<dyn PhotoApi>,
    client: HttpClient,
    config: RunConfig,
}

impl SetDownloader {
    /// Validates `config` and builds the downloader. No network activity.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Configuration`] for a zero concurrency.
    pub fn new(
        api: Arc<dyn PhotoApi>,
        client: HttpClient,
        config: RunConfig,
    ) -> Result<Self, RunError> {
        validate_concurrency(config.concurrency).map_err(RunError::Configuration)?;
        Ok(Self {
            api,
            client,
            config,
        })
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Starts a run on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[instrument(skip(self))]
    pub fn download_set(&self, set_id: &str, user_id: &str) -> RunHandle {
        let (sender, events) = mpsc::channel(EVENT_BUFFER);
        let api = Arc::clone(&self.api);
        let client = self.client.clone();
        let config = self.config.clone();
        let set_id = set_id.to_string();
        let user_id = user_id.to_string();

        debug!(output_dir = %config.output_dir.display(), "starting run");
        let task = tokio::spawn(async move {
            Coordinator::new(api, client, config, sender)?
                .run(set_id, user_id)
                .await
        });

        RunHandle { events, task }
    }
}

impl std::fmt::Debug for SetDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetDownloader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A run in progress: its event stream and its final result.
#[derive(Debug)]
pub struct RunHandle {
    events: mpsc::Receiver<RunEvent>,
    task: JoinHandle<Result<RunTally, RunError>>,
}

impl RunHandle {
    /// Next event; `None` once the run has ended and all events are read.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Waits for the run to end. Unread events are discarded.
    ///
    /// # Errors
    ///
    /// The run's fatal error, or [`RunError::Aborted`] if the coordinator
    /// task itself failed.
    pub async fn finish(self) -> Result<RunTally, RunError> {
        let Self { events, task } = self;
        drop(events);
        task.await.map_err(|join_error| RunError::Aborted {
            reason: join_error.to_string(),
        })?
    }

    /// Reads every event, then returns them with the final result.
    pub async fn collect(mut self) -> (Vec<RunEvent>, Result<RunTally, RunError>) {
        let mut collected = Vec::new();
        while let Some(event) = self.next_event().await {
            collected.push(event);
        }
        (collected, self.finish().await)
    }
}
