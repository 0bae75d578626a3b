//! Download scheduler with a bounded concurrency budget.
//!
//! This module provides the `DownloadEngine`, which admits tasks in arrival
//! order and runs at most `concurrency` of them at any instant using a
//! semaphore-based concurrency control pattern.
//!
//! # Example
//!
//! ```no_run
//! use setget_core::download::{DownloadEngine, HttpClient};
//!
//! # async fn example(tasks: Vec<setget_core::DownloadTask>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(5, HttpClient::new()?)?;
//! let mut reports = engine.run(tasks);
//! while let Some(report) = reports.recv().await {
//!     println!("{}: {:?}", report.task.destination.display(), report.outcome);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Semaphore, mpsc};
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::task::{DownloadTask, TaskOutcome, TaskReport};
use super::{DownloadError, HttpClient};

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Error type for download engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be at least {MIN_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Tracks how many transfers are executing and the highest level reached.
#[derive(Debug, Default)]
struct RunningGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl RunningGauge {
    fn enter(self: &Arc<Self>) -> RunningGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        RunningGuard {
            gauge: Arc::clone(self),
        }
    }
}

/// Decrements the gauge when a transfer ends, including on abort.
struct RunningGuard {
    gauge: Arc<RunningGauge>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bounded-parallel download scheduler.
///
/// # Concurrency Model
///
/// - Admission happens on the caller's task: [`submit`](Self::submit) waits
///   for a semaphore permit, so tasks start in arrival order
/// - Each admitted transfer runs in its own Tokio task holding the permit
/// - Permits are released automatically when transfers finish (RAII)
/// - Outcomes are collected with [`next_report`](Self::next_report) /
///   [`try_next_report`](Self::try_next_report) in completion order
///
/// No retries: a failed transfer is reported once and left to the caller.
#[derive(Debug)]
pub struct DownloadEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured concurrency limit.
    concurrency: usize,
    client: HttpClient,
    in_flight: JoinSet<TaskOutcome>,
    /// Tasks owned by running workers, keyed by worker id.
    pending: HashMap<Id, DownloadTask>,
    gauge: Arc<RunningGauge>,
}

impl DownloadEngine {
    /// Creates a new engine with the specified concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use setget_core::download::{DownloadEngine, HttpClient};
    ///
    /// let engine = DownloadEngine::new(5, HttpClient::new().unwrap()).unwrap();
    /// assert_eq!(engine.concurrency(), 5);
    /// ```
    #[instrument(level = "debug", skip(client))]
    pub fn new(concurrency: usize, client: HttpClient) -> Result<Self, EngineError> {
        validate_concurrency(concurrency)?;

        debug!(concurrency, "creating download engine");

        Ok(Self {
            // Budgets above the semaphore's ceiling are capped, never raised.
            semaphore: Arc::new(Semaphore::new(concurrency.min(Semaphore::MAX_PERMITS))),
            concurrency,
            client,
            in_flight: JoinSet::new(),
            pending: HashMap::new(),
            gauge: Arc::new(RunningGauge::default()),
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Number of admitted tasks whose outcome has not been collected yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Highest number of transfers observed executing at once.
    #[must_use]
    pub fn peak_running(&self) -> usize {
        self.gauge.peak.load(Ordering::SeqCst)
    }

    /// Admits a task, waiting for a free slot if the budget is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip(self, task), fields(item_id = %task.entry.id, destination = %task.destination.display()))]
    pub async fn submit(&mut self, task: DownloadTask) -> Result<(), EngineError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| EngineError::SemaphoreClosed)?;

        let client = self.client.clone();
        let gauge = Arc::clone(&self.gauge);
        let url = task.variant.url.clone();
        let destination = task.destination.clone();

        let handle = self.in_flight.spawn(async move {
            // Permit and gauge entry are released when this block exits
            let _permit = permit;
            let _running = gauge.enter();

            match client.download_to_path(&url, &destination).await {
                Ok(bytes) => TaskOutcome::Downloaded { bytes },
                Err(error) => TaskOutcome::Failed(error),
            }
        });
        debug!(in_flight = self.in_flight.len(), "task admitted");
        self.pending.insert(handle.id(), task);
        Ok(())
    }

    /// Collects an already-finished outcome without waiting.
    pub fn try_next_report(&mut self) -> Option<TaskReport> {
        let joined = self.in_flight.try_join_next_with_id()?;
        self.to_report(joined)
    }

    /// Waits for the next outcome; `None` once nothing is in flight.
    pub async fn next_report(&mut self) -> Option<TaskReport> {
        loop {
            let joined = self.in_flight.join_next_with_id().await?;
            if let Some(report) = self.to_report(joined) {
                return Some(report);
            }
        }
    }

    /// Cancels every running transfer. Their partial files are never promoted.
    pub fn abort_all(&mut self) {
        if !self.in_flight.is_empty() {
            warn!(in_flight = self.in_flight.len(), "aborting in-flight downloads");
        }
        self.in_flight.abort_all();
        self.pending.clear();
    }

    /// Runs `tasks` to completion, streaming reports as they finish.
    ///
    /// The returned receiver closes after the last report.
    pub fn run(mut self, tasks: Vec<DownloadTask>) -> mpsc::Receiver<TaskReport> {
        let (sender, receiver) = mpsc::channel(self.concurrency.max(16));

        tokio::spawn(async move {
            let total = tasks.len();
            info!(total, concurrency = self.concurrency, "starting download batch");

            for task in tasks {
                if let Err(error) = self.submit(task).await {
                    warn!(error = %error, "stopping batch admission");
                    break;
                }
                while let Some(report) = self.try_next_report() {
                    if sender.send(report).await.is_err() {
                        self.abort_all();
                        return;
                    }
                }
            }

            while let Some(report) = self.next_report().await {
                if sender.send(report).await.is_err() {
                    self.abort_all();
                    return;
                }
            }

            info!(total, peak_running = self.peak_running(), "download batch complete");
        });

        receiver
    }

    fn to_report(&mut self, joined: Result<(Id, TaskOutcome), JoinError>) -> Option<TaskReport> {
        match joined {
            Ok((id, outcome)) => {
                let task = self.pending.remove(&id)?;
                Some(TaskReport { task, outcome })
            }
            Err(join_error) => {
                let task = self.pending.remove(&join_error.id())?;
                warn!(
                    item_id = %task.entry.id,
                    error = %join_error,
                    "download task panicked or was cancelled"
                );
                let outcome = TaskOutcome::Failed(DownloadError::Interrupted {
                    url: task.variant.url.clone(),
                    reason: join_error.to_string(),
                });
                Some(TaskReport { task, outcome })
            }
        }
    }
}

/// Checks a concurrency budget against the allowed range.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConcurrency`] for zero.
pub fn validate_concurrency(concurrency: usize) -> Result<(), EngineError> {
    if concurrency >= MIN_CONCURRENCY {
        Ok(())
    } else {
        Err(EngineError::InvalidConcurrency { value: concurrency })
    }
}
