//! Download scheduler and atomic file writes.
//!
//! This module turns resolved [`DownloadTask`]s into files on disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large videos)
//! - Bounded parallelism with arrival-order admission
//! - Atomic writes: bytes land in `<name>.part` and are renamed on completion
//! - Overwrite policy evaluated before a task is queued
//! - Structured error types with full context
//!
//! Failed transfers are never retried; each one is reported once.
//!
//! # Example
//!
//! ```no_run
//! use setget_core::download::HttpClient;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let bytes = client
//!     .download_to_path("https://live.staticflickr.com/1/2_o.jpg", Path::new("./set/sunset.jpg"))
//!     .await?;
//! println!("Downloaded {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
pub mod filename;
mod overwrite;
mod task;

pub use client::HttpClient;
pub use engine::{DEFAULT_CONCURRENCY, DownloadEngine, EngineError, validate_concurrency};
pub use error::DownloadError;
pub use overwrite::{OverwritePolicy, should_download};
pub use task::{DownloadTask, TaskOutcome, TaskReport};
