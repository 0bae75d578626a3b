//! setget core library
//!
//! Downloads every photo and video belonging to a Flickr set, optionally
//! using an authenticated token to reach private content.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - Remote API gateway (`PhotoApi` trait and the Flickr REST client)
//! - [`resolve`] - Size selection and destination naming per catalog entry
//! - [`download`] - Streaming HTTP transfers, overwrite policy, bounded scheduler
//! - [`orchestrator`] - Pagination, dispatch, tally, and the run event stream
//! - [`auth`] - Mini-token to auth-token exchange

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod download;
pub mod orchestrator;
pub mod resolve;

mod user_agent;

// Re-export commonly used types
pub use api::{
    ApiCredentials, ApiError, CatalogEntry, CollectionInfo, CollectionPage, FlickrClient,
    MediaKind, PhotoApi, SizeVariant, TokenGrant,
};
pub use auth::{AuthError, AuthFlow, AuthGrant, AuthSession, MiniToken};
pub use download::{
    DEFAULT_CONCURRENCY, DownloadEngine, DownloadError, DownloadTask, EngineError, HttpClient,
    OverwritePolicy, TaskOutcome, TaskReport, should_download,
};
pub use orchestrator::{RunConfig, RunError, RunEvent, RunHandle, RunTally, SetDownloader};
pub use resolve::{ItemResolver, ResolveError, photo_size_labels, video_size_labels};
