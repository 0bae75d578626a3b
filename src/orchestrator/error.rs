//! Run-fatal errors.

use thiserror::Error;

use crate::api::ApiError;
use crate::download::EngineError;

/// Conditions that stop a whole run. Item failures never end up here.
#[derive(Debug, Error)]
pub enum RunError {
    /// Rejected before any network activity.
    #[error("configuration error: {0}")]
    Configuration(#[source] EngineError),

    /// A page fetch failed (bad credentials, unknown set, network).
    #[error("{0}")]
    Api(#[source] ApiError),

    /// The scheduler stopped admitting tasks.
    #[error("download scheduler failed: {0}")]
    Engine(#[source] EngineError),

    /// The coordinator task panicked or was cancelled.
    #[error("run aborted: {reason}")]
    Aborted {
        /// Join failure description.
        reason: String,
    },
}
