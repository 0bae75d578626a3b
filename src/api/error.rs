//! Error types for remote API calls.

use thiserror::Error;

/// Errors returned by [`PhotoApi`](super::PhotoApi) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested set, user, or item does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Service-provided explanation.
        message: String,
    },

    /// Credentials were rejected or are insufficient.
    #[error("unauthorized: {message}\n  Suggestion: check the API key, or run `setget auth` for private sets")]
    Unauthorized {
        /// Service-provided explanation.
        message: String,
    },

    /// Network-level failure reaching the service.
    #[error("network error calling {method}: {source}")]
    Transport {
        /// API method being called.
        method: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status from the service.
    #[error("HTTP {status} calling {method}")]
    HttpStatus {
        /// API method being called.
        method: String,
        /// HTTP status code.
        status: u16,
    },

    /// The service answered with `stat=fail`.
    #[error("{method} failed with code {code}: {message}")]
    Remote {
        /// API method being called.
        method: String,
        /// Service error code.
        code: i64,
        /// Service error message.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("unexpected response from {method}: {source}")]
    Decode {
        /// API method being called.
        method: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client or request URL could not be built.
    #[error("invalid request for {method}: {reason}")]
    InvalidRequest {
        /// API method being called.
        method: String,
        /// Why the request is invalid.
        reason: String,
    },
}

impl ApiError {
    /// Creates a transport error, folding timeouts into the same variant.
    pub fn transport(method: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            method: method.into(),
            source,
        }
    }

    /// Creates a decode error.
    pub fn decode(method: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            method: method.into(),
            source,
        }
    }

    /// Returns true for conditions that invalidate a whole run.
    #[must_use]
    pub fn is_credential_or_missing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Unauthorized { .. })
    }
}
