//! Error types for the download module.
//!
//! This module defines structured errors for media transfers, providing
//! context-rich messages that end up in run warnings.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while transferring one rendition to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create, write, rename).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Received fewer bytes than the server announced.
    #[error("truncated download of {url}: expected {expected_bytes} bytes, got {actual_bytes}")]
    Truncated {
        /// The URL being downloaded.
        url: String,
        /// Content-Length announced by the server.
        expected_bytes: u64,
        /// Bytes actually received.
        actual_bytes: u64,
    },

    /// The media host refused access to a private rendition.
    #[error(
        "[AUTH] access denied (HTTP {status}) downloading {url}\n  Suggestion: run `setget auth` and retry with --auth"
    )]
    AuthRequired {
        /// The URL that requires authentication.
        url: String,
        /// The HTTP status code (401 or 403).
        status: u16,
    },

    /// The worker running the transfer panicked or was cancelled.
    #[error("download of {url} interrupted: {reason}")]
    Interrupted {
        /// The URL being downloaded.
        url: String,
        /// Join failure description.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a truncation error.
    pub fn truncated(url: impl Into<String>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Truncated {
            url: url.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Creates an authentication-required error.
    pub fn auth_required(url: impl Into<String>, status: u16) -> Self {
        Self::AuthRequired {
            url: url.into(),
            status,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path the source error doesn't carry.
