//! HTTP client wrapper for downloading media renditions.
//!
//! This module provides the `HttpClient` struct which streams a rendition
//! into a `.part` sibling of its destination and promotes it to the final
//! name only after every byte has been written and flushed.

use std::path::Path;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use reqwest::header::CONTENT_LENGTH;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::filename::partial_path;
use crate::user_agent;

/// HTTP client for downloading renditions with streaming support.
///
/// This client is designed to be created once and reused for every task of
/// a run, taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use setget_core::download::HttpClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let bytes = client
///     .download_to_path("https://live.staticflickr.com/1/2_o.jpg", Path::new("./out/2.jpg"))
///     .await?;
/// println!("Downloaded {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 60 seconds of silence between reads; total transfer
    ///   time is unbounded
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the client cannot be built.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// `read_timeout_secs` bounds each read, not the whole request.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the client cannot be built.
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_download_user_agent())
            .build()
            .map_err(|source| DownloadError::Client { source })?;
        Ok(Self { client })
    }

    /// Downloads `url` to exactly `destination`, replacing any existing file.
    ///
    /// Bytes are streamed into `<destination>.part`, which is renamed onto
    /// `destination` only after a complete write. On any error the partial
    /// file is removed and `destination` is left untouched.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Fewer bytes arrive than announced
    /// - Writing or renaming on disk fails
    #[instrument(skip(self), fields(url = %url, destination = %destination.display()))]
    pub async fn download_to_path(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        debug!("starting download");

        let parsed_url = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let response = self.send_request(parsed_url, url).await?;

        let expected_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let stream = response
            .bytes_stream()
            .map(|chunk| {
                chunk.map_err(|e| {
                    if e.is_timeout() {
                        DownloadError::timeout(url)
                    } else {
                        DownloadError::network(url, e)
                    }
                })
            });

        let bytes = write_stream_atomically(stream, url, destination, expected_bytes).await?;

        info!(path = %destination.display(), bytes, "download complete");
        Ok(bytes)
    }

    async fn send_request(&self, url: Url, raw_url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(raw_url)
            } else {
                DownloadError::network(raw_url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            if matches!(status_code, 401 | 403) {
                return Err(DownloadError::auth_required(raw_url, status_code));
            }
            return Err(DownloadError::http_status(raw_url, status_code));
        }

        Ok(response)
    }
}

/// Writes `stream` to `<destination>.part`, then renames it onto `destination`.
///
/// The partial file is removed on every error path, so `destination` only
/// ever appears holding a complete body.
pub(crate) async fn write_stream_atomically<S, B>(
    stream: S,
    url: &str,
    destination: &Path,
    expected_bytes: Option<u64>,
) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, DownloadError>> + Unpin,
    B: AsRef<[u8]>,
{
    let part_path = partial_path(destination);

    let mut file = File::create(&part_path)
        .await
        .map_err(|e| DownloadError::io(part_path.clone(), e))?;

    let result = stream_to_file(&mut file, stream, &part_path).await;
    drop(file);

    let outcome = result.and_then(|written| match expected_bytes {
        Some(expected) if expected != written => {
            Err(DownloadError::truncated(url, expected, written))
        }
        _ => Ok(written),
    });

    match outcome {
        Ok(written) => {
            if let Err(e) = tokio::fs::rename(&part_path, destination).await {
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(DownloadError::io(destination, e));
            }
            Ok(written)
        }
        Err(error) => {
            debug!(path = %part_path.display(), "removing partial file after error");
            let _ = tokio::fs::remove_file(&part_path).await;
            Err(error)
        }
    }
}

/// Streams chunks to file, returning bytes written.
async fn stream_to_file<S, B>(file: &mut File, mut stream: S, path: &Path) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, DownloadError>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        let chunk = chunk.as_ref();

        writer
            .write_all(chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed before the rename makes it visible
    writer.flush().await.map_err(|e| DownloadError::io(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    Ok(bytes_written)
}
