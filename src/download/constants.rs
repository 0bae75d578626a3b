//! Constants for the download module (timeouts).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout: the longest silence allowed between two reads.
///
/// There is no cap on the whole transfer, so a slow but steady download of a
/// large original video is never cut off.
pub const READ_TIMEOUT_SECS: u64 = 60;
