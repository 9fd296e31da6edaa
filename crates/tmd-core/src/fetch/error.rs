//! Fetch error type used for outcome classification.

use thiserror::Error;

/// Error returned by a single fetch: curl failure, HTTP status, or a failed write to the sink.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the body to the sink failed (disk full, permission denied, ...).
    #[error("write: {0}")]
    Write(#[source] std::io::Error),
}

impl FetchError {
    /// True when the failure happened on the local side (sink), not on the wire.
    pub fn is_write(&self) -> bool {
        matches!(self, FetchError::Write(_))
    }
}
