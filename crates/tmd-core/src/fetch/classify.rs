//! Classify curl errors and HTTP statuses for outcome log lines.
//!
//! Every transport failure is retried by the next round regardless of kind;
//! the classification only makes the logs readable.

use super::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connect or read timed out.
    Timeout,
    /// Host or proxy name did not resolve.
    Dns,
    /// Network-level failure (refused, reset, empty reply).
    Connection,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Any other non-2xx status.
    Status(u32),
    /// Local write failed.
    Storage,
    Other,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Dns => "dns",
            FailureKind::Connection => "connection",
            FailureKind::Throttled => "throttled",
            FailureKind::Status(_) => "http-status",
            FailureKind::Storage => "storage",
            FailureKind::Other => "other",
        }
    }
}

pub fn classify_http_status(code: u32) -> FailureKind {
    match code {
        429 | 503 => FailureKind::Throttled,
        _ => FailureKind::Status(code),
    }
}

pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        return FailureKind::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return FailureKind::Dns;
    }
    if e.is_couldnt_connect()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_ssl_connect_error()
    {
        return FailureKind::Connection;
    }
    FailureKind::Other
}

pub fn classify(e: &FetchError) -> FailureKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Write(_) => FailureKind::Storage,
    }
}
