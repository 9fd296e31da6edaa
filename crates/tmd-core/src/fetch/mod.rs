//! Shared HTTP client (libcurl via the `curl` crate).
//!
//! One `ClientOptions` is built per run and shared read-only by every worker and
//! round. Each request gets its own `Easy` handle, so nothing mutable is shared.

mod classify;
mod error;

pub use classify::{classify, classify_curl_error, classify_http_status, FailureKind};
pub use error::FetchError;

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Streams a remote body into a writer. The seam between the download executor
/// and the network; tests substitute scripted fetchers.
pub trait Fetcher: Send + Sync {
    /// GET `url` and copy the body into `sink`. Returns the number of bytes written.
    fn fetch_to(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    fn fetch_to(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        (**self).fetch_to(url, sink)
    }
}

/// Request settings applied to every transfer.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Proxy URL, e.g. `socks5h://127.0.0.1:1080`.
    pub proxy: Option<String>,
    /// Connect timeout, and the window in which at least one byte must arrive.
    pub timeout: Duration,
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    /// Upper bound on the size of each body chunk handed to the sink.
    pub chunk_size: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Duration::from_secs(3),
            headers: HashMap::new(),
            chunk_size: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    options: Arc<ClientOptions>,
}

impl HttpClient {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let opts = &self.options;
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(opts.timeout)?;
        // Read timeout: abort when fewer than 1 byte/s arrives for `timeout`.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(opts.timeout)?;
        easy.buffer_size(opts.chunk_size)?;
        if let Some(proxy) = &opts.proxy {
            easy.proxy(proxy)?;
        }
        if !opts.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in &opts.headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))?;
            }
            easy.http_headers(list)?;
        }
        Ok(easy)
    }

    /// GET a small text document (an API page) into memory.
    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut body = Vec::new();
        self.fetch_to(url, &mut body)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl Fetcher for HttpClient {
    fn fetch_to(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let mut easy = self.easy(url)?;
        let mut written = 0u64;
        let mut sink_error: Option<std::io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    sink_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Err(e) = performed {
            if e.is_write_error() {
                if let Some(io_err) = sink_error.take() {
                    return Err(FetchError::Write(io_err));
                }
            }
            return Err(FetchError::Curl(e));
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        sink.flush().map_err(FetchError::Write)?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = ClientOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(3));
        assert_eq!(opts.chunk_size, 10 * 1024 * 1024);
        assert!(opts.proxy.is_none());
    }

    #[test]
    fn unresolvable_host_is_transport_failure() {
        let client = HttpClient::new(ClientOptions::default());
        let mut sink = Vec::new();
        let err = client
            .fetch_to("http://does-not-exist.invalid/a.jpg", &mut sink)
            .unwrap_err();
        assert!(!err.is_write());
        assert!(sink.is_empty());
    }
}
