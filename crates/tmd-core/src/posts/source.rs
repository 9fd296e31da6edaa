//! Paginated post enumeration.

use std::collections::VecDeque;

use url::Url;

use super::error::EnumerationError;
use super::parse::parse_page;
use super::{Post, PostKind};
use crate::fetch::{FetchError, HttpClient};

/// Posts requested per API page.
pub const PAGE_SIZE: usize = 50;

/// Default endpoint; `{site}` is replaced by the site identifier.
pub const DEFAULT_API_URL: &str = "http://{site}.tumblr.com/api/read";

/// Supplies raw post-list pages for one site.
pub trait PageSource {
    fn fetch_page(&self, kind: PostKind, start: usize, num: usize) -> Result<String, FetchError>;
}

/// Site identifiers are restricted to `[a-zA-Z0-9_]+`.
pub fn validate_site(site: &str) -> Result<(), EnumerationError> {
    let ok = !site.is_empty() && site.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(EnumerationError::InvalidSite(site.to_string()))
    }
}

/// The remote read API of one site, fetched through the shared client.
#[derive(Debug, Clone)]
pub struct ApiSource {
    client: HttpClient,
    endpoint: Url,
}

impl ApiSource {
    pub fn new(client: HttpClient, api_url: &str, site: &str) -> Result<Self, EnumerationError> {
        validate_site(site)?;
        let url = api_url.replace("{site}", site);
        let endpoint = Url::parse(&url)
            .map_err(|source| EnumerationError::InvalidApiUrl { url, source })?;
        Ok(Self { client, endpoint })
    }

    pub fn page_url(&self, kind: PostKind, start: usize, num: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("type", kind.as_str())
            .append_pair("num", &num.to_string())
            .append_pair("start", &start.to_string());
        url
    }
}

impl PageSource for ApiSource {
    fn fetch_page(&self, kind: PostKind, start: usize, num: usize) -> Result<String, FetchError> {
        let url = self.page_url(kind, start, num);
        tracing::debug!(%url, "fetching post page");
        self.client.get_text(url.as_str())
    }
}

/// Lazy, finite, non-restartable sequence of posts of one kind.
///
/// Pages are requested on demand. The stream ends at the first page without
/// posts (or once `start` passes the announced total). A fetch or parse error
/// is yielded once and ends the stream.
pub struct PostStream<S> {
    source: S,
    kind: PostKind,
    start: usize,
    buffered: VecDeque<Post>,
    finished: bool,
}

impl<S: PageSource> PostStream<S> {
    pub fn new(source: S, kind: PostKind) -> Self {
        Self {
            source,
            kind,
            start: 0,
            buffered: VecDeque::new(),
            finished: false,
        }
    }

    pub fn kind(&self) -> PostKind {
        self.kind
    }

    fn next_page(&mut self) -> Result<(), EnumerationError> {
        let start = self.start;
        let body = self
            .source
            .fetch_page(self.kind, start, PAGE_SIZE)
            .map_err(|source| EnumerationError::Fetch {
                kind: self.kind,
                start,
                source,
            })?;
        let page = parse_page(&body, self.kind).map_err(|source| EnumerationError::Parse {
            kind: self.kind,
            start,
            source,
        })?;
        self.start += PAGE_SIZE;
        tracing::debug!(
            kind = %self.kind,
            start,
            posts = page.post_count,
            usable = page.posts.len(),
            "post page parsed"
        );
        let past_total = page.total.is_some_and(|total| self.start >= total);
        if page.post_count == 0 || past_total {
            self.finished = true;
        }
        self.buffered.extend(page.posts);
        Ok(())
    }
}

impl<S: PageSource> Iterator for PostStream<S> {
    type Item = Result<Post, EnumerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(post) = self.buffered.pop_front() {
                return Some(Ok(post));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.next_page() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}
