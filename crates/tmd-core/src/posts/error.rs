//! Enumeration error type.

use thiserror::Error;

use super::PostKind;
use crate::fetch::FetchError;

/// Failure while listing posts. Aborts enumeration of one content type only.
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("invalid site identifier {0:?} (expected letters, digits and '_')")]
    InvalidSite(String),
    #[error("invalid API URL {url:?}: {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{kind} posts at start={start}: {source}")]
    Fetch {
        kind: PostKind,
        start: usize,
        #[source]
        source: FetchError,
    },
    #[error("{kind} posts at start={start}: unparseable response: {source}")]
    Parse {
        kind: PostKind,
        start: usize,
        #[source]
        source: quick_xml::de::DeError,
    },
}
