//! Unit of download work: where a media asset comes from and where it goes.

use std::fmt;
use std::path::{Path, PathBuf};

/// A single `(destination, source URL)` pair.
///
/// Identity is the destination path; it is what the executor checks for
/// existence before fetching. Tasks are never mutated once built, retry rounds
/// move them between queues unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    destination: PathBuf,
    source_url: String,
}

impl Task {
    pub fn new(destination: impl Into<PathBuf>, source_url: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            source_url: source_url.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.destination.display(), self.source_url)
    }
}
