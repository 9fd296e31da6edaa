//! Post enumeration: turns a site's paginated read API into download tasks.
//!
//! Sits outside the download pipeline; the pipeline only sees the
//! `Result<Task, EnumerationError>` items produced by [`enumerate_tasks`].

mod error;
mod parse;
mod player;
mod source;

pub use error::EnumerationError;
pub use parse::{parse_page, Page};
pub use player::hd_url;
pub use source::{validate_site, ApiSource, PageSource, PostStream, DEFAULT_API_URL, PAGE_SIZE};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::task::Task;
use crate::url_model;

/// Content type requested from the read API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Photo,
    Video,
}

impl PostKind {
    pub const ALL: [PostKind; 2] = [PostKind::Photo, PostKind::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Photo => "photo",
            PostKind::Video => "video",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "photo" => Ok(PostKind::Photo),
            "video" => Ok(PostKind::Video),
            other => Err(format!("unknown post kind {other:?} (expected photo or video)")),
        }
    }
}

/// A post with at least one downloadable asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    /// `date-gmt` as sent by the API, used verbatim in file names.
    pub date: String,
    pub kind: PostKind,
    /// Asset URLs in document order.
    pub media_urls: Vec<String>,
    /// Video file extension (from `video-source`); `None` for photos.
    pub extension: Option<String>,
}

/// Map a post's assets to tasks under `save_dir`.
///
/// Photos are named `<date>.<id>.<url file name>`, videos `<date>.<id>.<extension>`.
pub fn tasks_for_post(post: &Post, save_dir: &Path) -> Vec<Task> {
    match post.kind {
        PostKind::Photo => post
            .media_urls
            .iter()
            .map(|url| {
                let name = url_model::photo_filename(&post.date, &post.id, url);
                Task::new(save_dir.join(name), url.clone())
            })
            .collect(),
        PostKind::Video => post
            .media_urls
            .iter()
            .map(|url| {
                let ext = post.extension.as_deref().unwrap_or("mp4");
                let name = url_model::video_filename(&post.date, &post.id, ext);
                Task::new(save_dir.join(name), url.clone())
            })
            .collect(),
    }
}

/// Lazily enumerate every kind in `kinds` (in order) and yield tasks.
///
/// Each kind gets its own `PostStream`; an error ends that kind only.
pub fn enumerate_tasks<S>(
    source: S,
    kinds: &[PostKind],
    save_dir: &Path,
) -> impl Iterator<Item = Result<Task, EnumerationError>>
where
    S: PageSource + Clone,
{
    let save_dir: PathBuf = save_dir.to_path_buf();
    kinds.to_vec().into_iter().flat_map(move |kind| {
        let save_dir = save_dir.clone();
        PostStream::new(source.clone(), kind).flat_map(move |item| match item {
            Ok(post) => tasks_for_post(&post, &save_dir)
                .into_iter()
                .map(Ok)
                .collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        })
    })
}
