//! Concurrent media-post downloader.
//!
//! [`posts`] enumerates a site's photo and video posts into [`task::Task`]s;
//! [`pipeline`] downloads them with a worker pool and retries failures in
//! bounded rounds.

pub mod config;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod posts;
pub mod storage;
pub mod task;
pub mod url_model;
