//! Integration tests: enumerate a site served by a local HTTP server and run the
//! download pipeline against it with the real curl client.

mod common;

use std::path::Path;
use std::time::Duration;

use common::media_server::MediaServer;
use tempfile::tempdir;
use tmd_core::fetch::{ClientOptions, HttpClient};
use tmd_core::pipeline::{ExecutorSettings, PipelineSettings, RetryController, RunReport};
use tmd_core::posts::{self, ApiSource, PostKind};
use tmd_core::task::Task;

const PHOTO_PAGE: &str = "/api/read?type=photo&num=50&start=0";
const VIDEO_PAGE: &str = "/api/read?type=video&num=50&start=0";

fn client() -> HttpClient {
    HttpClient::new(ClientOptions {
        timeout: Duration::from_secs(3),
        ..ClientOptions::default()
    })
}

fn settings(retry_budget: u32) -> PipelineSettings {
    PipelineSettings {
        workers: 3,
        retry_budget,
        executor: ExecutorSettings {
            overwrite: false,
            delay: Duration::ZERO,
        },
    }
}

/// Two photo posts (three images) and one video post.
fn publish_site(server: &MediaServer) {
    let photos = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<tumblr version="1.0">
  <posts start="0" total="2" type="photo">
    <post id="1" type="photo" date-gmt="2018-09-28 10:00:00 GMT">
      <photo-url max-width="1280">{a}</photo-url>
      <photoset>
        <photo><photo-url max-width="500">{base}/small/a.jpg</photo-url><photo-url max-width="1280">{a}</photo-url></photo>
        <photo><photo-url max-width="1280">{b}</photo-url></photo>
      </photoset>
    </post>
    <post id="2" type="photo" date-gmt="2018-09-27 09:00:00 GMT">
      <photo-url max-width="1280">{c}</photo-url>
    </post>
  </posts>
</tumblr>"#,
        base = server.base(),
        a = server.url("/media/a.jpg"),
        b = server.url("/media/b.png"),
        c = server.url("/media/c.gif"),
    );
    let videos = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<tumblr version="1.0">
  <posts start="0" total="1" type="video">
    <post id="3" type="video" date-gmt="2018-09-26 08:00:00 GMT">
      <video-source><extension>mp4</extension></video-source>
      <video-player max-width="500">&lt;video data-crt-options='{{"hdUrl":"{v}"}}'&gt;&lt;/video&gt;</video-player>
    </post>
  </posts>
</tumblr>"#,
        v = server.url("/media/v.mp4"),
    );
    server.serve(PHOTO_PAGE, photos);
    server.serve(VIDEO_PAGE, videos);
    server.serve("/media/a.jpg", b"AAAA".to_vec());
    server.serve("/media/b.png", b"BBBBBB".to_vec());
    server.serve("/media/c.gif", b"C".to_vec());
    server.serve("/media/v.mp4", vec![7u8; 64 * 1024]);
}

fn source(server: &MediaServer) -> ApiSource {
    ApiSource::new(client(), &format!("{}/api/read", server.base()), "demo").unwrap()
}

fn fetch_site(server: &MediaServer, dir: &Path, kinds: &[PostKind], retry_budget: u32) -> RunReport {
    let tasks = posts::enumerate_tasks(source(server), kinds, dir);
    RetryController::new(client(), settings(retry_budget))
        .run(tasks)
        .expect("pipeline run")
}

fn part_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".part"))
        .collect()
}

#[test]
fn downloads_every_asset_named_by_post() {
    let server = MediaServer::start();
    publish_site(&server);
    let dir = tempdir().unwrap();

    let report = fetch_site(&server, dir.path(), &PostKind::ALL, 3);

    assert_eq!(report.enqueued, 4);
    assert_eq!(report.completed(), 4);
    assert!(report.is_success());
    let read = |name: &str| std::fs::read(dir.path().join(name)).unwrap();
    assert_eq!(read("2018-09-28_10:00:00_GMT.1.a.jpg"), b"AAAA");
    assert_eq!(read("2018-09-28_10:00:00_GMT.1.b.png"), b"BBBBBB");
    assert_eq!(read("2018-09-27_09:00:00_GMT.2.c.gif"), b"C");
    assert_eq!(read("2018-09-26_08:00:00_GMT.3.mp4"), vec![7u8; 64 * 1024]);
    assert_eq!(server.hits("/small/a.jpg"), 0);
    assert!(part_files(dir.path()).is_empty());
}

#[test]
fn second_run_skips_without_network_access() {
    let server = MediaServer::start();
    publish_site(&server);
    let dir = tempdir().unwrap();

    let first = fetch_site(&server, dir.path(), &PostKind::ALL, 3);
    assert_eq!(first.completed(), 4);
    let media_hits = server.hits_under("/media/");
    assert_eq!(media_hits, 4);

    let second = fetch_site(&server, dir.path(), &PostKind::ALL, 3);
    assert_eq!(second.completed(), 0);
    assert_eq!(second.skipped(), 4);
    assert_eq!(second.rounds.len(), 1);
    assert_eq!(server.hits_under("/media/"), media_hits);
}

#[test]
fn transient_failures_recover_in_later_rounds() {
    let server = MediaServer::start();
    publish_site(&server);
    server.serve_flaky("/media/a.jpg", b"AAAA".to_vec(), 2);
    let dir = tempdir().unwrap();

    let report = fetch_site(&server, dir.path(), &[PostKind::Photo], 3);

    assert_eq!(server.hits("/media/a.jpg"), 3);
    assert_eq!(report.completed(), 3);
    assert_eq!(report.rounds.len(), 3);
    assert!(report.failed.is_empty());
    assert_eq!(
        std::fs::read(dir.path().join("2018-09-28_10:00:00_GMT.1.a.jpg")).unwrap(),
        b"AAAA"
    );
}

#[test]
fn permanent_failure_is_reported_after_budget() {
    let server = MediaServer::start();
    publish_site(&server);
    server.serve_flaky("/media/b.png", b"never".to_vec(), usize::MAX);
    let dir = tempdir().unwrap();

    let report = fetch_site(&server, dir.path(), &[PostKind::Photo], 2);

    assert_eq!(server.hits("/media/b.png"), 3);
    let expected = Task::new(
        dir.path().join("2018-09-28_10:00:00_GMT.1.b.png"),
        server.url("/media/b.png"),
    );
    assert_eq!(report.failed, vec![expected.clone()]);
    assert_eq!(report.completed(), 2);
    assert!(report.mostly_succeeded());
    assert!(!expected.destination().exists());
    assert!(part_files(dir.path()).is_empty());
}

#[test]
fn failed_kind_does_not_stop_the_other() {
    let server = MediaServer::start();
    publish_site(&server);
    server.serve_flaky(VIDEO_PAGE, Vec::new(), usize::MAX);
    let dir = tempdir().unwrap();

    let report = fetch_site(&server, dir.path(), &PostKind::ALL, 1);

    assert_eq!(report.enumeration_errors.len(), 1);
    assert!(report.enumeration_errors[0].contains("video"));
    assert_eq!(report.completed(), 3);
    assert!(report.failed.is_empty());
    assert!(!report.is_success());
}

#[test]
fn enumeration_alone_touches_no_media() {
    let server = MediaServer::start();
    publish_site(&server);

    let tasks: Vec<Task> = posts::enumerate_tasks(source(&server), &PostKind::ALL, Path::new("/save"))
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[3].destination(), Path::new("/save/2018-09-26_08:00:00_GMT.3.mp4"));
    assert_eq!(tasks[3].source_url(), server.url("/media/v.mp4"));
    assert_eq!(server.hits_under("/media/"), 0);
    assert_eq!(server.hits(PHOTO_PAGE), 1);
}
