//! Local file names for media assets.
//!
//! Names are `<date>.<post id>.<tail>`, where the tail is the file name from
//! the asset URL (photos) or the declared extension (videos). The result is
//! sanitized for Linux filesystems.

mod path;
mod sanitize;

pub use path::{extension_from_url, filename_from_url_path};
pub use sanitize::sanitize_filename_for_linux;

/// Tail used when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

fn asset_filename(date: &str, post_id: &str, tail: &str) -> String {
    let sanitized = sanitize_filename_for_linux(&format!("{date}.{post_id}.{tail}"));
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// `<date>.<post id>.<last URL path segment>`.
///
/// # Examples
///
/// - `photo_filename("2024-01-01", "1", "http://x/a.jpg")` → `"2024-01-01.1.a.jpg"`
pub fn photo_filename(date: &str, post_id: &str, url: &str) -> String {
    let tail = filename_from_url_path(url)
        .map(|s| sanitize_filename_for_linux(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    asset_filename(date, post_id, &tail)
}

/// `<date>.<post id>.<extension>`.
pub fn video_filename(date: &str, post_id: &str, extension: &str) -> String {
    asset_filename(date, post_id, extension.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_name_from_url() {
        assert_eq!(
            photo_filename("2024-01-01", "1", "http://x/a.jpg"),
            "2024-01-01.1.a.jpg"
        );
        assert_eq!(
            photo_filename("2018-09-28", "178", "https://64.media.example.com/abc/tumblr_p1_1280.jpg?x=1"),
            "2018-09-28.178.tumblr_p1_1280.jpg"
        );
    }

    #[test]
    fn photo_name_without_path_falls_back() {
        assert_eq!(
            photo_filename("2024-01-01", "9", "https://example.com/"),
            "2024-01-01.9.download.bin"
        );
    }

    #[test]
    fn video_name_from_extension() {
        assert_eq!(video_filename("2024-01-01", "5", "mp4"), "2024-01-01.5.mp4");
        assert_eq!(video_filename("2024-01-01", "5", ".mov"), "2024-01-01.5.mov");
    }

    #[test]
    fn date_with_spaces_is_sanitized() {
        assert_eq!(
            video_filename("2018-09-28 10:00:00 GMT", "5", "mp4"),
            "2018-09-28_10:00:00_GMT.5.mp4"
        );
    }

    #[test]
    fn path_separators_cannot_escape_save_dir() {
        let name = photo_filename("../..", "1/2", "http://x/a.jpg");
        assert!(!name.contains('/'));
    }
}
