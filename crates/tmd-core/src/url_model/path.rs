//! Name hints taken from an asset URL's path.

use url::Url;

fn last_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    match segment {
        "." | ".." => None,
        s => Some(s.to_string()),
    }
}

/// Last non-empty path segment, ignoring query and fragment.
///
/// `None` for unparseable URLs and bare hosts.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    last_segment(url)
}

/// Extension of the last path segment, without the dot.
pub fn extension_from_url(url: &str) -> Option<String> {
    let name = last_segment(url)?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
