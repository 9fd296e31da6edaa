//! Parse one page of the `/api/read` XML post list.

use serde::Deserialize;

use super::{player, Post, PostKind};

#[derive(Debug, Deserialize)]
struct Document {
    posts: PostList,
}

#[derive(Debug, Deserialize)]
struct PostList {
    #[serde(rename = "@total", default)]
    total: Option<String>,
    #[serde(rename = "post", default)]
    posts: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@date-gmt", default)]
    date_gmt: String,
    #[serde(rename = "photo-url", default)]
    photo_urls: Vec<Variant>,
    #[serde(default)]
    photoset: Option<PhotoSet>,
    #[serde(rename = "video-source", default)]
    video_source: Option<VideoSource>,
    #[serde(rename = "video-player", default)]
    video_players: Vec<Variant>,
}

/// One size variant of an asset, e.g. `<photo-url max-width="1280">...</photo-url>`.
#[derive(Debug, Deserialize)]
struct Variant {
    #[serde(rename = "@max-width", default)]
    max_width: Option<String>,
    #[serde(rename = "$text", default)]
    text: String,
}

impl Variant {
    fn width(&self) -> u32 {
        self.max_width
            .as_deref()
            .and_then(|w| w.trim().parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct PhotoSet {
    #[serde(rename = "photo", default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(rename = "photo-url", default)]
    urls: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
struct VideoSource {
    #[serde(default)]
    extension: Option<String>,
}

/// Posts found on one page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// `<post>` elements on the page, including ones that yielded nothing downloadable.
    pub post_count: usize,
    /// Total posts of this kind as announced by the API, when present.
    pub total: Option<usize>,
    pub posts: Vec<Post>,
}

/// Text of the variant with the largest `max-width` (missing = 0, ties go to the last one).
fn largest(variants: &[Variant]) -> Option<&str> {
    variants
        .iter()
        .max_by_key(|v| v.width())
        .map(|v| v.text.trim())
        .filter(|t| !t.is_empty())
}

pub fn parse_page(xml: &str, kind: PostKind) -> Result<Page, quick_xml::de::DeError> {
    let doc: Document = quick_xml::de::from_str(xml)?;
    let post_count = doc.posts.posts.len();
    let total = doc
        .posts
        .total
        .as_deref()
        .and_then(|t| t.trim().parse().ok());
    let posts = doc
        .posts
        .posts
        .into_iter()
        .filter_map(|raw| match kind {
            PostKind::Photo => photo_post(raw),
            PostKind::Video => video_post(raw),
        })
        .collect();
    Ok(Page {
        post_count,
        total,
        posts,
    })
}

fn photo_post(raw: RawPost) -> Option<Post> {
    let mut urls: Vec<String> = raw
        .photoset
        .iter()
        .flat_map(|set| set.photos.iter())
        .filter_map(|photo| largest(&photo.urls))
        .map(str::to_string)
        .collect();
    if let Some(first) = largest(&raw.photo_urls) {
        if !urls.iter().any(|u| u == first) {
            urls.push(first.to_string());
        }
    }
    if urls.is_empty() {
        tracing::debug!(post = %raw.id, "photo post without photo urls");
        return None;
    }
    Some(Post {
        id: raw.id,
        date: raw.date_gmt,
        kind: PostKind::Photo,
        media_urls: urls,
        extension: None,
    })
}

fn video_post(raw: RawPost) -> Option<Post> {
    let Some(url) = largest(&raw.video_players).and_then(player::hd_url) else {
        tracing::warn!(post = %raw.id, "video post without a downloadable source, skipping");
        return None;
    };
    let extension = raw
        .video_source
        .and_then(|s| s.extension)
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .or_else(|| crate::url_model::extension_from_url(&url));
    Some(Post {
        id: raw.id,
        date: raw.date_gmt,
        kind: PostKind::Video,
        media_urls: vec![url],
        extension,
    })
}
