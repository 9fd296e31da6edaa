//! Video URL extraction from the embedded player markup.
//!
//! The player is an HTML fragment whose `data-crt-options` attribute holds
//! JSON such as `{"hdUrl":"https://.../tumblr_abc.mp4","filmstrip":{...}}`.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

fn crt_options_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"data-crt-options\s*=\s*(?:'([^']*)'|"([^"]*)")"#)
            .expect("data-crt-options pattern is valid")
    })
}

#[derive(Debug, Deserialize)]
struct CrtOptions {
    /// A string when an HD rendition exists, `false` otherwise.
    #[serde(rename = "hdUrl", default)]
    hd_url: serde_json::Value,
}

/// Returns the `hdUrl` from the player's `data-crt-options`, if it is a non-empty string.
pub fn hd_url(player_html: &str) -> Option<String> {
    let caps = crt_options_attr().captures(player_html)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let json = quick_xml::escape::unescape(raw)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let opts: CrtOptions = serde_json::from_str(&json).ok()?;
    opts.hd_url
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
