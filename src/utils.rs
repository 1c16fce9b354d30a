//! Utility functions for link canonicalization, HTML cleanup, and file system checks.
//!
//! This module provides helpers used by several scrapers:
//! - Canonicalization of entry links (tracking parameter removal, Google News
//!   redirect unwrapping)
//! - HTML stripping and summary truncation for feed descriptions
//! - Output directory validation

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Hosts that only ever appear as redirect wrappers, never as a story link.
const REDIRECTOR_HOSTS: [&str; 3] = ["news.google.com", "www.google.com", "google.com"];

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || key == "fbclid" || key == "gclid"
}

/// Canonicalize an entry link.
///
/// Strips `utm_*`, `fbclid`, and `gclid` query parameters and unwraps the
/// Google News `?url=` redirect wrapper. Unparseable input is returned
/// trimmed but otherwise untouched; a broken link is still a link the reader
/// can try.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     canonicalize_link("https://example.com/a?utm_source=x&id=5"),
///     canonicalize_link("https://example.com/a?id=5"),
/// );
/// ```
pub fn canonicalize_link(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    if let Some(inner) = unwrap_google_news(&url) {
        return canonicalize_link(&inner);
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
    }

    url.to_string()
}

/// Unwrap a Google News redirect link via query-string inspection.
///
/// Returns the inner URL when `url` points at a Google host and carries an
/// absolute `url=` query parameter, `None` otherwise.
pub fn unwrap_google_news(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    if !REDIRECTOR_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)) {
        return None;
    }
    url.query_pairs()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.into_owned())
        .filter(|v| v.starts_with("http://") || v.starts_with("https://"))
}

/// Scan an HTML fragment for the first non-redirector absolute URL.
///
/// Fallback for Google News entries whose link carries no `url=` parameter:
/// the summary HTML usually embeds the publisher link directly.
pub fn first_external_url(html: &str) -> Option<String> {
    static RE_URL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"https?://[^\s"'<>\\)]+"#).unwrap());

    for m in RE_URL.find_iter(html) {
        if let Ok(u) = Url::parse(m.as_str()) {
            if let Some(host) = u.host_str() {
                if !REDIRECTOR_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)) {
                    return Some(m.as_str().to_string());
                }
            }
        }
    }
    None
}

/// Strip HTML from a feed summary: decode entities, drop tags, collapse
/// whitespace.
pub fn strip_html(s: &str) -> String {
    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let decoded = html_escape::decode_html_entities(s).to_string();
    let stripped = RE_TAGS.replace_all(&decoded, " ");
    RE_WS.replace_all(&stripped, " ").trim().to_string()
}

/// Truncate a summary to `max` characters, appending an ellipsis when cut.
///
/// Operates on character boundaries so multi-byte text (feed summaries are
/// frequently Czech) never splits mid-codepoint.
pub fn truncate_summary(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push('…');
    out
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if missing, then performs a write test by creating
/// and immediately deleting a probe file. This is the only check allowed to
/// fail the whole run; everything downstream degrades per source instead.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_strips_tracking_params() {
        let with = canonicalize_link("https://example.com/a?utm_source=x&id=5");
        let without = canonicalize_link("https://example.com/a?id=5");
        assert_eq!(with, without);
        assert!(!with.contains("utm_source"));
    }

    #[test]
    fn test_canonicalize_strips_fbclid_and_gclid() {
        let link = canonicalize_link("https://example.com/p?fbclid=abc&gclid=def&x=1");
        assert_eq!(link, "https://example.com/p?x=1");
    }

    #[test]
    fn test_canonicalize_drops_query_when_all_tracking() {
        let link = canonicalize_link("https://example.com/p?utm_campaign=weekly");
        assert_eq!(link, "https://example.com/p");
    }

    #[test]
    fn test_canonicalize_unwraps_google_news() {
        let wrapped =
            "https://news.google.com/rss/articles/CBMi?url=https://example.com/a&hl=en";
        assert_eq!(canonicalize_link(wrapped), "https://example.com/a");
    }

    #[test]
    fn test_canonicalize_passes_garbage_through() {
        assert_eq!(canonicalize_link("  not a url  "), "not a url");
    }

    #[test]
    fn test_first_external_url_skips_redirectors() {
        let html = r#"<a href="https://news.google.com/x">via</a> then
            <a href="https://rave.cz/clanek">story</a>"#;
        assert_eq!(
            first_external_url(html).as_deref(),
            Some("https://rave.cz/clanek")
        );
    }

    #[test]
    fn test_first_external_url_none_without_candidates() {
        assert_eq!(first_external_url("<p>no links here</p>"), None);
    }

    #[test]
    fn test_strip_html() {
        let s = "<p>Liquid&nbsp;set &amp; <b>live</b>\n\nstream</p>";
        assert_eq!(strip_html(s), "Liquid set & live stream");
    }

    #[test]
    fn test_truncate_summary_multibyte_safe() {
        let s = "Páteční noc plná belgického neurofunku";
        let out = truncate_summary(s, 10);
        assert_eq!(out.chars().count(), 11);
        assert!(out.ends_with('…'));
        assert_eq!(truncate_summary("short", 10), "short");
    }
}
