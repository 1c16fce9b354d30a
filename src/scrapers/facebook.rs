//! Facebook Graph API scraper for promoter/label page posts.
//!
//! Disabled unless both an access token and a page list are configured; the
//! scheduled run passes them through `FB_GRAPH_TOKEN` / `FB_PAGE_IDS`. Each
//! page's recent posts become social items linked by their permalink.

use crate::fetch;
use crate::models::{Item, ItemKind, Section};
use crate::scrapers::rss::parse_timestamp;
use crate::utils::{canonicalize_link, truncate_summary};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, info, instrument, warn};

const GRAPH_BASE: &str = "https://graph.facebook.com/v19.0";
const POSTS_PER_PAGE: usize = 10;
const TITLE_MAX_CHARS: usize = 120;
const SUMMARY_MAX_CHARS: usize = 280;

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    data: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    message: Option<String>,
    permalink_url: Option<String>,
    created_time: Option<String>,
}

/// Graph timestamps use a colon-less offset (`+0000`) that RFC 3339 parsers
/// reject.
fn parse_graph_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| parse_timestamp(s))
}

fn post_to_item(post: Post, page: &str) -> Option<Item> {
    let message = post.message?;
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    let link = canonicalize_link(&post.permalink_url?);
    let title = truncate_summary(message.lines().next().unwrap_or(message), TITLE_MAX_CHARS);
    Some(Item {
        title,
        summary: truncate_summary(message, SUMMARY_MAX_CHARS),
        link,
        timestamp: post.created_time.as_deref().and_then(parse_graph_time),
        source_label: format!("facebook/{}", page),
        section: Section::Social,
        kind: ItemKind::Opinion,
    })
}

/// Fetch recent posts from each configured page.
///
/// Returns an empty list when the scraper is not configured.
#[instrument(level = "info", skip_all)]
pub async fn fetch_items(
    token: Option<&str>,
    pages: Option<&str>,
) -> Result<Vec<Item>, Box<dyn Error>> {
    let (Some(token), Some(pages)) = (token, pages) else {
        debug!("Facebook scraper disabled (no token or pages configured)");
        return Ok(Vec::new());
    };

    let mut items = Vec::new();
    for page in pages.split([',', ' ']).filter(|p| !p.trim().is_empty()) {
        let page = page.trim();
        let url = format!(
            "{}/{}/posts?fields=message,permalink_url,created_time&limit={}&access_token={}",
            GRAPH_BASE, page, POSTS_PER_PAGE, token
        );
        let body = match fetch::get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(%page, error = %e, "Graph API request failed");
                continue;
            }
        };
        match serde_json::from_str::<PostsResponse>(&body) {
            Ok(response) => {
                let before = items.len();
                items.extend(response.data.into_iter().filter_map(|p| post_to_item(p, page)));
                info!(%page, count = items.len() - before, "Fetched Facebook page posts");
            }
            Err(e) => warn!(%page, error = %e, "Graph API response unparseable"),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_graph_time_colonless_offset() {
        let ts = parse_graph_time("2026-08-04T20:15:00+0000").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-08-04T20:15:00+00:00");
    }

    #[test]
    fn test_post_to_item() {
        let post = Post {
            message: Some("Tickets for the autumn tour are live!\nLink in bio.".to_string()),
            permalink_url: Some("https://www.facebook.com/hospitalitydnb/posts/1?fbclid=x".to_string()),
            created_time: Some("2026-08-04T20:15:00+0000".to_string()),
        };
        let item = post_to_item(post, "hospitalitydnb").unwrap();
        assert_eq!(item.title, "Tickets for the autumn tour are live!");
        assert_eq!(item.link, "https://www.facebook.com/hospitalitydnb/posts/1");
        assert_eq!(item.source_label, "facebook/hospitalitydnb");
        assert_eq!(item.section, Section::Social);
    }

    #[test]
    fn test_post_without_message_is_dropped() {
        let post = Post {
            message: None,
            permalink_url: Some("https://www.facebook.com/x/posts/2".to_string()),
            created_time: None,
        };
        assert!(post_to_item(post, "x").is_none());
    }

    #[tokio::test]
    async fn test_disabled_without_credentials() {
        let items = fetch_items(None, None).await.unwrap();
        assert!(items.is_empty());
    }
}
