//! Subreddit scraper for the social section.
//!
//! Reddit serves Atom feeds at `/r/<name>/.rss`; entries become social items
//! tagged `r/<name>`. Posts are opinions by default — the classifier may
//! promote one to the curiosity pick.

use crate::fetch;
use crate::models::{Item, ItemKind, Section};
use crate::scrapers::rss::{normalize_entry, parse_feed};
use std::error::Error;
use tracing::{info, instrument, warn};

fn feed_url(subreddit: &str) -> String {
    format!("https://www.reddit.com/r/{}/.rss", subreddit)
}

/// Fetch all configured subreddits, skipping any that fail.
#[instrument(level = "info", skip_all)]
pub async fn fetch_items(subreddits: &[&str]) -> Result<Vec<Item>, Box<dyn Error>> {
    let mut items = Vec::new();
    for sub in subreddits {
        let label = format!("r/{}", sub);
        let body = match fetch::get_text(&feed_url(sub)).await {
            Ok(body) => body,
            Err(e) => {
                warn!(subreddit = %sub, error = %e, "Subreddit fetch failed");
                continue;
            }
        };
        match parse_feed(&body) {
            Ok(entries) => {
                let before = items.len();
                items.extend(entries.into_iter().filter_map(|raw| {
                    normalize_entry(raw, &label, Section::Social, ItemKind::Opinion)
                }));
                info!(subreddit = %sub, count = items.len() - before, "Fetched subreddit feed");
            }
            Err(e) => warn!(subreddit = %sub, error = %e, "Subreddit feed unparseable"),
        }
    }
    Ok(items)
}
