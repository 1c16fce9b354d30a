//! Generic RSS 2.0 / Atom feed scraping and entry normalization.
//!
//! Feeds come in two shapes worth supporting (RSS 2.0 channels and Atom
//! feeds) with inconsistent date fields and HTML-laden summaries. Everything
//! is deserialized with quick-xml into small serde structs, then mapped to
//! the canonical [`Item`] by [`normalize_entry`]: HTML stripped, summary
//! truncated, link canonicalized, timestamp parsed best-effort.

use crate::fetch;
use crate::filter;
use crate::models::{Item, ItemKind, Section};
use crate::scrapers::FeedSpec;
use crate::utils::{canonicalize_link, strip_html, truncate_summary};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};

/// Summaries are truncated to this many characters after HTML stripping.
const SUMMARY_MAX_CHARS: usize = 280;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

// Atom text constructs can carry a type attribute, so plain String fields
// will not do here.
#[derive(Debug, Deserialize, Default)]
struct TextValue {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<TextValue>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<TextValue>,
    content: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// An entry as parsed from a feed, before normalization.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub summary_html: String,
    pub published: Option<String>,
}

/// Parse a feed document, detecting RSS vs. Atom from the root element.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>, Box<dyn Error>> {
    let rss_pos = xml.find("<rss");
    let atom_pos = xml.find("<feed");
    match (rss_pos, atom_pos) {
        (Some(r), Some(a)) if a < r => parse_atom(xml),
        (Some(_), _) => parse_rss(xml),
        (None, Some(_)) => parse_atom(xml),
        (None, None) => Err("not an RSS or Atom document".into()),
    }
}

fn parse_rss(xml: &str) -> Result<Vec<RawEntry>, Box<dyn Error>> {
    let rss: Rss = from_str(xml)?;
    let out = rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let link = item.link?;
            Some(RawEntry {
                title: item.title.unwrap_or_default(),
                link,
                summary_html: item.description.unwrap_or_default(),
                published: item.pub_date,
            })
        })
        .collect();
    Ok(out)
}

fn parse_atom(xml: &str) -> Result<Vec<RawEntry>, Box<dyn Error>> {
    let feed: AtomFeed = from_str(xml)?;
    let out = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry
                .links
                .iter()
                .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                .or(entry.links.first())
                .and_then(|l| l.href.clone())?;
            let summary = entry
                .summary
                .and_then(|t| t.value)
                .or(entry.content.and_then(|t| t.value))
                .unwrap_or_default();
            Some(RawEntry {
                title: entry.title.and_then(|t| t.value).unwrap_or_default(),
                link,
                summary_html: summary,
                published: entry.published.or(entry.updated),
            })
        })
        .collect();
    Ok(out)
}

/// Best-effort timestamp parse across the formats feeds actually emit.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

/// Map a raw feed entry onto the canonical [`Item`].
///
/// Entries without a usable title are dropped. A missing or unparseable
/// timestamp is kept as `None`; the window selector excludes those from
/// weekly sections.
pub fn normalize_entry(
    raw: RawEntry,
    source_label: &str,
    section: Section,
    kind: ItemKind,
) -> Option<Item> {
    let title = strip_html(&raw.title);
    if title.is_empty() {
        return None;
    }
    Some(Item {
        title,
        summary: truncate_summary(&strip_html(&raw.summary_html), SUMMARY_MAX_CHARS),
        link: canonicalize_link(&raw.link),
        timestamp: raw.published.as_deref().and_then(parse_timestamp),
        source_label: source_label.to_string(),
        section,
        kind,
    })
}

/// Fetch and normalize one registry feed.
#[instrument(level = "info", skip_all, fields(source = %spec.source))]
pub async fn fetch_feed(spec: &FeedSpec) -> Result<Vec<Item>, Box<dyn Error>> {
    let body = fetch::get_text(spec.url).await?;
    let entries = parse_feed(&body)?;
    let items: Vec<Item> = entries
        .into_iter()
        .filter_map(|raw| normalize_entry(raw, spec.source, spec.section, ItemKind::News))
        .collect();
    info!(count = items.len(), url = %spec.url, "Fetched feed");
    Ok(items)
}

/// Fetch an ad-hoc feed URL from `EXTRA_FEED_URLS`.
///
/// The source label is the feed host and each item's section comes from its
/// own link region, since nothing else is known about the feed.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_extra_feed(url: &str) -> Result<Vec<Item>, Box<dyn Error>> {
    let label = filter::domain_of(url).unwrap_or_else(|| "extra".to_string());
    let body = fetch::get_text(url).await?;
    let entries = parse_feed(&body)?;
    let items: Vec<Item> = entries
        .into_iter()
        .filter_map(|raw| {
            let section = filter::region_for_link(&raw.link);
            normalize_entry(raw, &label, section, ItemKind::News)
        })
        .collect();
    info!(count = items.len(), "Fetched extra feed");
    Ok(items)
}
