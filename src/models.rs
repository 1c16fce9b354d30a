//! Data models for briefing items, calendar events, and run reporting.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Item`]: A normalized news/social entry produced by the scrapers
//! - [`Event`]: A structured calendar entry for a live show or festival
//! - [`Briefing`]: The fully selected content for one weekly edition
//! - [`SourceReport`]: Per-source fetch statistics surfaced at the end of a run
//!
//! Items carry a [`Section`] (region bucket) and an [`ItemKind`] so the window
//! selector can route them without re-running the classifier.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Region bucket an item is rendered under.
///
/// Domestic means the Czech scene; everything else is international. Social
/// covers community posts (subreddits, forum threads, Facebook pages) which
/// get their own section regardless of region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Domestic,
    International,
    Social,
}

/// Editorial type of an item, guessed by the classifier.
///
/// `Curiosum` marks offbeat stories eligible for the one-slot curiosity pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    News,
    Opinion,
    Curiosum,
}

/// A normalized news or social entry.
///
/// Scrapers map heterogeneous feed shapes onto this struct; everything past
/// the scraper boundary works with `Item` only.
///
/// # Fields
///
/// * `title` - Entry headline, whitespace-collapsed
/// * `summary` - HTML-stripped, truncated description
/// * `link` - Canonicalized URL (tracking params removed, redirects unwrapped)
/// * `timestamp` - Best-effort parse of the entry's publication time; entries
///   without one are excluded from week-windowed sections
/// * `source_label` - Human-readable source name used in the reference list
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Item {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub source_label: String,
    pub section: Section,
    pub kind: ItemKind,
}

impl Item {
    /// Deduplication key: truncated hex SHA-256 of title + link.
    ///
    /// Two entries describing the same story through the same URL collide on
    /// this key; the selector keeps the most recent one.
    pub fn dedupe_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.title.trim().to_lowercase().as_bytes());
        hasher.update(self.link.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(16);
        for b in digest.iter().take(8) {
            use std::fmt::Write;
            write!(out, "{:02x}", b).unwrap();
        }
        out
    }
}

/// Priority tier assigned to an event from brand/headliner keyword lists.
///
/// When any `Top` or `Mid` events exist for a window, `Low` events are
/// dropped from the rendered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTier {
    Top,
    Mid,
    Low,
}

/// A structured calendar entry for a live show or festival.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Event {
    pub title: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub url: String,
    pub source_label: String,
    pub tier: EventTier,
    /// Date this event URL was first observed, filled in from the seen cache.
    pub first_seen: Option<NaiveDate>,
}

impl Event {
    /// Construct an event, enforcing `end_date >= start_date`.
    ///
    /// A missing end date defaults to the start date. Reversed dates (some
    /// sources emit them swapped) are silently corrected.
    pub fn new(
        title: String,
        location: Option<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        url: String,
        source_label: String,
    ) -> Self {
        let mut end = end_date.unwrap_or(start_date);
        let mut start = start_date;
        if end < start {
            std::mem::swap(&mut start, &mut end);
        }
        Event {
            title,
            location,
            start_date: start,
            end_date: end,
            url,
            source_label,
            tier: EventTier::Low,
            first_seen: None,
        }
    }
}

/// The fully selected content for one weekly edition.
///
/// Produced in memory by the pipeline and handed to the renderers; output
/// files are only written once this struct is complete.
#[derive(Debug, Clone, Serialize)]
pub struct Briefing {
    /// ISO week label, e.g. `2026-W32`.
    pub week_label: String,
    /// Formatted period start, e.g. `3. 8.`.
    pub period_from: String,
    /// Formatted period end, e.g. `9. 8. 2026`.
    pub period_to: String,
    pub domestic: Vec<Item>,
    pub international: Vec<Item>,
    pub social: Vec<Item>,
    pub curiosity: Option<Item>,
    pub events: Vec<Event>,
    pub newly_announced: Vec<Event>,
    /// Sorted unique source labels of everything that contributed.
    pub sources: Vec<String>,
}

/// Per-source fetch statistics for the end-of-run summary.
///
/// A failing source degrades output instead of aborting the run, so these
/// rows are the only place a source going dark becomes visible.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub fetched: usize,
    pub kept: usize,
    pub failed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(title: &str, link: &str) -> Item {
        Item {
            title: title.to_string(),
            summary: String::new(),
            link: link.to_string(),
            timestamp: None,
            source_label: "test".to_string(),
            section: Section::International,
            kind: ItemKind::News,
        }
    }

    #[test]
    fn test_dedupe_key_is_stable_and_truncated() {
        let a = item("Hospitality announce autumn tour", "https://example.com/a");
        let b = item("Hospitality announce autumn tour", "https://example.com/a");
        assert_eq!(a.dedupe_key(), b.dedupe_key());
        assert_eq!(a.dedupe_key().len(), 16);
    }

    #[test]
    fn test_dedupe_key_ignores_title_case_and_padding() {
        let a = item("  Neurofunk Night  ", "https://example.com/x");
        let b = item("neurofunk night", "https://example.com/x");
        assert_eq!(a.dedupe_key(), b.dedupe_key());
    }

    #[test]
    fn test_dedupe_key_differs_on_link() {
        let a = item("Same title", "https://example.com/1");
        let b = item("Same title", "https://example.com/2");
        assert_ne!(a.dedupe_key(), b.dedupe_key());
    }

    #[test]
    fn test_event_end_defaults_to_start() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let ev = Event::new(
            "Club night".to_string(),
            None,
            d,
            None,
            "https://example.com/e".to_string(),
            "calendar".to_string(),
        );
        assert_eq!(ev.start_date, d);
        assert_eq!(ev.end_date, d);
    }

    #[test]
    fn test_event_swaps_reversed_dates() {
        let start = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let ev = Event::new(
            "Festival".to_string(),
            Some("Brno".to_string()),
            start,
            Some(end),
            "https://example.com/f".to_string(),
            "calendar".to_string(),
        );
        assert!(ev.end_date >= ev.start_date);
        assert_eq!(ev.start_date, end);
        assert_eq!(ev.end_date, start);
    }

    #[test]
    fn test_section_serde_lowercase() {
        let json = serde_json::to_string(&Section::Domestic).unwrap();
        assert_eq!(json, "\"domestic\"");
    }
}
