//! Markdown rendering with numbered, deduplicated citations.
//!
//! Section order is fixed: Tuzemsko, Ze světa, Reddit, Kuriozita, Akce.
//! Every item cites its link as `[n]`; links are numbered in order of first
//! appearance and deduplicated, and the trailing "Zdroje" list resolves the
//! numbers. Empty sections render the placeholder instead of disappearing,
//! and the "Tento týden" events heading is emitted even when empty.

use crate::models::{Briefing, Event, Item};
use crate::select::fmt_dm;
use std::collections::HashMap;
use std::fmt::Write;

/// Placeholder for sections with nothing to report.
const EMPTY_SECTION: &str = "_bez položek_";

/// Citation collector: links numbered by first appearance, duplicates folded.
#[derive(Debug, Default)]
pub struct Citations {
    links: Vec<String>,
    index: HashMap<String, usize>,
}

impl Citations {
    /// Return the 1-based citation number for a link, assigning the next
    /// number on first sight.
    pub fn cite(&mut self, link: &str) -> usize {
        if let Some(&n) = self.index.get(link) {
            return n;
        }
        self.links.push(link.to_string());
        let n = self.links.len();
        self.index.insert(link.to_string(), n);
        n
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }
}

/// The rendered briefing: the full document plus the per-section blocks the
/// webhook payload reuses.
#[derive(Debug)]
pub struct Rendered {
    pub markdown: String,
    pub domestic: String,
    pub international: String,
    pub social: String,
    pub curiosity: String,
    pub events: String,
    pub references: Vec<String>,
}

fn item_lines(items: &[Item], citations: &mut Citations) -> String {
    if items.is_empty() {
        return format!("{}\n", EMPTY_SECTION);
    }
    let mut out = String::new();
    for item in items {
        let n = citations.cite(&item.link);
        if item.summary.is_empty() {
            writeln!(out, "- **{}** [{}]", item.title, n).unwrap();
        } else {
            writeln!(out, "- **{}** — {} [{}]", item.title, item.summary, n).unwrap();
        }
    }
    out
}

fn event_span(ev: &Event) -> String {
    if ev.end_date > ev.start_date {
        format!("{}\u{2009}–\u{2009}{}", fmt_dm(ev.start_date), fmt_dm(ev.end_date))
    } else {
        fmt_dm(ev.start_date)
    }
}

fn event_lines(events: &[Event], citations: &mut Citations) -> String {
    if events.is_empty() {
        return format!("{}\n", EMPTY_SECTION);
    }
    let mut out = String::new();
    for ev in events {
        let n = citations.cite(&ev.url);
        match &ev.location {
            Some(city) => {
                writeln!(out, "- **{}** ({}, {}) [{}]", ev.title, event_span(ev), city, n).unwrap()
            }
            None => writeln!(out, "- **{}** ({}) [{}]", ev.title, event_span(ev), n).unwrap(),
        }
    }
    out
}

/// Render the full briefing document.
pub fn render(briefing: &Briefing) -> Rendered {
    let mut citations = Citations::default();

    let domestic = item_lines(&briefing.domestic, &mut citations);
    let international = item_lines(&briefing.international, &mut citations);
    let social = item_lines(&briefing.social, &mut citations);
    let curiosity = match &briefing.curiosity {
        Some(item) => item_lines(std::slice::from_ref(item), &mut citations),
        None => format!("{}\n", EMPTY_SECTION),
    };
    let week_events = event_lines(&briefing.events, &mut citations);
    let newly = event_lines(&briefing.newly_announced, &mut citations);

    let mut md = String::new();
    writeln!(md, "# DnB Monday Briefing — týden {}", briefing.week_label).unwrap();
    writeln!(
        md,
        "**Období:** {}\u{2009}–\u{2009}{}\n",
        briefing.period_from, briefing.period_to
    )
    .unwrap();

    writeln!(md, "## Tuzemsko\n{}", domestic).unwrap();
    writeln!(md, "## Ze světa\n{}", international).unwrap();
    writeln!(md, "## Reddit\n{}", social).unwrap();
    writeln!(md, "## Kuriozita\n{}", curiosity).unwrap();

    writeln!(md, "## Akce\n### Tento týden\n{}", week_events).unwrap();
    writeln!(md, "### Nově oznámeno\n{}", newly).unwrap();

    writeln!(md, "---").unwrap();
    writeln!(md, "### Zdroje").unwrap();
    if citations.links().is_empty() {
        writeln!(md, "{}", EMPTY_SECTION).unwrap();
    } else {
        for (i, link) in citations.links().iter().enumerate() {
            writeln!(md, "{}. {}", i + 1, link).unwrap();
        }
    }

    let events_block = format!("### Tento týden\n{}### Nově oznámeno\n{}", week_events, newly);
    Rendered {
        markdown: md,
        domestic,
        international,
        social,
        curiosity,
        events: events_block,
        references: citations.links().to_vec(),
    }
}
