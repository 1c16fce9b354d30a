//! Event post-processing: priority tiers, week overlap, newly-announced list.
//!
//! The calendar scrapers hand over raw [`Event`]s; this module assigns each a
//! priority tier from brand/headliner keyword lists, drops low-tier noise
//! when anything better exists, and diffs against the seen cache to build the
//! "newly announced" sub-list.

use crate::cache::{self, SeenCache};
use crate::models::{Event, EventTier};
use crate::select::WeekWindow;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use tracing::info;

/// Events first seen within this many trailing days count as newly announced.
pub const NEWLY_ANNOUNCED_DAYS: i64 = 10;

/// Festival brands and headliners that always headline the events section.
const TOP_TIER_KEYWORDS: [&str; 8] = [
    "let it roll",
    "hospitality",
    "rampage",
    "liquicity",
    "beats for love",
    "noisia",
    "andy c",
    "camo & krooked",
];

/// Established clubs and series worth listing below the big brands.
const MID_TIER_KEYWORDS: [&str; 6] = [
    "roxy",
    "storm club",
    "cross club",
    "imagination",
    "korsakov",
    "blackout",
];

fn tier_for(ev: &Event) -> EventTier {
    let text = format!(
        "{} {}",
        ev.title.to_lowercase(),
        ev.location.as_deref().unwrap_or("").to_lowercase()
    );
    if TOP_TIER_KEYWORDS.iter().any(|k| text.contains(k)) {
        EventTier::Top
    } else if MID_TIER_KEYWORDS.iter().any(|k| text.contains(k)) {
        EventTier::Mid
    } else {
        EventTier::Low
    }
}

/// Deduplicate by URL, assign tiers, and sort by (start date, tier).
pub fn prepare(events: Vec<Event>) -> Vec<Event> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<Event> = events
        .into_iter()
        .filter(|ev| seen.insert(ev.url.clone()))
        .map(|mut ev| {
            ev.tier = tier_for(&ev);
            ev
        })
        .collect();
    out.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.tier.cmp(&b.tier)));
    out
}

/// Drop low-tier events when any higher-tier event exists.
pub fn drop_low_tier(events: Vec<Event>) -> Vec<Event> {
    let has_better = events.iter().any(|ev| ev.tier != EventTier::Low);
    if !has_better {
        return events;
    }
    let before = events.len();
    let kept: Vec<Event> = events
        .into_iter()
        .filter(|ev| ev.tier != EventTier::Low)
        .collect();
    info!(dropped = before - kept.len(), "Dropped low-tier events");
    kept
}

/// Does the event overlap the Monday–Sunday window at all?
pub fn overlaps_week(ev: &Event, window: &WeekWindow) -> bool {
    ev.start_date <= window.end && ev.end_date >= window.start
}

/// Fill `first_seen` on each event from the cache, inserting unknown URLs
/// with today's date.
pub fn mark_first_seen(events: &mut [Event], cache: &mut SeenCache, today: NaiveDate) {
    for ev in events.iter_mut() {
        ev.first_seen = Some(cache::record_first_seen(cache, &ev.url, today));
    }
}

/// Events whose URL first appeared within the trailing announcement window.
pub fn newly_announced(events: &[Event], today: NaiveDate) -> Vec<Event> {
    let floor = today - Duration::days(NEWLY_ANNOUNCED_DAYS);
    events
        .iter()
        .filter(|ev| ev.first_seen.is_some_and(|d| d >= floor && d <= today))
        .cloned()
        .collect()
}
