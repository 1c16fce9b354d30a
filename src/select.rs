//! Week windowing, deduplication, and section selection.
//!
//! The selector receives the full filtered item pool and reduces it to the
//! per-section lists of one [`Briefing`](crate::models::Briefing):
//!
//! 1. Sort newest-first and deduplicate by the truncated title+link hash,
//!    so the most recent of duplicate stories wins.
//! 2. Keep items whose timestamp falls inside the Monday–Sunday window.
//!    Items without a resolvable timestamp cannot be placed in a period and
//!    never enter a windowed section.
//! 3. Cap each section; when the international section is short, the caller
//!    fetches secondary sources and [`top_up`] fills the gap from a wider
//!    lookback window without duplicating an already-selected key.

use crate::models::{Item, ItemKind, Section};
use chrono::{Datelike, Duration, NaiveDate};
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{info, warn};

/// Per-section caps, matching the weekly payload layout.
pub const CAP_DOMESTIC: usize = 5;
pub const CAP_INTERNATIONAL: usize = 5;
pub const CAP_SOCIAL: usize = 2;

/// Minimum counts the selector tries to reach before giving up on a section.
pub const MIN_DOMESTIC: usize = 3;
pub const MIN_INTERNATIONAL: usize = 3;

/// Lookback for the secondary-source top-up, in days before the window end.
pub const FALLBACK_LOOKBACK_DAYS: i64 = 21;

/// The Monday–Sunday week of interest.
#[derive(Debug, Clone)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// ISO week label of the Monday, e.g. `2026-W32`.
    pub label: String,
}

/// Monday and Sunday of the week containing `anchor`.
pub fn week_bounds(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = anchor - Duration::days(i64::from(anchor.weekday().num_days_from_monday()));
    (start, start + Duration::days(6))
}

/// Build the [`WeekWindow`] for an anchor date.
pub fn week_window(anchor: NaiveDate) -> WeekWindow {
    let (start, end) = week_bounds(anchor);
    let iso = start.iso_week();
    WeekWindow {
        start,
        end,
        label: format!("{}-W{:02}", iso.year(), iso.week()),
    }
}

/// Resolve the `--week` argument to an anchor date.
///
/// `latest` (or anything unparseable, with a warning) anchors on today.
pub fn resolve_anchor(week: &str, today: NaiveDate) -> NaiveDate {
    if week == "latest" {
        return today;
    }
    match NaiveDate::parse_from_str(week, "%Y-%m-%d") {
        Ok(d) => d,
        Err(e) => {
            warn!(%week, error = %e, "Unparseable --week anchor, using today");
            today
        }
    }
}

/// `D. M.` formatting used in the briefing header.
pub fn fmt_dm(d: NaiveDate) -> String {
    format!("{}. {}.", d.day(), d.month())
}

/// `D. M. YYYY` formatting used in the briefing header.
pub fn fmt_dmy(d: NaiveDate) -> String {
    format!("{}. {}. {}", d.day(), d.month(), d.year())
}

fn in_window(item: &Item, window: &WeekWindow) -> bool {
    match item.timestamp {
        Some(ts) => {
            let d = ts.date_naive();
            d >= window.start && d <= window.end
        }
        None => false,
    }
}

/// Sort newest-first and collapse duplicate (title, link) hashes.
///
/// Entries without a timestamp sort last, so a dated copy of a story always
/// beats an undated one.
pub fn dedupe_newest_first(mut items: Vec<Item>) -> Vec<Item> {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items
        .into_iter()
        .unique_by(|item| item.dedupe_key())
        .collect()
}

/// The per-section result of window selection.
#[derive(Debug, Default)]
pub struct Selection {
    pub domestic: Vec<Item>,
    pub international: Vec<Item>,
    pub social: Vec<Item>,
    pub curiosity: Option<Item>,
    /// Dedupe keys of everything selected, used to guard the top-up.
    pub keys: HashSet<String>,
}

/// Bucket the deduplicated pool into capped, in-window section lists.
pub fn select_for_week(items: Vec<Item>, window: &WeekWindow) -> Selection {
    let deduped = dedupe_newest_first(items);
    let mut sel = Selection::default();

    for item in deduped {
        if !in_window(&item, window) {
            continue;
        }
        let key = item.dedupe_key();
        if sel.keys.contains(&key) {
            continue;
        }
        match item.section {
            Section::Domestic if sel.domestic.len() < CAP_DOMESTIC => {
                sel.keys.insert(key);
                sel.domestic.push(item);
            }
            Section::International if sel.international.len() < CAP_INTERNATIONAL => {
                sel.keys.insert(key);
                sel.international.push(item);
            }
            Section::Social if sel.social.len() < CAP_SOCIAL => {
                sel.keys.insert(key);
                sel.social.push(item);
            }
            _ => {}
        }
    }

    info!(
        domestic = sel.domestic.len(),
        international = sel.international.len(),
        social = sel.social.len(),
        "Window selection done"
    );
    sel
}

/// Pick the curiosity item from the deduplicated pool.
///
/// Prefers an in-window curiosum that no section already selected; the slot
/// stays empty otherwise.
pub fn pick_curiosity(pool: &[Item], window: &WeekWindow, selected: &HashSet<String>) -> Option<Item> {
    pool.iter()
        .find(|item| {
            item.kind == ItemKind::Curiosum
                && in_window(item, window)
                && !selected.contains(&item.dedupe_key())
        })
        .cloned()
}

/// Top up a short section from secondary-source candidates.
///
/// Candidates are admitted newest-first from the wider lookback window
/// ending at the window end, skipping any dedupe key already selected.
/// Stops once the section reaches `target` (or `cap`, whichever is lower).
pub fn top_up(
    section: &mut Vec<Item>,
    candidates: Vec<Item>,
    selected: &mut HashSet<String>,
    window: &WeekWindow,
    target: usize,
    cap: usize,
) -> usize {
    let target = target.min(cap);
    if section.len() >= target {
        return 0;
    }
    let floor = window.end - Duration::days(FALLBACK_LOOKBACK_DAYS);
    let mut added = 0;

    for item in dedupe_newest_first(candidates) {
        if section.len() >= target {
            break;
        }
        let Some(ts) = item.timestamp else { continue };
        let d = ts.date_naive();
        if d < floor || d > window.end {
            continue;
        }
        let key = item.dedupe_key();
        if !selected.insert(key) {
            continue;
        }
        section.push(item);
        added += 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc, Weekday};

    fn item_at(title: &str, link: &str, section: Section, day: Option<(i32, u32, u32)>) -> Item {
        Item {
            title: title.to_string(),
            summary: String::new(),
            link: link.to_string(),
            timestamp: day.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()),
            source_label: "test".to_string(),
            section,
            kind: ItemKind::News,
        }
    }

    #[test]
    fn test_week_bounds_properties() {
        for (y, m, d) in [(2026, 8, 3), (2026, 8, 6), (2026, 8, 9), (2024, 2, 29), (2026, 1, 1)] {
            let anchor = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let (start, end) = week_bounds(anchor);
            assert_eq!(start.weekday(), Weekday::Mon);
            assert_eq!(end - start, Duration::days(6));
            assert!(start <= anchor && anchor <= end);
        }
    }

    #[test]
    fn test_week_label_iso() {
        let w = week_window(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        // 2026-01-01 falls into ISO week 1 of 2026; the Monday is 2025-12-29.
        assert_eq!(w.label, "2026-W01");
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2025, 12, 29).unwrap());
    }

    #[test]
    fn test_resolve_anchor() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(resolve_anchor("latest", today), today);
        assert_eq!(
            resolve_anchor("2026-07-20", today),
            NaiveDate::from_ymd_opt(2026, 7, 20).unwrap()
        );
        assert_eq!(resolve_anchor("garbage", today), today);
    }

    #[test]
    fn test_dedupe_keeps_latest() {
        let older = item_at("Same story", "https://e.com/a", Section::International, Some((2026, 8, 3)));
        let newer = item_at("Same story", "https://e.com/a", Section::International, Some((2026, 8, 5)));
        let out = dedupe_newest_first(vec![older, newer]);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].timestamp.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
        );
    }

    #[test]
    fn test_undated_items_never_selected() {
        let window = week_window(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        let undated = item_at("No date", "https://e.com/u", Section::Domestic, None);
        let sel = select_for_week(vec![undated], &window);
        assert!(sel.domestic.is_empty());
    }

    #[test]
    fn test_window_selection_keeps_in_week_newest_first() {
        let window = week_window(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        let items = vec![
            item_at("in 1", "https://e.com/1", Section::Domestic, Some((2026, 8, 3))),
            item_at("in 2", "https://e.com/2", Section::Domestic, Some((2026, 8, 5))),
            item_at("in 3", "https://e.com/3", Section::Domestic, Some((2026, 8, 4))),
            item_at("before", "https://e.com/4", Section::Domestic, Some((2026, 7, 28))),
            item_at("after", "https://e.com/5", Section::Domestic, Some((2026, 8, 12))),
        ];
        let sel = select_for_week(items, &window);
        let titles: Vec<&str> = sel.domestic.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["in 2", "in 3", "in 1"]);
    }

    #[test]
    fn test_section_caps_enforced() {
        let window = week_window(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        let items: Vec<Item> = (0..8)
            .map(|i| {
                item_at(
                    &format!("story {i}"),
                    &format!("https://e.com/{i}"),
                    Section::International,
                    Some((2026, 8, 4)),
                )
            })
            .collect();
        let sel = select_for_week(items, &window);
        assert_eq!(sel.international.len(), CAP_INTERNATIONAL);
    }

    #[test]
    fn test_top_up_respects_selected_keys_and_lookback() {
        let window = week_window(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        let already = item_at("kept", "https://e.com/k", Section::International, Some((2026, 8, 4)));
        let mut selected: HashSet<String> = HashSet::from([already.dedupe_key()]);
        let mut section = vec![already.clone()];

        let candidates = vec![
            // duplicate of the already-selected item
            item_at("kept", "https://e.com/k", Section::International, Some((2026, 8, 4))),
            // inside the lookback
            item_at("fresh", "https://e.com/f", Section::International, Some((2026, 7, 30))),
            // far outside the lookback
            item_at("stale", "https://e.com/s", Section::International, Some((2026, 5, 1))),
            // undated never tops up
            item_at("undated", "https://e.com/u", Section::International, None),
        ];

        let added = top_up(
            &mut section,
            candidates,
            &mut selected,
            &window,
            MIN_INTERNATIONAL,
            CAP_INTERNATIONAL,
        );
        assert_eq!(added, 1);
        assert_eq!(section.len(), 2);
        assert!(section.iter().any(|i| i.title == "fresh"));
        assert!(!section.iter().any(|i| i.title == "stale"));
    }

    #[test]
    fn test_curiosity_pick_prefers_unselected() {
        let window = week_window(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        let mut cur = item_at("Odd one", "https://e.com/odd", Section::International, Some((2026, 8, 4)));
        cur.kind = ItemKind::Curiosum;
        let pool = vec![cur.clone()];

        let empty = HashSet::new();
        assert!(pick_curiosity(&pool, &window, &empty).is_some());

        let taken = HashSet::from([cur.dedupe_key()]);
        assert!(pick_curiosity(&pool, &window, &taken).is_none());
    }
}
