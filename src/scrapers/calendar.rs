//! Event calendar extraction.
//!
//! Calendar pages are wildly inconsistent, so extraction runs an ordered list
//! of strategies and takes the first that yields anything:
//!
//! 1. **JSON-LD** — `<script type="application/ld+json">` blocks, including
//!    array and `@graph` shapes.
//! 2. **Embedded JSON** — other `<script>` blocks carrying a state blob
//!    (`window.__DATA__ = {...}`); the blob is searched recursively for
//!    event-shaped objects.
//! 3. **DOM heuristics** — pages with a month header get their anchors
//!    scanned for `D. M.` date tokens; the trailing text is the title and a
//!    hashtag-like token the city.
//!
//! Field extraction for the JSON strategies goes through alias lists because
//! no two sites agree on key names. Structured keys are tried in order;
//! whatever parses first wins.

use crate::fetch;
use crate::models::Event;
use crate::scrapers::EventPageSpec;
use crate::utils::canonicalize_link;
use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

const NAME_KEYS: [&str; 4] = ["name", "title", "eventName", "summary"];
const START_KEYS: [&str; 7] = [
    "startDate",
    "start_date",
    "start",
    "dateStart",
    "date_from",
    "startTime",
    "date",
];
const END_KEYS: [&str; 6] = [
    "endDate",
    "end_date",
    "end",
    "dateEnd",
    "date_to",
    "endTime",
];
const URL_KEYS: [&str; 4] = ["url", "link", "permalink", "href"];
const LOCATION_KEYS: [&str; 5] = ["location", "venue", "place", "city", "address"];

const MONTH_NAMES: [&str; 24] = [
    "leden", "únor", "březen", "duben", "květen", "červen", "červenec", "srpen", "září",
    "říjen", "listopad", "prosinec", "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Fetch one calendar page and extract its events.
#[instrument(level = "info", skip_all, fields(source = %page.source))]
pub async fn fetch_events(
    page: &EventPageSpec,
    today: NaiveDate,
) -> Result<Vec<Event>, Box<dyn Error>> {
    let body = fetch::get_text(page.url).await?;
    let events = extract_events(&body, page, today);
    info!(count = events.len(), url = %page.url, "Extracted events");
    Ok(events)
}

/// Run the extraction strategies in order over a fetched page body.
pub fn extract_events(html: &str, page: &EventPageSpec, today: NaiveDate) -> Vec<Event> {
    let doc = Html::parse_document(html);
    let base = Url::parse(page.url).ok();

    let events = extract_json_ld(&doc, base.as_ref(), page);
    if !events.is_empty() {
        debug!(count = events.len(), "JSON-LD extraction hit");
        return events;
    }
    let events = extract_embedded_json(&doc, base.as_ref(), page);
    if !events.is_empty() {
        debug!(count = events.len(), "Embedded-JSON extraction hit");
        return events;
    }
    extract_dom(&doc, base.as_ref(), page, today)
}

// --- strategy 1: JSON-LD ---------------------------------------------------

fn extract_json_ld(doc: &Html, base: Option<&Url>, page: &EventPageSpec) -> Vec<Event> {
    let sel = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    let mut events = Vec::new();

    for node in doc.select(&sel) {
        let text: String = node.text().collect();
        let Ok(json) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        let mut candidates: Vec<&Value> = Vec::new();
        collect_event_objects(&json, &mut candidates);
        for value in candidates {
            if let Some(ev) = event_from_value(value, base, page) {
                events.push(ev);
            }
        }
    }
    events
}

/// Recursively search a JSON structure for dict-shaped records that look
/// like events: an `@type` containing "Event", or a name plus a
/// start-date-like key from the alias list.
fn collect_event_objects<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if looks_like_event(map) {
                out.push(value);
            } else {
                for v in map.values() {
                    collect_event_objects(v, out);
                }
            }
        }
        Value::Array(arr) => {
            for v in arr {
                collect_event_objects(v, out);
            }
        }
        _ => {}
    }
}

fn looks_like_event(map: &serde_json::Map<String, Value>) -> bool {
    if let Some(t) = map.get("@type").and_then(Value::as_str) {
        if t.to_lowercase().contains("event") {
            return true;
        }
    }
    first_string(map, &NAME_KEYS).is_some()
        && first_string(map, &START_KEYS)
            .as_deref()
            .and_then(parse_event_date)
            .is_some()
}

fn first_string(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find_map(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
}

fn location_string(map: &serde_json::Map<String, Value>) -> Option<String> {
    for key in LOCATION_KEYS {
        match map.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Object(inner)) => {
                if let Some(name) = first_string(inner, &["name", "addressLocality", "city"]) {
                    return Some(name);
                }
            }
            _ => {}
        }
    }
    None
}

fn event_from_value(value: &Value, base: Option<&Url>, page: &EventPageSpec) -> Option<Event> {
    let map = value.as_object()?;
    let title = first_string(map, &NAME_KEYS)?;
    let start = parse_event_date(&first_string(map, &START_KEYS)?)?;
    let end = first_string(map, &END_KEYS)
        .as_deref()
        .and_then(parse_event_date);

    let url = first_string(map, &URL_KEYS)
        .and_then(|raw| match base {
            Some(b) => b.join(&raw).ok().map(|u| u.to_string()),
            None => Some(raw),
        })
        .map(|u| canonicalize_link(&u))
        .unwrap_or_else(|| page.url.to_string());

    Some(Event::new(
        title,
        location_string(map),
        start,
        end,
        url,
        page.source.to_string(),
    ))
}

/// Parse the date formats calendar sources actually emit.
pub fn parse_event_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d", "%d.%m.%Y", "%d. %m. %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

// --- strategy 2: embedded JSON blobs ---------------------------------------

fn extract_embedded_json(doc: &Html, base: Option<&Url>, page: &EventPageSpec) -> Vec<Event> {
    let sel = Selector::parse("script:not([src])").unwrap();
    let mut events = Vec::new();

    for node in doc.select(&sel) {
        if node.value().attr("type") == Some("application/ld+json") {
            continue;
        }
        let text: String = node.text().collect();
        let Some(json) = parse_state_blob(&text) else {
            continue;
        };
        let mut candidates: Vec<&Value> = Vec::new();
        collect_event_objects(&json, &mut candidates);
        for value in candidates {
            if let Some(ev) = event_from_value(value, base, page) {
                events.push(ev);
            }
        }
    }
    events
}

/// Pull a JSON object out of an inline state assignment like
/// `window.__DATA__ = {...};`.
fn parse_state_blob(script: &str) -> Option<Value> {
    let start = script.find('{')?;
    let end = script.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&script[start..=end]).ok()
}

// --- strategy 3: DOM heuristics --------------------------------------------

static RE_DM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\.\s*(\d{1,2})\.(?:\s*(\d{4}))?").unwrap());
static RE_HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([\wÀ-ſ]+)").unwrap());

fn has_month_header(doc: &Html) -> bool {
    let sel = Selector::parse("h1, h2, h3, h4").unwrap();
    doc.select(&sel).any(|h| {
        let text: String = h.text().collect::<String>().to_lowercase();
        MONTH_NAMES.iter().any(|m| text.contains(m))
    })
}

/// Year is not part of a `D. M.` token; assume the current year unless that
/// would place the event more than ~3 months in the past, then roll over.
fn infer_year(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year < today - Duration::days(90) {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

fn extract_dom(
    doc: &Html,
    base: Option<&Url>,
    page: &EventPageSpec,
    today: NaiveDate,
) -> Vec<Event> {
    if !has_month_header(doc) {
        return Vec::new();
    }

    let anchor_sel = Selector::parse("a[href]").unwrap();
    let mut events = Vec::new();

    for anchor in doc.select(&anchor_sel) {
        let own_text: String = anchor.text().collect::<String>();
        let parent_text: String = anchor
            .parent()
            .and_then(scraper::ElementRef::wrap)
            .map(|p| p.text().collect())
            .unwrap_or_default();

        let searched = if RE_DM.is_match(&own_text) {
            &own_text
        } else if RE_DM.is_match(&parent_text) {
            &parent_text
        } else {
            continue;
        };
        let Some(caps) = RE_DM.captures(searched) else {
            continue;
        };
        let day = caps[1].parse::<u32>().ok().filter(|d| (1..=31).contains(d));
        let month = caps[2].parse::<u32>().ok().filter(|m| (1..=12).contains(m));
        let (Some(day), Some(month)) = (day, month) else {
            continue;
        };
        let date = match caps.get(3).and_then(|y| y.as_str().parse::<i32>().ok()) {
            Some(year) => NaiveDate::from_ymd_opt(year, month, day),
            None => infer_year(day, month, today),
        };
        let Some(date) = date else { continue };

        // the trailing text after the date token is the title
        let title = RE_DM.replace(&own_text, "").trim().to_string();
        let title = RE_HASHTAG.replace_all(&title, "").trim().to_string();
        if title.is_empty() {
            continue;
        }

        let city = RE_HASHTAG
            .captures(searched)
            .map(|c| c[1].to_string());

        let href = anchor.value().attr("href").unwrap_or_default();
        let url = match base {
            Some(b) => b.join(href).map(|u| u.to_string()).unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        };

        events.push(Event::new(
            title,
            city,
            date,
            None,
            canonicalize_link(&url),
            page.source.to_string(),
        ));
    }
    events
}
