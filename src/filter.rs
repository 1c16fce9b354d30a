//! Genre and region classification for scraped items.
//!
//! Two-tier genre filter:
//!
//! 1. **Domain allowlist** — items from genre-dedicated sites pass unless
//!    they contain an explicit negative-genre keyword.
//! 2. **Generic filter** — everything else must contain at least one positive
//!    keyword and no negative keyword.
//!
//! Region classification: a `.cz` top-level domain or a known domestic site
//! puts an item in the domestic bucket, and domestic items additionally need
//! a domestic genre token. Keyword matching is word-boundary based so that
//! "techno" does not fire on "technology".

use crate::models::{Item, ItemKind, Section};
use tracing::debug;
use url::Url;

/// Genre-dedicated sites whose items skip the positive-keyword requirement.
const GENRE_DOMAINS: [&str; 5] = [
    "ukf.com",
    "dnbdojo.co.uk",
    "dogsonacid.com",
    "drumandbassarena.com",
    "liquicity.com",
];

/// Known domestic scene sites that do not use a `.cz` domain for everything.
const DOMESTIC_DOMAINS: [&str; 3] = ["rave.cz", "musicserver.cz", "fullmoonzine.cz"];

/// Positive genre keywords, stored in normalized form (see [`normalize_text`]).
const POSITIVE_KEYWORDS: [&str; 10] = [
    "drum and bass",
    "drum n bass",
    "drumandbass",
    "dnb",
    "d n b",
    "jungle",
    "junglist",
    "neurofunk",
    "liquid funk",
    "jump up",
];

/// Negative genre keywords. A single hit vetoes an item even from an
/// allowlisted domain.
const NEGATIVE_KEYWORDS: [&str; 6] = [
    "techno",
    "house",
    "tech house",
    "trance",
    "hardstyle",
    "psytrance",
];

/// Tokens a domestic item must carry on top of the generic filter.
const DOMESTIC_GENRE_TOKENS: [&str; 7] = [
    "dnb",
    "drum and bass",
    "drum n bass",
    "jungle",
    "neurofunk",
    "liquid",
    "breakbeat",
];

/// Keywords routing an item into the one-slot curiosity pick.
const CURIOSUM_TOKENS: [&str; 6] = [
    "vinyl",
    "documentary",
    "dokument",
    "anniversary",
    "vyroci",
    "archive",
];

/// Lowercase a text and replace every non-alphanumeric run with a single
/// space, padded on both ends, so keywords can be matched on word boundaries
/// with a plain substring search.
fn normalize_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(' ');
    let mut last_space = true;
    for c in s.to_lowercase().chars() {
        if c.is_alphanumeric() {
            out.push(c);
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if !last_space {
        out.push(' ');
    }
    out
}

fn has_keyword(normalized: &str, keyword: &str) -> bool {
    normalized.contains(&format!(" {} ", keyword))
}

fn has_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| has_keyword(normalized, k))
}

/// Registrable host of a link, lowercased; `None` for unparseable links.
pub fn domain_of(link: &str) -> Option<String> {
    Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_lowercase()))
}

fn is_allowlisted(link: &str) -> bool {
    domain_of(link)
        .map(|d| GENRE_DOMAINS.iter().any(|g| d == *g || d.ends_with(&format!(".{}", g))))
        .unwrap_or(false)
}

/// Two-tier genre relevance decision.
pub fn is_genre_relevant(item: &Item) -> bool {
    let text = normalize_text(&format!("{} {}", item.title, item.summary));
    if has_any(&text, &NEGATIVE_KEYWORDS) {
        return false;
    }
    if is_allowlisted(&item.link) {
        return true;
    }
    has_any(&text, &POSITIVE_KEYWORDS)
}

/// Region bucket for a link: domestic for `.cz` domains and known domestic
/// sites, international otherwise.
pub fn region_for_link(link: &str) -> Section {
    match domain_of(link) {
        Some(d) if d.ends_with(".cz") || DOMESTIC_DOMAINS.contains(&d.as_str()) => {
            Section::Domestic
        }
        _ => Section::International,
    }
}

fn has_domestic_token(item: &Item) -> bool {
    let text = normalize_text(&format!("{} {}", item.title, item.summary));
    has_any(&text, &DOMESTIC_GENRE_TOKENS)
}

fn looks_curious(item: &Item) -> bool {
    let text = normalize_text(&format!("{} {}", item.title, item.summary));
    has_any(&text, &CURIOSUM_TOKENS)
}

/// Run the classifier over all collected items.
///
/// Returns the surviving items plus the number dropped; the count goes into
/// the run summary so a filter suddenly eating a whole source is visible.
pub fn filter_items(items: Vec<Item>) -> (Vec<Item>, usize) {
    let total = items.len();
    let kept: Vec<Item> = items
        .into_iter()
        .filter_map(|mut item| {
            if !is_genre_relevant(&item) {
                debug!(title = %item.title, "Dropped by genre filter");
                return None;
            }
            if item.section == Section::Domestic && !has_domestic_token(&item) {
                debug!(title = %item.title, "Dropped domestic item without genre token");
                return None;
            }
            if item.kind == ItemKind::News && looks_curious(&item) {
                item.kind = ItemKind::Curiosum;
            }
            Some(item)
        })
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, summary: &str, link: &str, section: Section) -> Item {
        Item {
            title: title.to_string(),
            summary: summary.to_string(),
            link: link.to_string(),
            timestamp: None,
            source_label: "test".to_string(),
            section,
            kind: ItemKind::News,
        }
    }

    #[test]
    fn test_generic_filter_requires_positive_keyword() {
        let yes = item(
            "New neurofunk EP out friday",
            "",
            "https://someblog.example/post",
            Section::International,
        );
        let no = item(
            "Festival lineup announced",
            "A rock and pop affair",
            "https://someblog.example/other",
            Section::International,
        );
        assert!(is_genre_relevant(&yes));
        assert!(!is_genre_relevant(&no));
    }

    #[test]
    fn test_negative_keyword_vetoes_even_allowlisted_domain() {
        let it = item(
            "The best techno sets of the summer",
            "",
            "https://ukf.com/words/techno-sets",
            Section::International,
        );
        assert!(!is_genre_relevant(&it));
    }

    #[test]
    fn test_allowlisted_domain_passes_without_positive_keyword() {
        let it = item(
            "Label spotlight: ten years of flight patterns",
            "",
            "https://ukf.com/words/label-spotlight",
            Section::International,
        );
        assert!(is_genre_relevant(&it));
    }

    #[test]
    fn test_techno_does_not_match_technology() {
        let it = item(
            "Jungle production technology in 2026",
            "",
            "https://somewhere.example/a",
            Section::International,
        );
        assert!(is_genre_relevant(&it));
    }

    #[test]
    fn test_house_does_not_match_warehouse() {
        let it = item(
            "Warehouse jungle rave announced",
            "",
            "https://somewhere.example/b",
            Section::International,
        );
        assert!(is_genre_relevant(&it));
    }

    #[test]
    fn test_region_for_cz_tld() {
        assert_eq!(region_for_link("https://rave.cz/clanek"), Section::Domestic);
        assert_eq!(
            region_for_link("https://neurofunk.blog.cz/post"),
            Section::Domestic
        );
        assert_eq!(
            region_for_link("https://ukf.com/words/x"),
            Section::International
        );
    }

    #[test]
    fn test_domestic_items_need_domestic_token() {
        let with_token = item(
            "Nová dnb kompilace",
            "Liquid výběr z domácí scény",
            "https://rave.cz/a",
            Section::Domestic,
        );
        let without_token = item(
            "Rozhovor s promotérem drum and bass akcí",
            "",
            "https://rave.cz/b",
            Section::Domestic,
        );
        let off_genre = item(
            "Novinky z klubové scény",
            "Rockový večer",
            "https://rave.cz/c",
            Section::Domestic,
        );
        let (kept, dropped) = filter_items(vec![with_token, without_token, off_genre]);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_curiosity_kind_promotion() {
        let it = item(
            "Jungle classics reissued on vinyl",
            "",
            "https://somewhere.example/c",
            Section::International,
        );
        let (kept, _) = filter_items(vec![it]);
        assert_eq!(kept[0].kind, ItemKind::Curiosum);
    }
}
