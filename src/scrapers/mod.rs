//! Source scrapers for news feeds, community posts, and event calendars.
//!
//! Each scraper maps one family of sources onto normalized [`Item`]s or
//! [`Event`](crate::models::Event)s:
//!
//! | Source family | Module | Method | Notes |
//! |---------------|--------|--------|-------|
//! | News/forum feeds | [`rss`] | RSS 2.0 / Atom | Primary and secondary registries below |
//! | Google News | [`googlenews`] | RSS search proxy | Redirect links unwrapped |
//! | Subreddits | [`reddit`] | Atom | Social section |
//! | Facebook pages | [`facebook`] | Graph API | Only when a token is configured |
//! | Event calendars | [`calendar`] | JSON-LD, embedded JSON, DOM | Fallbacks tried in that order |
//!
//! # Common Patterns
//!
//! Every scraper is best-effort: any network or parse error is logged and the
//! source contributes nothing. Nothing a scraper does can fail the run.
//!
//! The feed registries are static. Extra RSS URLs can be appended at runtime
//! through `EXTRA_FEED_URLS` (section guessed from the link's region).

pub mod calendar;
pub mod facebook;
pub mod googlenews;
pub mod reddit;
pub mod rss;

use crate::models::Section;

/// One feed the pipeline polls: source label, URL, target section.
#[derive(Debug, Clone, Copy)]
pub struct FeedSpec {
    pub source: &'static str,
    pub url: &'static str,
    pub section: Section,
}

/// Primary feeds polled on every run.
pub const PRIMARY_FEEDS: &[FeedSpec] = &[
    FeedSpec {
        source: "rave.cz",
        url: "https://rave.cz/feed/",
        section: Section::Domestic,
    },
    FeedSpec {
        source: "musicserver.cz",
        url: "https://musicserver.cz/rss/novinky.xml",
        section: Section::Domestic,
    },
    FeedSpec {
        source: "fullmoonzine.cz",
        url: "https://www.fullmoonzine.cz/rss",
        section: Section::Domestic,
    },
    FeedSpec {
        source: "UKF",
        url: "https://ukf.com/feed",
        section: Section::International,
    },
    FeedSpec {
        source: "DnB Dojo",
        url: "https://dnbdojo.co.uk/feed/",
        section: Section::International,
    },
    FeedSpec {
        source: "Dogs On Acid",
        url: "https://www.dogsonacid.com/forums/-/index.rss",
        section: Section::International,
    },
];

/// Wider-net secondary feeds, only fetched when the international section
/// comes up short of its minimum.
pub const SECONDARY_FEEDS: &[FeedSpec] = &[
    FeedSpec {
        source: "DJ Mag",
        url: "https://djmag.com/rss.xml",
        section: Section::International,
    },
    FeedSpec {
        source: "Mixmag",
        url: "https://mixmag.net/rss.xml",
        section: Section::International,
    },
    FeedSpec {
        source: "Drum&BassArena",
        url: "https://www.drumandbassarena.com/feed/",
        section: Section::International,
    },
];

/// Subreddit Atom feeds for the social section.
pub const SUBREDDITS: &[&str] = &["DnB", "jungle", "liquiddnb"];

/// Event calendar pages for the event extractor branch.
#[derive(Debug, Clone, Copy)]
pub struct EventPageSpec {
    pub source: &'static str,
    pub url: &'static str,
}

pub const EVENT_PAGES: &[EventPageSpec] = &[
    EventPageSpec {
        source: "Let It Roll",
        url: "https://letitroll.eu/",
    },
    EventPageSpec {
        source: "Roxy Prague",
        url: "https://www.roxy.cz/en/program/",
    },
    EventPageSpec {
        source: "GoOut",
        url: "https://goout.net/cs/koncerty/drum-and-bass/praha/",
    },
];
