//! Command-line interface definitions for the DnB briefing generator.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials and webhook settings can also be provided via environment
//! variables, which is how the scheduled weekly run configures them.

use clap::Parser;

/// Command-line arguments for the briefing generator.
///
/// # Examples
///
/// ```sh
/// # Generate this week's briefing into ./docs
/// dnb_briefing -o ./docs
///
/// # Re-generate the briefing for the week containing a given date
/// dnb_briefing -o ./docs --week 2026-07-20
///
/// # With the Facebook Graph scraper enabled
/// FB_GRAPH_TOKEN=... FB_PAGE_IDS=hospitalitydnb,letitrollfestival dnb_briefing -o ./docs
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the Markdown and HTML files
    #[arg(short, long, default_value = "docs")]
    pub output_dir: String,

    /// Week anchor: "latest" or a YYYY-MM-DD date inside the wanted week
    #[arg(long, default_value = "latest")]
    pub week: String,

    /// Path of the seen-event cache file
    #[arg(long, default_value = "state/seen_events.json")]
    pub seen_cache: String,

    /// Extra feed URLs, whitespace or comma separated
    #[arg(long, env = "EXTRA_FEED_URLS")]
    pub extra_feeds: Option<String>,

    /// Facebook Graph API access token (enables the Facebook scraper)
    #[arg(long, env = "FB_GRAPH_TOKEN")]
    pub fb_token: Option<String>,

    /// Comma-separated Facebook page ids to read posts from
    #[arg(long, env = "FB_PAGE_IDS")]
    pub fb_pages: Option<String>,

    /// Webhook URL to POST the rendered briefing payload to (optional)
    #[arg(long, env = "BRIEFING_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Document id forwarded in the webhook payload
    #[arg(long, env = "BRIEFING_DOC_ID")]
    pub webhook_doc_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["dnb_briefing"]);
        assert_eq!(cli.output_dir, "docs");
        assert_eq!(cli.week, "latest");
        assert_eq!(cli.seen_cache, "state/seen_events.json");
        assert!(cli.webhook_url.is_none());
    }

    #[test]
    fn test_cli_week_anchor() {
        let cli = Cli::parse_from(["dnb_briefing", "-o", "/tmp/out", "--week", "2026-07-20"]);
        assert_eq!(cli.output_dir, "/tmp/out");
        assert_eq!(cli.week, "2026-07-20");
    }
}
