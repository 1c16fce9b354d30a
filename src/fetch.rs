//! Shared HTTP fetching for all scrapers.
//!
//! One `reqwest::Client` with a fixed user agent and a per-request timeout is
//! reused across the run. There are no retries: a failed request surfaces as
//! an error the calling scraper logs and swallows, so a hung or broken source
//! costs at most one timeout and never the whole run.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, instrument};

/// User agent sent with every request. Some event sites reject the default
/// reqwest UA outright.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; dnb-briefing/0.3)";

const REQUEST_TIMEOUT_SECS: u64 = 15;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// The shared HTTP client.
pub fn client() -> &'static Client {
    &CLIENT
}

/// Fetch a URL and return the response body.
///
/// # Errors
///
/// Fails on network errors, timeouts, and non-2xx status codes.
#[instrument(level = "debug", skip_all, fields(%url))]
pub async fn get_text(url: &str) -> Result<String, Box<dyn Error>> {
    let response = CLIENT.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(bytes = body.len(), "Fetched body");
    Ok(body)
}
