//! Optional downstream push of the rendered briefing.
//!
//! When a webhook URL is configured, the run POSTs one JSON payload with the
//! briefing date, the per-section formatted text blocks, and the reference
//! list; a document id can be forwarded so the receiving end knows which
//! document to update. Absent configuration the push is silently skipped.

use crate::models::Briefing;
use crate::outputs::markdown::Rendered;
use serde::Serialize;
use std::error::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    /// Monday of the rendered week, `YYYY-MM-DD`.
    pub date: String,
    pub week_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    pub sections: PayloadSections,
    pub references: Vec<String>,
    /// Sorted unique source labels that contributed to the briefing.
    pub sources: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PayloadSections {
    pub domestic: String,
    pub international: String,
    pub social: String,
    pub curiosity: String,
    pub events: String,
}

/// Assemble the payload from the briefing and its rendered blocks.
pub fn build_payload(
    briefing: &Briefing,
    rendered: &Rendered,
    monday: chrono::NaiveDate,
    doc_id: Option<&str>,
) -> WebhookPayload {
    WebhookPayload {
        date: monday.format("%Y-%m-%d").to_string(),
        week_label: briefing.week_label.clone(),
        doc_id: doc_id.map(str::to_string),
        sections: PayloadSections {
            domestic: rendered.domestic.clone(),
            international: rendered.international.clone(),
            social: rendered.social.clone(),
            curiosity: rendered.curiosity.clone(),
            events: rendered.events.clone(),
        },
        references: rendered.references.clone(),
        sources: briefing.sources.clone(),
    }
}

/// POST the payload to the configured webhook, if any.
///
/// # Errors
///
/// Fails on network errors and non-2xx responses. The caller logs and moves
/// on; the briefing files are already on disk at this point.
#[instrument(level = "info", skip_all)]
pub async fn push(url: Option<&str>, payload: &WebhookPayload) -> Result<(), Box<dyn Error>> {
    let Some(url) = url else {
        debug!("Webhook disabled (no URL configured)");
        return Ok(());
    };

    crate::fetch::client()
        .post(url)
        .json(payload)
        .send()
        .await?
        .error_for_status()?;
    info!(week = %payload.week_label, "Pushed briefing to webhook");
    Ok(())
}
