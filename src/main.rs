//! # DnB Briefing
//!
//! A weekly drum-and-bass briefing generator. One run scrapes news feeds,
//! community posts, and event calendars, filters them by genre heuristics,
//! deduplicates, selects the Monday–Sunday week of interest, and renders a
//! Markdown briefing plus a static HTML page.
//!
//! ## Usage
//!
//! ```sh
//! dnb_briefing -o ./docs --week latest
//! ```
//!
//! ## Architecture
//!
//! The application is a linear batch pipeline:
//! 1. **Collection**: Fetch every registered feed, Google News queries,
//!    subreddits, and (when configured) Facebook pages
//! 2. **Classification**: Genre/region keyword filter
//! 3. **Selection**: Dedupe, week windowing, per-section minimums with a
//!    secondary-source top-up
//! 4. **Events**: Calendar extraction runs as an independent branch feeding
//!    the same renderer, diffed against the persisted seen cache
//! 5. **Output**: Markdown + HTML files, optional webhook push
//!
//! Any single source failing degrades the briefing; it never fails the run.
//! Output files are written only after the whole pipeline has completed in
//! memory.

use chrono::Local;
use clap::Parser;
use std::collections::BTreeSet;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cache;
mod cli;
mod events;
mod fetch;
mod filter;
mod models;
mod outputs;
mod scrapers;
mod select;
mod utils;

use cli::Cli;
use models::{Briefing, Event, Item, SourceReport};
use utils::ensure_writable_dir;

/// Count the filtered items a source family contributed, by label prefix.
fn kept_count(items: &[Item], prefix: &str) -> usize {
    items
        .iter()
        .filter(|i| i.source_label == prefix || i.source_label.starts_with(&format!("{}/", prefix)))
        .count()
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter_env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter_env)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("dnb_briefing starting up");

    let args = Cli::parse();
    debug!(?args.output_dir, ?args.week, "Parsed CLI arguments");

    // Early check: ensure the output dir is writable. This is the only
    // failure that aborts a run.
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let today = Local::now().date_naive();
    let anchor = select::resolve_anchor(&args.week, today);
    let window = select::week_window(anchor);
    info!(label = %window.label, start = %window.start, end = %window.end, "Target week");

    // ---- Collection ----
    let mut reports: Vec<SourceReport> = Vec::new();
    let mut pool: Vec<Item> = Vec::new();

    for spec in scrapers::PRIMARY_FEEDS {
        match scrapers::rss::fetch_feed(spec).await {
            Ok(items) => {
                reports.push(SourceReport {
                    source: spec.source.to_string(),
                    fetched: items.len(),
                    kept: 0,
                    failed: false,
                });
                pool.extend(items);
            }
            Err(e) => {
                warn!(source = %spec.source, error = %e, "Feed failed, contributing nothing");
                reports.push(SourceReport {
                    source: spec.source.to_string(),
                    fetched: 0,
                    kept: 0,
                    failed: true,
                });
            }
        }
    }

    match scrapers::googlenews::fetch_items().await {
        Ok(items) => {
            reports.push(SourceReport {
                source: "Google News".to_string(),
                fetched: items.len(),
                kept: 0,
                failed: false,
            });
            pool.extend(items);
        }
        Err(e) => {
            warn!(error = %e, "Google News failed, contributing nothing");
            reports.push(SourceReport {
                source: "Google News".to_string(),
                fetched: 0,
                kept: 0,
                failed: true,
            });
        }
    }

    match scrapers::reddit::fetch_items(scrapers::SUBREDDITS).await {
        Ok(items) => {
            reports.push(SourceReport {
                source: "r".to_string(),
                fetched: items.len(),
                kept: 0,
                failed: false,
            });
            pool.extend(items);
        }
        Err(e) => {
            warn!(error = %e, "Reddit failed, contributing nothing");
            reports.push(SourceReport {
                source: "r".to_string(),
                fetched: 0,
                kept: 0,
                failed: true,
            });
        }
    }

    match scrapers::facebook::fetch_items(args.fb_token.as_deref(), args.fb_pages.as_deref()).await
    {
        Ok(items) => {
            if !items.is_empty() {
                reports.push(SourceReport {
                    source: "facebook".to_string(),
                    fetched: items.len(),
                    kept: 0,
                    failed: false,
                });
            }
            pool.extend(items);
        }
        Err(e) => {
            warn!(error = %e, "Facebook failed, contributing nothing");
            reports.push(SourceReport {
                source: "facebook".to_string(),
                fetched: 0,
                kept: 0,
                failed: true,
            });
        }
    }

    if let Some(extra) = &args.extra_feeds {
        for url in extra
            .split([',', ' ', '\n'])
            .map(str::trim)
            .filter(|u| !u.is_empty())
        {
            let label = filter::domain_of(url).unwrap_or_else(|| "extra".to_string());
            match scrapers::rss::fetch_extra_feed(url).await {
                Ok(items) => {
                    reports.push(SourceReport {
                        source: label,
                        fetched: items.len(),
                        kept: 0,
                        failed: false,
                    });
                    pool.extend(items);
                }
                Err(e) => {
                    warn!(%url, error = %e, "Extra feed failed, contributing nothing");
                    reports.push(SourceReport {
                        source: label,
                        fetched: 0,
                        kept: 0,
                        failed: true,
                    });
                }
            }
        }
    }

    info!(count = pool.len(), "Collected raw items");

    // ---- Classification ----
    let (filtered, dropped) = filter::filter_items(pool);
    info!(kept = filtered.len(), dropped, "Classifier done");
    for report in reports.iter_mut() {
        report.kept = kept_count(&filtered, &report.source);
    }

    // ---- Selection ----
    let curiosity_pool = select::dedupe_newest_first(filtered.clone());
    let mut selection = select::select_for_week(filtered, &window);

    if selection.domestic.len() < select::MIN_DOMESTIC {
        warn!(
            have = selection.domestic.len(),
            want = select::MIN_DOMESTIC,
            "Domestic section below minimum, no fallback source configured"
        );
    }

    if selection.international.len() < select::MIN_INTERNATIONAL {
        info!(
            have = selection.international.len(),
            want = select::MIN_INTERNATIONAL,
            "International section short, querying secondary feeds"
        );
        let mut candidates: Vec<Item> = Vec::new();
        for spec in scrapers::SECONDARY_FEEDS {
            match scrapers::rss::fetch_feed(spec).await {
                Ok(items) => {
                    reports.push(SourceReport {
                        source: spec.source.to_string(),
                        fetched: items.len(),
                        kept: 0,
                        failed: false,
                    });
                    candidates.extend(items);
                }
                Err(e) => {
                    warn!(source = %spec.source, error = %e, "Secondary feed failed");
                    reports.push(SourceReport {
                        source: spec.source.to_string(),
                        fetched: 0,
                        kept: 0,
                        failed: true,
                    });
                }
            }
        }
        let (candidates, _) = filter::filter_items(candidates);
        for report in reports.iter_mut() {
            if scrapers::SECONDARY_FEEDS.iter().any(|s| s.source == report.source) {
                report.kept = kept_count(&candidates, &report.source);
            }
        }
        let added = select::top_up(
            &mut selection.international,
            candidates,
            &mut selection.keys,
            &window,
            select::MIN_INTERNATIONAL,
            select::CAP_INTERNATIONAL,
        );
        info!(added, "Topped up international section");
    }

    selection.curiosity = select::pick_curiosity(&curiosity_pool, &window, &selection.keys);

    // ---- Events branch ----
    let mut seen = cache::load(&args.seen_cache);
    let mut raw_events: Vec<Event> = Vec::new();
    for page in scrapers::EVENT_PAGES {
        match scrapers::calendar::fetch_events(page, today).await {
            Ok(evs) => {
                reports.push(SourceReport {
                    source: page.source.to_string(),
                    fetched: evs.len(),
                    kept: evs.len(),
                    failed: false,
                });
                raw_events.extend(evs);
            }
            Err(e) => {
                warn!(source = %page.source, error = %e, "Calendar page failed, contributing nothing");
                reports.push(SourceReport {
                    source: page.source.to_string(),
                    fetched: 0,
                    kept: 0,
                    failed: true,
                });
            }
        }
    }

    let mut all_events = events::prepare(raw_events);
    events::mark_first_seen(&mut all_events, &mut seen, today);
    let all_events = events::drop_low_tier(all_events);
    let week_events: Vec<Event> = all_events
        .iter()
        .filter(|ev| events::overlaps_week(ev, &window))
        .cloned()
        .collect();
    let newly_announced = events::newly_announced(&all_events, today);
    info!(
        total = all_events.len(),
        this_week = week_events.len(),
        newly = newly_announced.len(),
        "Events branch done"
    );

    // ---- Assemble briefing ----
    let mut sources: BTreeSet<String> = BTreeSet::new();
    for item in selection
        .domestic
        .iter()
        .chain(selection.international.iter())
        .chain(selection.social.iter())
        .chain(selection.curiosity.iter())
    {
        sources.insert(item.source_label.clone());
    }
    for ev in week_events.iter().chain(newly_announced.iter()) {
        sources.insert(ev.source_label.clone());
    }

    let briefing = Briefing {
        week_label: window.label.clone(),
        period_from: select::fmt_dm(window.start),
        period_to: select::fmt_dmy(window.end),
        domestic: selection.domestic,
        international: selection.international,
        social: selection.social,
        curiosity: selection.curiosity,
        events: week_events,
        newly_announced,
        sources: sources.into_iter().collect(),
    };

    // ---- Output ----
    let rendered = outputs::markdown::render(&briefing);
    let md_path = format!("{}/{}.md", args.output_dir, briefing.week_label);
    if let Err(e) = tokio::fs::write(&md_path, &rendered.markdown).await {
        error!(path = %md_path, error = %e, "Failed writing Markdown");
    } else {
        info!(path = %md_path, "Wrote briefing Markdown");
    }

    let html = outputs::html::render_page(&rendered.markdown, &briefing.week_label);
    let html_path = format!("{}/{}.html", args.output_dir, briefing.week_label);
    if let Err(e) = tokio::fs::write(&html_path, html).await {
        error!(path = %html_path, error = %e, "Failed writing HTML");
    } else {
        info!(path = %html_path, "Wrote briefing HTML");
    }

    let payload = outputs::webhook::build_payload(
        &briefing,
        &rendered,
        window.start,
        args.webhook_doc_id.as_deref(),
    );
    if let Err(e) = outputs::webhook::push(args.webhook_url.as_deref(), &payload).await {
        error!(error = %e, "Webhook push failed");
    }

    if let Err(e) = cache::store(&args.seen_cache, &seen) {
        error!(path = %args.seen_cache, error = %e, "Failed writing seen-event cache");
    }

    // ---- Per-source summary ----
    let failed_sources = reports.iter().filter(|r| r.failed).count();
    for report in &reports {
        info!(
            source = %report.source,
            fetched = report.fetched,
            kept = report.kept,
            failed = report.failed,
            "Source summary"
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        sources = reports.len(),
        failed_sources,
        week = %briefing.week_label,
        "Execution complete"
    );
    println!("[OK] Generated {}", md_path);

    Ok(())
}
