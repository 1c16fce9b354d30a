//! Seen-event cache: event URL → date first observed.
//!
//! A flat JSON file read once at startup and written once at the end of a
//! successful run. The briefing uses it to flag events as "newly announced"
//! when their URL first appeared within a trailing window. A missing or
//! corrupt file degrades to an empty cache; the run never fails over state.
//!
//! The cache has no eviction and grows with every new event URL.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use tracing::{info, warn};

pub type SeenCache = HashMap<String, NaiveDate>;

/// Load the cache, returning an empty map when the file is missing or
/// unreadable.
pub fn load(path: &str) -> SeenCache {
    match std::fs::read_to_string(path) {
        Ok(body) => match serde_json::from_str::<SeenCache>(&body) {
            Ok(cache) => {
                info!(%path, entries = cache.len(), "Loaded seen-event cache");
                cache
            }
            Err(e) => {
                warn!(%path, error = %e, "Seen-event cache unparseable, starting empty");
                SeenCache::new()
            }
        },
        Err(_) => {
            info!(%path, "No seen-event cache yet, starting empty");
            SeenCache::new()
        }
    }
}

/// Write the cache back, creating parent directories as needed.
pub fn store(path: &str, cache: &SeenCache) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let body = serde_json::to_string_pretty(cache)?;
    std::fs::write(path, body)?;
    info!(%path, entries = cache.len(), "Wrote seen-event cache");
    Ok(())
}

/// Look up (or record) the first-seen date for an event URL.
///
/// Unknown URLs are inserted with `today` and that date is returned.
pub fn record_first_seen(cache: &mut SeenCache, url: &str, today: NaiveDate) -> NaiveDate {
    *cache.entry(url.to_string()).or_insert(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_empty() {
        let cache = load("/nonexistent/path/seen.json");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_record_first_seen_is_sticky() {
        let mut cache = SeenCache::new();
        let first = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(record_first_seen(&mut cache, "https://e.com/ev", first), first);
        assert_eq!(record_first_seen(&mut cache, "https://e.com/ev", later), first);
    }

    #[test]
    fn test_store_and_load_roundtrip() {
        let path = std::env::temp_dir().join("dnb_briefing_cache_test.json");
        let path = path.to_str().unwrap().to_string();

        let mut cache = SeenCache::new();
        cache.insert(
            "https://e.com/ev".to_string(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        );
        store(&path, &cache).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded, cache);
        let _ = std::fs::remove_file(&path);
    }
}
