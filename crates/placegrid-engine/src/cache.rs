//! Per-tile memoization of formatted place lists.
//!
//! The cache is an injected capability, not a process-wide singleton: the
//! orchestrator takes a `dyn TileCache` so tests can supply an in-memory
//! fake or pre-seeded entries. Keys are deterministic fingerprints of the
//! query plus tile identity, so identical queries against identical tiles
//! are served from cache within the TTL window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::format::FormattedPlace;

/// Deterministic cache key for one tile of one query.
///
/// Caching an empty list is required behavior: a known-empty tile must not
/// be re-fetched from the upstream within the TTL window.
#[must_use]
pub fn tile_fingerprint(
    latitude: f64,
    longitude: f64,
    area_size_m: f64,
    category: &str,
    keyword: &str,
    i: u32,
    j: u32,
) -> String {
    format!("places_search_{latitude}_{longitude}_{area_size_m}_{category}_{keyword}_{i}_{j}")
}

/// Key-value store mapping tile fingerprints to formatted place lists.
///
/// Implementations must be safe under concurrent get/put from multiple
/// simultaneous requests; per-key atomicity is all the orchestrator needs.
#[async_trait]
pub trait TileCache: Send + Sync {
    /// Returns the cached list for `key`, or `None` on miss/expiry.
    /// `Some(vec![])` is a valid hit: a known-empty tile.
    async fn get(&self, key: &str) -> Option<Vec<FormattedPlace>>;

    /// Stores `places` under `key` for `ttl`. Overwrites any previous entry.
    async fn put(&self, key: &str, places: Vec<FormattedPlace>, ttl: Duration);
}

struct Entry {
    expires_at: Instant,
    places: Vec<FormattedPlace>,
}

/// Process-wide in-memory cache with per-entry TTL and lazy eviction:
/// expired entries are dropped on the read that finds them.
#[derive(Default)]
pub struct InMemoryTileCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryTileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TileCache for InMemoryTileCache {
    async fn get(&self, key: &str) -> Option<Vec<FormattedPlace>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.places.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &str, places: Vec<FormattedPlace>, ttl: Duration) {
        let entry = Entry {
            expires_at: Instant::now() + ttl,
            places,
        };
        self.entries.lock().await.insert(key.to_owned(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Coordinate;

    fn sample_place(id: &str) -> FormattedPlace {
        FormattedPlace {
            place_id: id.to_string(),
            name: "Sample".to_string(),
            formatted_address: "1 Road, Town".to_string(),
            location: Coordinate {
                latitude: Some(1.0),
                longitude: Some(2.0),
            },
            rating: None,
            user_ratings_total: 0,
            types: vec!["lodging".to_string()],
            phone_number: "Not available".to_string(),
            website: "Not available".to_string(),
            price_level: None,
            business_status: "OPERATIONAL".to_string(),
            opening_hours: vec![],
            current_status: "Hours not available".to_string(),
            is_open: false,
            primary_type: "Lodging".to_string(),
            short_address: "1 Road".to_string(),
            has_phone: false,
        }
    }

    #[test]
    fn fingerprint_is_deterministic_and_tile_sensitive() {
        let a = tile_fingerprint(11.2746, 77.5827, 5000.0, "hotels", "hotels", 0, 1);
        let b = tile_fingerprint(11.2746, 77.5827, 5000.0, "hotels", "hotels", 0, 1);
        let c = tile_fingerprint(11.2746, 77.5827, 5000.0, "hotels", "hotels", 1, 0);
        assert_eq!(a, b, "identical query + tile must produce identical keys");
        assert_ne!(a, c, "different tiles must produce different keys");
    }

    #[tokio::test]
    async fn put_then_get_returns_the_entry() {
        let cache = InMemoryTileCache::new();
        cache
            .put("k", vec![sample_place("x")], Duration::from_secs(60))
            .await;
        let hit = cache.get("k").await.expect("entry should be present");
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].place_id, "x");
    }

    #[tokio::test]
    async fn empty_list_is_a_hit_not_a_miss() {
        let cache = InMemoryTileCache::new();
        cache.put("empty-tile", vec![], Duration::from_secs(60)).await;
        let hit = cache.get("empty-tile").await;
        assert_eq!(hit, Some(vec![]));
        assert_eq!(cache.get("never-written").await, None);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_a_miss() {
        let cache = InMemoryTileCache::new();
        cache
            .put("k", vec![sample_place("x")], Duration::ZERO)
            .await;
        assert_eq!(cache.get("k").await, None);
    }
}
