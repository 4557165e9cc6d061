//! In-memory cache for successful GET payloads.
//!
//! Entries are keyed by upstream URL and live for a per-endpoint TTL. Expired
//! entries are never served; they are dropped on lookup or by `sweep`.
//! The cache holds at most `max_entries` payloads: a full cache drops expired
//! entries first, then the ones closest to expiry.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::observability::metrics;

#[derive(Debug, Clone)]
struct CachedPayload {
    body: Value,
    expires_at: u64,
}

/// A thread-safe TTL cache of upstream JSON bodies.
pub struct ResponseCache {
    entries: DashMap<String, CachedPayload>,
    enabled: bool,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(enabled: bool, max_entries: usize) -> Self {
        Self::with_clock(enabled, max_entries, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(enabled: bool, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            enabled,
            max_entries,
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let now = self.clock.now_millis();

        let hit = self.entries.get(key).and_then(|entry| {
            (now <= entry.expires_at).then(|| entry.body.clone())
        });

        match hit {
            Some(body) => {
                metrics::record_cache_event("hit");
                Some(body)
            }
            None => {
                self.entries.remove_if(key, |_, entry| now > entry.expires_at);
                metrics::record_cache_event("miss");
                None
            }
        }
    }

    pub fn insert(&self, key: String, body: Value, ttl: Duration) {
        if !self.enabled || self.max_entries == 0 {
            return;
        }
        let now = self.clock.now_millis();
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.make_room(now);
        }

        let expires_at = now.saturating_add(ttl.as_millis() as u64);
        self.entries.insert(key, CachedPayload { body, expires_at });
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(self.clock.now_millis())
    }

    fn sweep_at(&self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.expires_at);
        before.saturating_sub(self.entries.len())
    }

    /// Evict down to 90% of capacity, soonest-expiring first.
    fn make_room(&self, now: u64) {
        self.sweep_at(now);
        let target = (self.max_entries - self.max_entries / 10).min(self.max_entries - 1);

        let mut live: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|e| (e.value().expires_at, e.key().clone()))
            .collect();
        let excess = live.len().saturating_sub(target);
        if excess == 0 {
            return;
        }
        if excess < live.len() {
            live.select_nth_unstable(excess);
        }
        for (_, key) in live.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        metrics::record_cache_event("evicted");
        tracing::debug!(evicted = excess, remaining = self.entries.len(), "Response cache full");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    #[test]
    fn test_hit_within_ttl_and_miss_after() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = ResponseCache::with_clock(true, 100, clock.clone());

        cache.insert("k".into(), json!({"a": 1}), Duration::from_secs(10));
        clock.advance(10_000);
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));

        clock.advance(1);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = ResponseCache::new(false, 100);
        cache.insert("k".into(), json!([]), Duration::from_secs(60));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_distinct_keys_never_exceed_capacity() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = ResponseCache::with_clock(true, 3, clock.clone());

        for n in 0..50 {
            cache.insert(
                format!("https://backend/productsapi.php?search={}", n),
                json!({ "n": n }),
                Duration::from_secs(3600),
            );
            assert!(cache.len() <= 3, "cache grew to {}", cache.len());
            clock.advance(1);
        }
        assert_eq!(
            cache.get("https://backend/productsapi.php?search=49"),
            Some(json!({ "n": 49 }))
        );
        assert_eq!(cache.get("https://backend/productsapi.php?search=0"), None);
    }

    #[test]
    fn test_full_cache_prefers_dropping_expired_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = ResponseCache::with_clock(true, 2, clock.clone());

        cache.insert("short".into(), json!(1), Duration::from_secs(1));
        cache.insert("long".into(), json!(2), Duration::from_secs(60));
        clock.advance(2_000);
        cache.insert("new".into(), json!(3), Duration::from_secs(60));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("long"), Some(json!(2)));
        assert_eq!(cache.get("new"), Some(json!(3)));
    }

    #[test]
    fn test_refreshing_existing_key_does_not_evict() {
        let cache = ResponseCache::new(true, 2);
        cache.insert("a".into(), json!(1), Duration::from_secs(60));
        cache.insert("b".into(), json!(2), Duration::from_secs(60));
        cache.insert("a".into(), json!(10), Duration::from_secs(60));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), Some(json!(2)));
    }

    #[test]
    fn test_sweep_drops_expired_only() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = ResponseCache::with_clock(true, 100, clock.clone());

        cache.insert("short".into(), json!(1), Duration::from_secs(1));
        cache.insert("long".into(), json!(2), Duration::from_secs(60));
        clock.advance(5_000);

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long"), Some(json!(2)));
    }
}
