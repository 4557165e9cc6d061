//! Fixed-window rate limiting keyed by client identifier.
//!
//! # Algorithm
//! ```text
//! no record, or now > reset_at  → record = { count: 1, reset_at: now + window }, admit
//! count >= max_requests         → reject, record untouched
//! otherwise                     → count += 1, admit
//! ```
//!
//! # Design Decisions
//! - The table is owned by the limiter and injected into the gatekeeper, not global
//! - Check-then-update for one key runs under the map's entry lock, so the
//!   threshold is strict even for concurrent bursts from the same key
//! - Stale records are dropped by `sweep`; the admit/reject sequence is the
//!   same with or without sweeping
//! - The table never exceeds `max_entries`: when it is full of live records,
//!   the ones nearest their reset are evicted to make room for new keys
//! - Windows are fixed, not sliding: back-to-back bursts across a boundary pass

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Per-client window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    /// Requests admitted in the current window.
    pub count: u32,
    /// Clock reading (ms) after which the window is stale.
    pub reset_at: u64,
}

impl RateLimitRecord {
    fn fresh(now: u64, window_millis: u64) -> Self {
        Self {
            count: 1,
            reset_at: now.saturating_add(window_millis),
        }
    }

    fn is_stale(&self, now: u64) -> bool {
        now > self.reset_at
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Admitted { count: u32, reset_at: u64 },
    Limited { reset_at: u64 },
}

impl RateLimitDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RateLimitDecision::Admitted { .. })
    }
}

/// Fixed-window limiter over a concurrent table.
pub struct FixedWindowLimiter {
    table: DashMap<String, RateLimitRecord>,
    window_millis: u64,
    max_requests: u32,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: DashMap::new(),
            window_millis: config.window_millis,
            max_requests: config.max_requests,
            max_entries: config.max_entries,
            clock,
        }
    }

    /// Count one request for `key` and decide whether it may pass.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now = self.clock.now_millis();

        if self.table.len() >= self.max_entries && !self.table.contains_key(key) {
            self.make_room(now);
        }

        match self.table.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_stale(now) {
                    *record = RateLimitRecord::fresh(now, self.window_millis);
                    RateLimitDecision::Admitted {
                        count: record.count,
                        reset_at: record.reset_at,
                    }
                } else if record.count >= self.max_requests {
                    RateLimitDecision::Limited {
                        reset_at: record.reset_at,
                    }
                } else {
                    record.count += 1;
                    RateLimitDecision::Admitted {
                        count: record.count,
                        reset_at: record.reset_at,
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let record = RateLimitRecord::fresh(now, self.window_millis);
                vacant.insert(record);
                RateLimitDecision::Admitted {
                    count: record.count,
                    reset_at: record.reset_at,
                }
            }
        }
    }

    /// Current record for `key`, stale or not.
    pub fn record(&self, key: &str) -> Option<RateLimitRecord> {
        self.table.get(key).map(|r| *r.value())
    }

    /// Remove every stale record. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(self.clock.now_millis())
    }

    fn sweep_at(&self, now: u64) -> usize {
        let before = self.table.len();
        self.table.retain(|_, record| !record.is_stale(now));
        let after = self.table.len();
        metrics::record_rate_limit_entries(after);

        let removed = before.saturating_sub(after);
        if removed > 0 {
            tracing::debug!(removed, remaining = after, "Swept stale rate limit records");
        }
        removed
    }

    /// Free space for a new key in a full table. Stale records go first; if
    /// that is not enough, the live records closest to their reset are
    /// evicted down to the low-water mark so the next inserts stay cheap.
    fn make_room(&self, now: u64) {
        self.sweep_at(now);
        if self.table.len() < self.max_entries {
            return;
        }

        let target = low_water_mark(self.max_entries);
        let mut live: Vec<(u64, String)> = self
            .table
            .iter()
            .map(|r| (r.value().reset_at, r.key().clone()))
            .collect();
        let excess = live.len().saturating_sub(target);
        if excess == 0 {
            return;
        }
        if excess < live.len() {
            live.select_nth_unstable(excess);
        }
        for (_, key) in live.into_iter().take(excess) {
            self.table.remove(&key);
        }

        let remaining = self.table.len();
        metrics::record_rate_limit_entries(remaining);
        tracing::warn!(
            evicted = excess,
            remaining,
            max_entries = self.max_entries,
            "Rate limit table full, evicted live records"
        );
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}

/// Size to shrink a full table to: 90% of capacity, leaving room for at
/// least one insert.
fn low_water_mark(max_entries: usize) -> usize {
    (max_entries - max_entries / 10).min(max_entries.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(max_requests: u32, window_millis: u64) -> (FixedWindowLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let config = RateLimitConfig {
            window_millis,
            max_requests,
            ..RateLimitConfig::default()
        };
        (FixedWindowLimiter::with_clock(&config, clock.clone()), clock)
    }

    #[test]
    fn test_first_request_creates_record() {
        let (limiter, _clock) = limiter(100, 60_000);

        let decision = limiter.check("1.2.3.4");
        assert_eq!(
            decision,
            RateLimitDecision::Admitted {
                count: 1,
                reset_at: 61_000
            }
        );
        assert_eq!(
            limiter.record("1.2.3.4"),
            Some(RateLimitRecord {
                count: 1,
                reset_at: 61_000
            })
        );
    }

    #[test]
    fn test_hundredth_admitted_hundred_first_limited() {
        let (limiter, clock) = limiter(100, 60_000);

        for i in 1..=100 {
            let decision = limiter.check("1.2.3.4");
            assert!(decision.is_admitted(), "request {} should pass", i);
            clock.advance(10);
        }

        assert_eq!(
            limiter.check("1.2.3.4"),
            RateLimitDecision::Limited { reset_at: 61_000 }
        );
        // Rejections do not mutate the record.
        assert_eq!(limiter.record("1.2.3.4").unwrap().count, 100);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let (limiter, clock) = limiter(1, 60_000);

        assert!(limiter.check("k").is_admitted());
        clock.set(61_000);
        // now == reset_at: still inside the window
        assert!(!limiter.check("k").is_admitted());

        clock.set(61_001);
        assert_eq!(
            limiter.check("k"),
            RateLimitDecision::Admitted {
                count: 1,
                reset_at: 121_001
            }
        );
    }

    #[test]
    fn test_fixed_window_allows_burst_across_boundary() {
        let (limiter, clock) = limiter(3, 1_000);

        clock.set(1_990);
        for _ in 0..3 {
            assert!(limiter.check("burst").is_admitted());
        }
        assert!(!limiter.check("burst").is_admitted());

        // Window opened at 1_990 ends at 2_990.
        clock.set(2_991);
        for _ in 0..3 {
            assert!(limiter.check("burst").is_admitted());
        }
    }

    #[test]
    fn test_keys_are_independent() {
        let (limiter, _clock) = limiter(2, 60_000);

        assert!(limiter.check("1.2.3.4").is_admitted());
        assert!(limiter.check("1.2.3.4").is_admitted());
        assert!(!limiter.check("1.2.3.4").is_admitted());

        assert_eq!(
            limiter.check("5.6.7.8"),
            RateLimitDecision::Admitted {
                count: 1,
                reset_at: 61_000
            }
        );
        assert_eq!(limiter.record("1.2.3.4").unwrap().count, 2);
    }

    #[test]
    fn test_sweep_removes_only_stale_records() {
        let (limiter, clock) = limiter(10, 1_000);

        limiter.check("old");
        clock.advance(600);
        limiter.check("young");
        clock.advance(500);

        assert_eq!(limiter.sweep(), 1);
        assert!(limiter.record("old").is_none());
        assert!(limiter.record("young").is_some());
    }

    #[test]
    fn test_full_table_sweeps_before_inserting() {
        let clock = Arc::new(ManualClock::new(0));
        let config = RateLimitConfig {
            window_millis: 100,
            max_requests: 10,
            max_entries: 2,
            sweep_interval_secs: 60,
        };
        let limiter = FixedWindowLimiter::with_clock(&config, clock.clone());

        limiter.check("a");
        limiter.check("b");
        clock.advance(101);
        limiter.check("c");

        assert_eq!(limiter.len(), 1);
        assert!(limiter.record("c").is_some());
    }

    #[test]
    fn test_table_full_of_live_records_stays_bounded() {
        let clock = Arc::new(ManualClock::new(0));
        let config = RateLimitConfig {
            window_millis: 60_000,
            max_requests: 10,
            max_entries: 2,
            sweep_interval_secs: 60,
        };
        let limiter = FixedWindowLimiter::with_clock(&config, clock.clone());

        for i in 0..10 {
            assert!(limiter.check(&format!("10.0.0.{}", i)).is_admitted());
            assert!(limiter.len() <= 2, "table grew to {}", limiter.len());
            clock.advance(1);
        }
        assert!(limiter.record("10.0.0.9").is_some());
        assert!(limiter.record("10.0.0.0").is_none());
    }

    #[test]
    fn test_eviction_prefers_records_nearest_reset() {
        let clock = Arc::new(ManualClock::new(0));
        let config = RateLimitConfig {
            window_millis: 60_000,
            max_requests: 10,
            max_entries: 20,
            sweep_interval_secs: 60,
        };
        let limiter = FixedWindowLimiter::with_clock(&config, clock.clone());

        for i in 0..20 {
            limiter.check(&format!("k{}", i));
            clock.advance(10);
        }
        limiter.check("newcomer");

        // Shrunk to 18 live records, then the newcomer.
        assert_eq!(limiter.len(), 19);
        assert!(limiter.record("k0").is_none());
        assert!(limiter.record("k1").is_none());
        assert!(limiter.record("k2").is_some());
        assert!(limiter.record("newcomer").is_some());
        // Existing keys are never evicted to serve themselves.
        assert!(limiter.check("k19").is_admitted());
        assert_eq!(limiter.record("k19").unwrap().count, 2);
    }

    #[test]
    fn test_concurrent_same_key_never_overruns() {
        let (limiter, _clock) = limiter(50, 60_000);
        let limiter = Arc::new(limiter);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..20).filter(|_| limiter.check("shared").is_admitted()).count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(limiter.record("shared").unwrap().count, 50);
    }
}
