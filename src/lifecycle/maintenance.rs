//! Periodic sweep of stale rate-limit records and expired cache entries.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::security::FixedWindowLimiter;
use crate::upstream::ResponseCache;

/// Spawn the sweeper. It stops when the shutdown signal fires.
pub fn spawn_maintenance(
    limiter: Arc<FixedWindowLimiter>,
    cache: Arc<ResponseCache>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let records = limiter.sweep();
                    let payloads = cache.sweep();
                    tracing::debug!(
                        rate_limit_removed = records,
                        rate_limit_remaining = limiter.len(),
                        cache_removed = payloads,
                        cache_remaining = cache.len(),
                        "Maintenance sweep finished"
                    );
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Maintenance task stopping");
                    break;
                }
            }
        }
    })
}
