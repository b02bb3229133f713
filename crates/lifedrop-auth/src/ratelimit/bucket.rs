//! Concurrency-safe token bucket with full-refill-on-expiry semantics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tracing::debug;

/// Outcome of a single `allow` call, including the metadata exposed to
/// the HTTP layer as rate-limit headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request is admitted.
    pub allowed: bool,
    /// Tokens left in the window after this call.
    pub remaining: u32,
    /// When the current window ends.
    pub expiry: DateTime<Utc>,
    /// Window capacity.
    pub limit: u32,
    /// Tokens consumed so far in the window, this call included.
    pub used: u32,
}

impl Decision {
    /// Seconds until the window resets, clamped at zero.
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expiry.timestamp() - now.timestamp()).max(0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    remaining: u32,
    expiry: DateTime<Utc>,
}

/// A per-key token-bucket rate limiter.
///
/// Each key gets `threshold` requests per `ttl` window. An expired entry
/// is replaced wholesale on the next request (full refill, not a smooth
/// leak). The check-and-update sequence runs inside a single critical
/// section so concurrent callers for the same key can never double-spend.
///
/// A background task sweeps expired entries every `ttl` so memory stays
/// bounded by the number of active keys. The sweeper stops when `stop`
/// is called or the bucket is dropped.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    threshold: u32,
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    stop: watch::Sender<bool>,
}

impl TokenBucket {
    /// Creates a bucket and spawns its eviction sweeper.
    pub fn new(threshold: u32, ttl: Duration) -> Self {
        let entries: Arc<Mutex<HashMap<String, Entry>>> = Arc::new(Mutex::new(HashMap::new()));
        let (stop, mut stopped) = watch::channel(false);

        let sweep_entries = Arc::clone(&entries);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ttl);
            // The first tick of `interval` completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut map = sweep_entries.lock().await;
                        let now = Utc::now();
                        let before = map.len();
                        map.retain(|_, entry| now <= entry.expiry);
                        let evicted = before - map.len();
                        if evicted > 0 {
                            debug!(evicted, "evicted expired rate-limit entries");
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            threshold,
            ttl,
            entries,
            stop,
        }
    }

    /// Admits or rejects one request for `key`.
    pub async fn allow(&self, key: &str) -> Decision {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();

        // Live window: spend from it. Absent or expired: fall through to
        // a full refill.
        if let Some(entry) = entries.get_mut(key) {
            if now <= entry.expiry {
                if entry.remaining > 0 {
                    entry.remaining -= 1;
                    let snapshot = *entry;
                    return self.decision(true, snapshot, self.threshold - snapshot.remaining);
                }
                let snapshot = *entry;
                return self.decision(false, snapshot, self.threshold);
            }
        }

        let fresh = Entry {
            remaining: self.threshold.saturating_sub(1),
            expiry: now + self.ttl,
        };
        entries.insert(key.to_string(), fresh);
        self.decision(true, fresh, 1)
    }

    /// Stops the background sweeper. Safe to call more than once.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Number of tracked keys (bounded by the sweeper).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no keys are currently tracked.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn decision(&self, allowed: bool, entry: Entry, used: u32) -> Decision {
        Decision {
            allowed,
            remaining: if allowed { entry.remaining } else { 0 },
            expiry: entry.expiry,
            limit: self.threshold,
            used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_threshold_consumed_exactly() {
        let bucket = TokenBucket::new(3, Duration::from_secs(60));

        for used in 1..=3u32 {
            let decision = bucket.allow("10.0.0.1").await;
            assert!(decision.allowed);
            assert_eq!(decision.used, used);
            assert_eq!(decision.remaining, 3 - used);
            assert_eq!(decision.limit, 3);
        }

        let denied = bucket.allow("10.0.0.1").await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.used, 3);
        bucket.stop();
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let bucket = TokenBucket::new(1, Duration::from_secs(60));
        assert!(bucket.allow("a").await.allowed);
        assert!(!bucket.allow("a").await.allowed);
        assert!(bucket.allow("b").await.allowed);
        bucket.stop();
    }

    #[tokio::test]
    async fn test_window_expiry_refills() {
        let bucket = TokenBucket::new(2, Duration::from_millis(40));

        assert!(bucket.allow("k").await.allowed);
        assert!(bucket.allow("k").await.allowed);
        assert!(!bucket.allow("k").await.allowed);

        tokio::time::sleep(Duration::from_millis(60)).await;

        let refreshed = bucket.allow("k").await;
        assert!(refreshed.allowed);
        assert_eq!(refreshed.remaining, 1);
        assert_eq!(refreshed.used, 1);
        bucket.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_over_admission_under_concurrency() {
        let bucket = TokenBucket::new(5, Duration::from_secs(60));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let bucket = bucket.clone();
            handles.push(tokio::spawn(
                async move { bucket.allow("shared").await.allowed },
            ));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 5);
        bucket.stop();
    }

    #[tokio::test]
    async fn test_sweeper_evicts_expired_keys() {
        let bucket = TokenBucket::new(1, Duration::from_millis(30));
        bucket.allow("gone").await;
        assert_eq!(bucket.len().await, 1);

        // Two ticks are enough: the entry expires after 30ms and the
        // sweeper runs on the same period.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(bucket.is_empty().await);
        bucket.stop();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let bucket = TokenBucket::new(1, Duration::from_secs(1));
        bucket.stop();
        bucket.stop();
        // The limiter itself keeps working after the sweeper is gone.
        assert!(bucket.allow("still-works").await.allowed);
    }

    #[tokio::test]
    async fn test_retry_after_is_clamped() {
        let bucket = TokenBucket::new(1, Duration::from_secs(60));
        bucket.allow("k").await;
        let denied = bucket.allow("k").await;
        assert!(!denied.allowed);

        let now = Utc::now();
        assert!(denied.retry_after_seconds(now) > 0);
        assert_eq!(denied.retry_after_seconds(now + Duration::from_secs(120)), 0);
    }
}
