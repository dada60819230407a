//! Frame fingerprint cache
//!
//! Deduplicates near-identical input frames over a short horizon: identical
//! bytes delivered twice within the TTL short-circuit to the same result
//! without re-invoking detectors or re-triggering alert side effects.
//! Eviction is lazy, checked at lookup time.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use vigil_core::{fingerprint_hex, FusionResult};

struct CacheEntry {
    result: FusionResult,
    cached_at: DateTime<Utc>,
}

/// Short-horizon content-addressed result cache
///
/// Separately locked from the fusion engine: cache correctness depends only
/// on per-fingerprint TTL, not on global frame ordering.
pub struct FrameFingerprintCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FrameFingerprintCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::milliseconds(ttl_ms as i64),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up cached output for this frame content
    ///
    /// An entry past its TTL is treated as a miss and evicted.
    pub fn lookup(&self, content: &[u8], now: DateTime<Utc>) -> Option<FusionResult> {
        let key = fingerprint_hex(content);

        let expired = match self.entries.get(&key) {
            Some(entry) => {
                if now.signed_duration_since(entry.cached_at) < self.ttl {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(fingerprint = %key, "fingerprint cache hit");
                    return Some(entry.result.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            self.entries.remove(&key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Cache the result computed for this frame content
    pub fn store(&self, content: &[u8], result: FusionResult, now: DateTime<Utc>) {
        let key = fingerprint_hex(content);
        self.entries.insert(
            key,
            CacheEntry {
                result,
                cached_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
