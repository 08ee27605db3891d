//! Cache performance counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one mount session's cache behavior.
///
/// All counters are monotonic and updated with relaxed atomics; a snapshot
/// is consistent enough for logging and tests, not for billing.
#[derive(Debug, Default)]
pub struct CacheStats {
    overlay_hits: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    backend_calls: AtomicU64,
    errors: AtomicU64,
}

impl CacheStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// An operation completed by the virtual-directory overlay.
    pub fn record_overlay_hit(&self) {
        self.overlay_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A lookup served from a live result reference.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A lookup that had to go to the backend.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A round-trip issued to the backend.
    pub fn record_backend_call(&self) {
        self.backend_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// A failure converted to an error envelope at the boundary.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            overlay_hits: self.overlay_hits.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            backend_calls: self.backend_calls.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Operations completed by the overlay without touching the cache.
    pub overlay_hits: u64,
    /// Lookups served from a live result reference.
    pub hits: u64,
    /// Lookups that went to the backend.
    pub misses: u64,
    /// Round-trips issued to the backend.
    pub backend_calls: u64,
    /// Failures converted to error envelopes.
    pub errors: u64,
}

impl StatsSnapshot {
    /// Fraction of cache-eligible lookups served without a backend call.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
