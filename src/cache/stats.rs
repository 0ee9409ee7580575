//! Cache Statistics Module
//!
//! Hit/miss counters persisted across sessions, plus session-only counters
//! for evictions, expirations and failed persistence.

use serde::{Deserialize, Serialize};

// == Stats Record ==
/// The persisted part of the statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub hits: u64,
    pub misses: u64,
}

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of gets answered from either tier
    pub hits: u64,
    /// Number of gets that found nothing fresh
    pub misses: u64,
    /// Entries dropped to respect the memory tier capacity
    pub evictions: u64,
    /// Stale entries removed by gets or sweeps
    pub expirations: u64,
    /// Sets whose durable write was abandoned after the retry
    pub persist_failures: u64,
    /// Current number of entries in the memory tier
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes counting from a persisted record.
    pub fn from_record(record: StatsRecord) -> Self {
        Self {
            hits: record.hits,
            misses: record.misses,
            ..Self::default()
        }
    }

    /// The part of the stats that outlives the process.
    pub fn record(&self) -> StatsRecord {
        StatsRecord {
            hits: self.hits,
            misses: self.misses,
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_persist_failure(&mut self) {
        self.persist_failures += 1;
    }

    // == Update Entry Count ==
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
