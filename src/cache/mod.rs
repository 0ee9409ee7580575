//! Cache Module
//!
//! Two-tier reference-data cache: a bounded memory tier in front of a
//! best-effort durable tier, with per-type TTL and persisted statistics.

mod durable;
mod entry;
mod eviction;
mod key;
mod memory;
mod stats;
mod store;
mod ttl;


use std::time::Duration;

// Re-export public types
pub use durable::{
    entry_storage_key, stats_storage_key, DurableTier, PersistOutcome, ScanResult,
    DEFAULT_NAMESPACE,
};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use eviction::{EvictionCandidate, EvictionPolicy};
pub use key::{build_key, Identifier, KEY_SEPARATOR};
pub use memory::MemoryTier;
pub use stats::{CacheStats, StatsRecord};
pub use store::TieredCache;
pub use ttl::{TtlPolicy, DEFAULT_TTL};

// == Public Constants ==
/// Interval between background sweeps of stale entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
