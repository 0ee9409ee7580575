//! Reference-data cache
//!
//! Two-tier cache for reference data: a bounded memory tier in front of a
//! best-effort durable tier, with per-type TTL, FIFO eviction, a periodic
//! stale-entry sweep and statistics that survive restarts.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStats, Identifier, TieredCache};
pub use config::{CacheConfig, Config};
pub use storage::{DurableStore, FileStore, MemoryStore};
pub use tasks::{spawn_sweep_task, SweepHandle};
