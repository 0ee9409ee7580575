//! Durable Storage Module
//!
//! The key-value contract backing the durable tier, with an in-process
//! backend and a file-backed one.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

// == Durable Store ==
/// String key-value store used as the cache's durable tier.
///
/// Implementations guard their own state and may be shared across threads.
/// Failures are reported, never panicked on; the cache decides how to
/// degrade.
pub trait DurableStore: Send + Sync + std::fmt::Debug {
    /// Persists `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Reads the value under `key`, or None when absent.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Deletes `key`. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> Result<()>;

    /// Lists every stored key starting with `prefix`.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Bytes a key-value pair occupies against a store quota.
pub(crate) fn record_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}
