//! In-process durable store
//!
//! Backs the durable tier with a map. Supports a byte quota and an
//! availability switch so degraded-storage paths can be exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{CacheError, Result};
use crate::storage::{record_size, DurableStore};

// == Memory Store ==
#[derive(Debug)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
    quota_bytes: Option<u64>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            quota_bytes: None,
            available: AtomicBool::new(true),
        }
    }

    /// Creates a store that rejects writes once keys plus values exceed
    /// `quota_bytes`.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::new()
        }
    }

    /// Makes every operation fail while `available` is false.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(CacheError::Storage("store unavailable".to_string()));
        }
        self.records
            .lock()
            .map_err(|_| CacheError::Storage("store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStore for MemoryStore {
    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut records = self.lock()?;

        if let Some(quota) = self.quota_bytes {
            let used: u64 = records
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| record_size(k, v))
                .sum();
            let requested = record_size(key, value);
            if used + requested > quota {
                return Err(CacheError::QuotaExceeded {
                    used,
                    requested,
                    quota,
                });
            }
        }

        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
