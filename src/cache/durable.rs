//! Durable Tier Module
//!
//! Best-effort mirror of the memory tier on a `DurableStore`. Every failure
//! here is logged and absorbed: a write that cannot land leaves the entry
//! memory-only, a record that cannot be parsed is deleted and read as absent.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::stats::StatsRecord;
use crate::cache::{CacheEntry, TtlPolicy};
use crate::error::CacheError;
use crate::storage::DurableStore;

/// Namespace used when the configuration does not override it.
pub const DEFAULT_NAMESPACE: &str = "refcache:";

const ENTRY_SEGMENT: &str = "entry:";
const STATS_SEGMENT: &str = "stats";

/// Storage key of the record holding cache key `key`.
pub fn entry_storage_key(namespace: &str, key: &str) -> String {
    format!("{}{}{}", namespace, ENTRY_SEGMENT, key)
}

/// Storage key of the persisted statistics.
pub fn stats_storage_key(namespace: &str) -> String {
    format!("{}{}", namespace, STATS_SEGMENT)
}

// == Persist Outcome ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// First write succeeded
    Stored,
    /// Write succeeded after a cleanup pass removed this many records
    StoredAfterCleanup(usize),
    /// Both attempts failed; the entry is memory-only
    Abandoned,
}

/// Result of the start-up scan of the durable tier.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Fresh entries, oldest `created_at` first
    pub fresh: Vec<(String, CacheEntry<Value>)>,
    /// Stale or corrupt records deleted during the scan
    pub discarded: usize,
}

enum Record {
    Missing,
    Corrupt,
    Entry(CacheEntry<Value>),
}

// == Durable Tier ==
#[derive(Debug, Clone)]
pub struct DurableTier {
    store: Arc<dyn DurableStore>,
    namespace: String,
    ttl: TtlPolicy,
}

impl DurableTier {
    pub fn new(store: Arc<dyn DurableStore>, namespace: impl Into<String>, ttl: TtlPolicy) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            ttl,
        }
    }

    // == Persist ==
    /// Writes an entry through to the store.
    ///
    /// On failure, stale records are purged and the write is retried once.
    pub fn persist(&self, key: &str, entry: &CacheEntry<Value>) -> PersistOutcome {
        let serialized = match serde_json::to_string(entry) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(key, error = %err, "Failed to serialize cache entry, keeping it memory-only");
                return PersistOutcome::Abandoned;
            }
        };

        let storage_key = self.entry_key(key);
        let first_err = match self.store.write(&storage_key, &serialized) {
            Ok(()) => return PersistOutcome::Stored,
            Err(err) => err,
        };

        debug!(key, error = %first_err, "Durable write failed, purging expired records");
        let removed = self.cleanup_expired();

        match self.store.write(&storage_key, &serialized) {
            Ok(()) => PersistOutcome::StoredAfterCleanup(removed),
            Err(err) => {
                warn!(key, error = %err, "Durable write failed after cleanup, keeping entry memory-only");
                PersistOutcome::Abandoned
            }
        }
    }

    // == Load ==
    /// Reads an entry; corrupt records are deleted and read as absent.
    pub fn load(&self, key: &str) -> Option<CacheEntry<Value>> {
        match self.read_record(&self.entry_key(key)) {
            Record::Entry(entry) => Some(entry),
            Record::Missing | Record::Corrupt => None,
        }
    }

    // == Remove ==
    pub fn remove(&self, key: &str) {
        self.delete_storage_key(&self.entry_key(key));
    }

    // == Clear ==
    /// Deletes every entry record in the namespace. Stats are kept.
    pub fn clear(&self) -> usize {
        let keys = self.entry_storage_keys();
        for storage_key in &keys {
            self.delete_storage_key(storage_key);
        }
        keys.len()
    }

    // == Entry Keys ==
    /// Cache keys of every persisted entry.
    pub fn entry_keys(&self) -> Vec<String> {
        let prefix = self.entry_prefix();
        self.entry_storage_keys()
            .into_iter()
            .filter_map(|storage_key| storage_key.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    // == Cleanup Expired ==
    /// Deletes every persisted entry that is stale by its own TTL or corrupt.
    pub fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut removed = 0;

        for key in self.entry_keys() {
            let storage_key = self.entry_key(&key);
            match self.read_record(&storage_key) {
                Record::Entry(entry) if !entry.is_fresh(self.ttl.ttl_for_key(&key), now) => {
                    self.delete_storage_key(&storage_key);
                    removed += 1;
                }
                Record::Corrupt => removed += 1,
                Record::Entry(_) | Record::Missing => {}
            }
        }

        removed
    }

    // == Scan ==
    /// Loads every fresh entry for promotion and deletes the rest.
    pub fn scan(&self) -> ScanResult {
        let now = current_timestamp_ms();
        let mut result = ScanResult::default();

        for key in self.entry_keys() {
            let storage_key = self.entry_key(&key);
            match self.read_record(&storage_key) {
                Record::Entry(entry) if entry.is_fresh(self.ttl.ttl_for_key(&key), now) => {
                    result.fresh.push((key, entry));
                }
                Record::Entry(_) => {
                    self.delete_storage_key(&storage_key);
                    result.discarded += 1;
                }
                Record::Corrupt => result.discarded += 1,
                Record::Missing => {}
            }
        }

        result.fresh.sort_by_key(|(_, entry)| entry.created_at);
        result
    }

    // == Stats ==
    /// Loads persisted stats; missing or corrupt stats start from zero.
    pub fn load_stats(&self) -> StatsRecord {
        let storage_key = stats_storage_key(&self.namespace);
        match self.store.read(&storage_key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "Discarding corrupt stats record");
                self.delete_storage_key(&storage_key);
                StatsRecord::default()
            }),
            Ok(None) => StatsRecord::default(),
            Err(err) => {
                debug!(error = %err, "Stats unavailable, starting from zero");
                StatsRecord::default()
            }
        }
    }

    pub fn persist_stats(&self, record: StatsRecord) {
        let result = serde_json::to_string(&record)
            .map_err(CacheError::from)
            .and_then(|raw| self.store.write(&stats_storage_key(&self.namespace), &raw));

        if let Err(err) = result {
            debug!(error = %err, "Failed to persist stats");
        }
    }

    fn read_record(&self, storage_key: &str) -> Record {
        let raw = match self.store.read(storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Record::Missing,
            Err(err) => {
                debug!(storage_key, error = %err, "Durable read failed, treating as absent");
                return Record::Missing;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Record::Entry(entry),
            Err(err) => {
                warn!(storage_key, error = %err, "Deleting corrupt cache record");
                self.delete_storage_key(storage_key);
                Record::Corrupt
            }
        }
    }

    fn delete_storage_key(&self, storage_key: &str) {
        if let Err(err) = self.store.delete(storage_key) {
            debug!(storage_key, error = %err, "Durable delete failed");
        }
    }

    fn entry_storage_keys(&self) -> Vec<String> {
        self.store
            .list_keys(&self.entry_prefix())
            .unwrap_or_else(|err| {
                debug!(error = %err, "Failed to list durable records");
                Vec::new()
            })
    }

    fn entry_key(&self, key: &str) -> String {
        entry_storage_key(&self.namespace, key)
    }

    fn entry_prefix(&self) -> String {
        format!("{}{}", self.namespace, ENTRY_SEGMENT)
    }
}
