//! Cache Store Module
//!
//! `TieredCache` composes the memory tier, durable tier, TTL policy and
//! statistics behind the public get/set/invalidate surface. No operation
//! returns an error: storage and serialization faults degrade to a miss or
//! to memory-only caching.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{
    build_key, current_timestamp_ms, CacheEntry, CacheStats, DurableTier, Identifier, MemoryTier,
    PersistOutcome, TtlPolicy,
};
use crate::config::CacheConfig;
use crate::storage::DurableStore;

// == Tiered Cache ==
#[derive(Debug)]
pub struct TieredCache {
    memory: MemoryTier,
    durable: DurableTier,
    ttl: TtlPolicy,
    stats: CacheStats,
}

impl TieredCache {
    // == Constructor ==
    /// Creates a cache over `store`, resuming persisted stats and promoting
    /// every fresh durable entry into memory (oldest first).
    pub fn new(config: &CacheConfig, store: Arc<dyn DurableStore>) -> Self {
        let durable = DurableTier::new(store, config.namespace.clone(), config.ttl.clone());
        let stats = CacheStats::from_record(durable.load_stats());

        let mut cache = Self {
            memory: MemoryTier::new(config.max_entries, config.eviction),
            durable,
            ttl: config.ttl.clone(),
            stats,
        };
        cache.warm_from_durable();
        cache
    }

    // == Get ==
    /// Returns the cached payload for `(type_tag, identifier)` if fresh.
    ///
    /// Records exactly one hit or miss. A payload that does not decode as
    /// `T` counts as a miss.
    pub fn get<T: DeserializeOwned>(
        &mut self,
        type_tag: &str,
        identifier: impl Into<Identifier>,
    ) -> Option<T> {
        let key = build_key(type_tag, &identifier.into());
        let result = self.lookup(&key);

        if result.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        self.durable.persist_stats(self.stats.record());

        result
    }

    // == Set ==
    /// Stores a brand-new entry in both tiers.
    ///
    /// Durable persistence is best effort; the memory write always happens
    /// unless the payload cannot be serialized at all.
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        type_tag: &str,
        identifier: impl Into<Identifier>,
        data: &T,
    ) {
        let key = build_key(type_tag, &identifier.into());
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "Dropping unserializable cache payload");
                return;
            }
        };

        let entry = CacheEntry::new(value);
        match self.durable.persist(&key, &entry) {
            PersistOutcome::Stored => {}
            PersistOutcome::StoredAfterCleanup(removed) => {
                self.stats.record_expirations(removed);
            }
            PersistOutcome::Abandoned => {
                // A previous record for this key must not outlive the new value
                self.durable.remove(&key);
                self.stats.record_persist_failure();
            }
        }

        debug!(key = %key, "Cached entry");
        self.insert_memory(key, entry);
    }

    // == Contains ==
    /// Whether a fresh entry exists, without touching stats or counters.
    pub fn contains(&self, type_tag: &str, identifier: impl Into<Identifier>) -> bool {
        let key = build_key(type_tag, &identifier.into());
        let ttl = self.ttl.ttl_for_key(&key);
        let now = current_timestamp_ms();

        match self.memory.get(&key) {
            Some(entry) => entry.is_fresh(ttl, now),
            None => self
                .durable
                .load(&key)
                .map(|entry| entry.is_fresh(ttl, now))
                .unwrap_or(false),
        }
    }

    // == Invalidate All ==
    /// Clears both tiers. Statistics are kept.
    pub fn invalidate_all(&mut self) -> usize {
        let removed = self.memory.clear();
        let persisted = self.durable.clear();
        info!(memory = removed, durable = persisted, "Invalidated all cache entries");
        removed
    }

    // == Invalidate By Type ==
    /// Removes every entry, in either tier, built with `type_tag`.
    pub fn invalidate_by_type(&mut self, type_tag: &str) -> usize {
        let keys: BTreeSet<String> = self
            .memory
            .keys()
            .into_iter()
            .chain(self.durable.entry_keys())
            .filter(|key| self.ttl.owns(type_tag, key))
            .collect();

        for key in &keys {
            self.memory.remove(key);
            self.durable.remove(key);
        }

        info!(type_tag, removed = keys.len(), "Invalidated cache entries by type");
        keys.len()
    }

    // == Sweep Expired ==
    /// Removes stale entries from both tiers. Returns how many were removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let stale: Vec<String> = self
            .memory
            .iter()
            .filter(|(key, entry)| !entry.is_fresh(self.ttl.ttl_for_key(key), now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            self.memory.remove(key);
            self.durable.remove(key);
        }

        let removed = stale.len() + self.durable.cleanup_expired();
        self.stats.record_expirations(removed);
        removed
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.memory.len());
        stats
    }

    /// Number of entries in the memory tier.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    fn lookup<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let ttl = self.ttl.ttl_for_key(key);
        let now = current_timestamp_ms();

        if let Some(entry) = self.memory.get(key) {
            if entry.is_fresh(ttl, now) {
                let entry = self.memory.touch(key)?;
                return decode(key, &entry.data);
            }
            debug!(key, "Memory entry stale, removing from both tiers");
            self.expire(key);
            return None;
        }

        let mut entry = self.durable.load(key)?;
        if !entry.is_fresh(ttl, now) {
            debug!(key, "Durable entry stale, removing");
            self.expire(key);
            return None;
        }

        entry.record_access();
        let data = decode(key, &entry.data);
        debug!(key, "Promoting durable entry into memory");
        self.insert_memory(key.to_string(), entry);
        data
    }

    fn insert_memory(&mut self, key: String, entry: CacheEntry<Value>) {
        if let Some(evicted) = self.memory.put(key, entry) {
            debug!(key = %evicted, "Evicted oldest entry");
            self.durable.remove(&evicted);
            self.stats.record_eviction();
        }
    }

    fn expire(&mut self, key: &str) {
        self.memory.remove(key);
        self.durable.remove(key);
        self.stats.record_expirations(1);
    }

    fn warm_from_durable(&mut self) {
        let scan = self.durable.scan();
        let promoted = scan.fresh.len();

        for (key, entry) in scan.fresh {
            self.insert_memory(key, entry);
        }
        self.stats.record_expirations(scan.discarded);

        info!(
            promoted,
            discarded = scan.discarded,
            resident = self.memory.len(),
            "Cache warmed from durable tier"
        );
    }
}

fn decode<T: DeserializeOwned>(key: &str, data: &Value) -> Option<T> {
    T::deserialize(data)
        .map_err(|err| warn!(key, error = %err, "Cached payload has unexpected shape"))
        .ok()
}
