//! Memory Tier Module
//!
//! Bounded process-local map of key to entry. Capacity is enforced on
//! insert of a new key by evicting one victim chosen by the policy.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::eviction::{EvictionCandidate, EvictionPolicy};
use crate::cache::CacheEntry;

#[derive(Debug)]
struct Slot {
    entry: CacheEntry<Value>,
    inserted: u64,
    last_access: u64,
}

// == Memory Tier ==
#[derive(Debug)]
pub struct MemoryTier {
    slots: HashMap<String, Slot>,
    max_size: usize,
    policy: EvictionPolicy,
    /// Monotonic sequence for insertion and access ordering
    tick: u64,
}

impl MemoryTier {
    // == Constructor ==
    /// Creates an empty tier holding at most `max_size` entries (minimum 1).
    pub fn new(max_size: usize, policy: EvictionPolicy) -> Self {
        Self {
            slots: HashMap::new(),
            max_size: max_size.max(1),
            policy,
            tick: 0,
        }
    }

    // == Get ==
    pub fn get(&self, key: &str) -> Option<&CacheEntry<Value>> {
        self.slots.get(key).map(|slot| &slot.entry)
    }

    // == Touch ==
    /// Records a hit: bumps the access counter and the access order.
    pub fn touch(&mut self, key: &str) -> Option<&CacheEntry<Value>> {
        let tick = self.next_tick();
        let slot = self.slots.get_mut(key)?;
        slot.entry.record_access();
        slot.last_access = tick;
        Some(&slot.entry)
    }

    // == Put ==
    /// Stores an entry, replacing any previous entry for the key.
    ///
    /// Returns the key evicted to make room, if a new key hit the capacity.
    pub fn put(&mut self, key: String, entry: CacheEntry<Value>) -> Option<String> {
        let evicted = if !self.slots.contains_key(&key) && self.slots.len() >= self.max_size {
            self.evict_one()
        } else {
            None
        };

        let tick = self.next_tick();
        self.slots.insert(
            key,
            Slot {
                entry,
                inserted: tick,
                last_access: tick,
            },
        );

        evicted
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<Value>> {
        self.slots.remove(key).map(|slot| slot.entry)
    }

    // == Clear ==
    /// Drops every entry and returns how many were held.
    pub fn clear(&mut self) -> usize {
        let count = self.slots.len();
        self.slots.clear();
        count
    }

    // == Keys ==
    pub fn keys(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }

    /// Iterates keys with their entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry<Value>)> {
        self.slots.iter().map(|(key, slot)| (key, &slot.entry))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    fn evict_one(&mut self) -> Option<String> {
        let victim = self
            .policy
            .select_victim(self.slots.iter().map(|(key, slot)| EvictionCandidate {
                key: key.as_str(),
                created_at: slot.entry.created_at,
                inserted: slot.inserted,
                last_access: slot.last_access,
            }))?
            .to_string();

        self.slots.remove(&victim);
        Some(victim)
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_at(created_at: u64) -> CacheEntry<Value> {
        CacheEntry::with_created_at(json!(created_at), created_at)
    }

    #[test]
    fn test_put_and_get() {
        let mut tier = MemoryTier::new(4, EvictionPolicy::Fifo);

        assert_eq!(tier.put("k1".to_string(), entry_at(1)), None);

        assert_eq!(tier.get("k1").map(|e| e.data.clone()), Some(json!(1)));
        assert_eq!(tier.len(), 1);
    }

    #[test]
    fn test_fifo_eviction_by_created_at() {
        let mut tier = MemoryTier::new(2, EvictionPolicy::Fifo);

        tier.put("k1".to_string(), entry_at(0));
        tier.put("k2".to_string(), entry_at(1));
        let evicted = tier.put("k3".to_string(), entry_at(2));

        assert_eq!(evicted.as_deref(), Some("k1"));
        assert!(tier.get("k1").is_none());
        assert!(tier.get("k2").is_some());
        assert!(tier.get("k3").is_some());
    }

    #[test]
    fn test_fifo_ignores_hits() {
        let mut tier = MemoryTier::new(2, EvictionPolicy::Fifo);

        tier.put("k1".to_string(), entry_at(0));
        tier.put("k2".to_string(), entry_at(1));
        tier.touch("k1");

        assert_eq!(tier.put("k3".to_string(), entry_at(2)).as_deref(), Some("k1"));
    }

    #[test]
    fn test_lru_respects_hits() {
        let mut tier = MemoryTier::new(2, EvictionPolicy::Lru);

        tier.put("k1".to_string(), entry_at(0));
        tier.put("k2".to_string(), entry_at(1));
        tier.touch("k1");

        assert_eq!(tier.put("k3".to_string(), entry_at(2)).as_deref(), Some("k2"));
    }

    #[test]
    fn test_replace_existing_key_does_not_evict() {
        let mut tier = MemoryTier::new(2, EvictionPolicy::Fifo);

        tier.put("k1".to_string(), entry_at(0));
        tier.put("k2".to_string(), entry_at(1));

        assert_eq!(tier.put("k1".to_string(), entry_at(5)), None);
        assert_eq!(tier.len(), 2);
        assert_eq!(tier.get("k1").map(|e| e.created_at), Some(5));
    }

    #[test]
    fn test_touch_counts_access() {
        let mut tier = MemoryTier::new(2, EvictionPolicy::Fifo);
        tier.put("k1".to_string(), entry_at(0));

        tier.touch("k1");
        tier.touch("k1");

        assert_eq!(tier.get("k1").map(|e| e.access_count), Some(2));
        assert!(tier.touch("missing").is_none());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut tier = MemoryTier::new(0, EvictionPolicy::Fifo);
        tier.put("k1".to_string(), entry_at(0));
        tier.put("k2".to_string(), entry_at(1));

        assert_eq!(tier.capacity(), 1);
        assert_eq!(tier.keys(), vec!["k2".to_string()]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut tier = MemoryTier::new(4, EvictionPolicy::Fifo);
        tier.put("k1".to_string(), entry_at(0));
        tier.put("k2".to_string(), entry_at(1));

        assert!(tier.remove("k1").is_some());
        assert!(tier.remove("k1").is_none());
        assert_eq!(tier.clear(), 1);
        assert!(tier.is_empty());
    }
}
