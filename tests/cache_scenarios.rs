//! Scenario tests for the tiered cache
//!
//! Drive the public facade over in-memory and file-backed durable stores.

use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use refdata_cache::cache::{
    current_timestamp_ms, entry_storage_key, stats_storage_key, CacheEntry, TtlPolicy,
    DEFAULT_NAMESPACE,
};
use refdata_cache::{CacheConfig, DurableStore, FileStore, Identifier, MemoryStore, TieredCache};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;

// == Helper Functions ==

fn config(max_entries: usize) -> CacheConfig {
    CacheConfig {
        max_entries,
        ttl: TtlPolicy::new(Duration::from_secs(600)).with_ttl("CATS", Duration::from_millis(1000)),
        ..CacheConfig::default()
    }
}

fn record_key(key: &str) -> String {
    entry_storage_key(DEFAULT_NAMESPACE, key)
}

fn seed(store: &dyn DurableStore, key: &str, data: Value, created_at: u64) {
    let entry = CacheEntry::with_created_at(data, created_at);
    store
        .write(&record_key(key), &serde_json::to_string(&entry).unwrap())
        .unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Category {
    id: u32,
}

// == TTL Scenario ==

#[test]
fn test_ttl_scenario_cats() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = TieredCache::new(&config(20), store.clone());

    cache.set("CATS", "all", &vec![Category { id: 1 }]);

    assert_eq!(
        cache.get::<Vec<Category>>("CATS", "all"),
        Some(vec![Category { id: 1 }])
    );
    assert_eq!(cache.stats().hits, 1);

    sleep(Duration::from_millis(1100));

    assert_eq!(cache.get::<Vec<Category>>("CATS", "all"), None);
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(store.read(&record_key("CATS_all")).unwrap(), None);
}

// == Capacity Scenario ==

#[test]
fn test_capacity_scenario_max_two() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = TieredCache::new(&config(2), store.clone());

    cache.set("DOGS", "k1", &1);
    sleep(Duration::from_millis(2));
    cache.set("DOGS", "k2", &2);
    sleep(Duration::from_millis(2));
    cache.set("DOGS", "k3", &3);

    assert!(!cache.contains("DOGS", "k1"));
    assert_eq!(store.read(&record_key("DOGS_k1")).unwrap(), None);
    assert_eq!(cache.get::<i32>("DOGS", "k2"), Some(2));
    assert_eq!(cache.get::<i32>("DOGS", "k3"), Some(3));
}

// == Corruption Scenario ==

#[test]
fn test_corrupt_durable_record_is_absent_and_removed() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = TieredCache::new(&config(20), store.clone());

    store.write(&record_key("DOGS_all"), "{\"data\": [1, 2").unwrap();

    assert_eq!(cache.get::<Value>("DOGS", "all"), None);
    assert_eq!(store.read(&record_key("DOGS_all")).unwrap(), None);

    // Repeating is harmless
    assert_eq!(cache.get::<Value>("DOGS", "all"), None);
    assert_eq!(cache.stats().misses, 2);
}

// == Warm Start ==

#[test]
fn test_warm_start_promotes_fresh_and_drops_stale() {
    let store = Arc::new(MemoryStore::new());
    let now = current_timestamp_ms();

    seed(store.as_ref(), "DOGS_a", json!("a"), now - 30);
    seed(store.as_ref(), "DOGS_b", json!("b"), now - 20);
    seed(store.as_ref(), "CATS_old", json!("old"), now - 5_000);
    store.write(&record_key("DOGS_broken"), "nope").unwrap();

    let mut cache = TieredCache::new(&config(20), store.clone());

    assert_eq!(cache.len(), 2);
    assert_eq!(store.read(&record_key("CATS_old")).unwrap(), None);
    assert_eq!(store.read(&record_key("DOGS_broken")).unwrap(), None);
    assert_eq!(cache.get::<String>("DOGS", "a"), Some("a".to_string()));
}

#[test]
fn test_warm_start_overflow_evicts_oldest_persisted() {
    let store = Arc::new(MemoryStore::new());
    let now = current_timestamp_ms();

    // Seeded out of order on purpose
    seed(store.as_ref(), "DOGS_newest", json!(3), now - 10);
    seed(store.as_ref(), "DOGS_oldest", json!(1), now - 30);
    seed(store.as_ref(), "DOGS_middle", json!(2), now - 20);

    let cache = TieredCache::new(&config(2), store.clone());

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains("DOGS", "oldest"));
    assert_eq!(store.read(&record_key("DOGS_oldest")).unwrap(), None);
    assert!(cache.contains("DOGS", "middle"));
    assert!(cache.contains("DOGS", "newest"));
}

// == Durable Store Full ==

#[test]
fn test_full_store_degrades_to_memory_only() {
    let store = Arc::new(MemoryStore::with_quota(64));
    let mut cache = TieredCache::new(&config(20), store.clone());

    let big = "x".repeat(200);
    cache.set("DOGS", "big", &big);

    assert_eq!(store.read(&record_key("DOGS_big")).unwrap(), None);
    assert_eq!(cache.get::<String>("DOGS", "big"), Some(big));
    assert_eq!(cache.stats().persist_failures, 1);
}

#[test]
fn test_replaced_value_not_resurrected_after_restart() {
    let store = Arc::new(MemoryStore::with_quota(200));

    {
        let mut cache = TieredCache::new(&config(20), store.clone());
        cache.set("TAGS", "all", &"v1");
        cache.set("TAGS", "all", &"x".repeat(300));
    }

    assert_eq!(store.read(&record_key("TAGS_all")).unwrap(), None);

    let mut cache = TieredCache::new(&config(20), store);
    assert_eq!(cache.get::<String>("TAGS", "all"), None);
}

// == Structured Identifiers ==

#[test]
fn test_params_identifier_field_order() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = TieredCache::new(&config(20), store);

    cache.set(
        "POSTS",
        json!({"category": "news", "page": 1}),
        &json!(["first"]),
    );

    let reordered = Identifier::Params(json!({"page": 1, "category": "news"}));
    assert_eq!(cache.get::<Value>("POSTS", reordered), Some(json!(["first"])));
}

// == Stats Persistence ==

#[test]
fn test_stats_survive_invalidation_and_restart() {
    let tmp = TempDir::new().unwrap();

    {
        let store = Arc::new(FileStore::open(tmp.path(), None).unwrap());
        let mut cache = TieredCache::new(&config(20), store);
        cache.set("DOGS", "all", &json!([1]));
        cache.get::<Value>("DOGS", "all");
        cache.get::<Value>("DOGS", "none");
        cache.invalidate_all();

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    let store = Arc::new(FileStore::open(tmp.path(), None).unwrap());
    assert!(store
        .read(&stats_storage_key(DEFAULT_NAMESPACE))
        .unwrap()
        .is_some());

    let cache = TieredCache::new(&config(20), store);
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
    assert_eq!(stats.total_entries, 0);
}

// == File Store Round Trip ==

#[test]
fn test_file_store_restart_restores_entries() {
    let tmp = TempDir::new().unwrap();

    {
        let store = Arc::new(FileStore::open(tmp.path(), None).unwrap());
        let mut cache = TieredCache::new(&config(20), store);
        cache.set("DOGS", json!({"breed": "collie"}), &json!({"name": "Lassie"}));
    }

    let store = Arc::new(FileStore::open(tmp.path(), None).unwrap());
    let mut cache = TieredCache::new(&config(20), store);

    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.get::<Value>("DOGS", json!({"breed": "collie"})),
        Some(json!({"name": "Lassie"}))
    );
}

// == Namespaces ==

#[test]
fn test_invalidate_all_only_touches_own_namespace() {
    let store = Arc::new(MemoryStore::new());
    store.write("other-app:settings", "{}").unwrap();

    let mut cache = TieredCache::new(&config(20), store.clone());
    cache.set("DOGS", "all", &1);
    cache.invalidate_all();

    assert_eq!(store.read("other-app:settings").unwrap(), Some("{}".to_string()));
}
