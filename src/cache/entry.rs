//! Cache Entry Module
//!
//! Defines the stored unit shared by the memory and durable tiers.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached payload with its insertion time and access counter.
///
/// Entries are never mutated apart from `access_count`; a refresh replaces
/// the entry wholesale. The serialized form is the durable record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The stored payload
    pub data: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Number of tier hits served by this entry
    pub access_count: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self::with_created_at(data, current_timestamp_ms())
    }

    /// Creates an entry with an explicit creation time.
    pub fn with_created_at(data: T, created_at: u64) -> Self {
        Self {
            data,
            created_at,
            access_count: 0,
        }
    }

    // == Age ==
    /// Milliseconds elapsed between creation and `now`.
    ///
    /// Clock skew that puts `created_at` in the future yields zero.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    // == Freshness ==
    /// An entry is fresh while its age is strictly below the TTL.
    pub fn is_fresh(&self, ttl: Duration, now: u64) -> bool {
        u128::from(self.age_ms(now)) < ttl.as_millis()
    }

    /// Checks staleness against the current time.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        !self.is_fresh(ttl, current_timestamp_ms())
    }

    // == Record Access ==
    pub fn record_access(&mut self) {
        self.access_count = self.access_count.saturating_add(1);
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(vec![1, 2, 3]);

        assert_eq!(entry.data, vec![1, 2, 3]);
        assert_eq!(entry.access_count, 0);
        assert!(entry.created_at > 0);
    }

    #[test]
    fn test_entry_fresh_then_stale() {
        let entry = CacheEntry::new("categories");
        let ttl = Duration::from_millis(200);

        assert!(!entry.is_stale(ttl));

        sleep(Duration::from_millis(250));

        assert!(entry.is_stale(ttl));
    }

    #[test]
    fn test_staleness_boundary_condition() {
        let entry = CacheEntry::with_created_at((), 1_000);
        let ttl = Duration::from_millis(500);

        assert!(entry.is_fresh(ttl, 1_499));
        // Age equal to the TTL counts as stale
        assert!(!entry.is_fresh(ttl, 1_500));
    }

    #[test]
    fn test_future_created_at_is_fresh() {
        let entry = CacheEntry::with_created_at((), 5_000);
        assert_eq!(entry.age_ms(1_000), 0);
        assert!(entry.is_fresh(Duration::from_millis(1), 1_000));
    }

    #[test]
    fn test_record_access() {
        let mut entry = CacheEntry::new(());
        let created_at = entry.created_at;

        entry.record_access();
        entry.record_access();

        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.created_at, created_at);
    }

    #[test]
    fn test_record_format() {
        let entry = CacheEntry {
            data: json!([{"id": 1}]),
            created_at: 42,
            access_count: 3,
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"data": [{"id": 1}], "createdAt": 42, "accessCount": 3})
        );

        let back: CacheEntry<serde_json::Value> = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
