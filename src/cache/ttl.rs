//! TTL Policy Module
//!
//! Static table mapping content-type tags to their maximum entry age.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::key::KEY_SEPARATOR;

/// Fallback TTL for tags missing from the table.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

// == TTL Policy ==
/// Read-only mapping of type tag to time-to-live.
#[derive(Debug, Clone, PartialEq)]
pub struct TtlPolicy {
    table: HashMap<String, Duration>,
    default: Duration,
}

impl TtlPolicy {
    /// Creates an empty policy where every tag uses `default`.
    pub fn new(default: Duration) -> Self {
        Self {
            table: HashMap::new(),
            default,
        }
    }

    /// Adds or replaces the TTL for a tag.
    pub fn with_ttl(mut self, type_tag: impl Into<String>, ttl: Duration) -> Self {
        self.table.insert(type_tag.into(), ttl);
        self
    }

    /// Replaces the fallback TTL, keeping the table.
    pub fn with_default(mut self, default: Duration) -> Self {
        self.default = default;
        self
    }

    /// TTL for a type tag, or the default for unknown tags.
    pub fn ttl_for(&self, type_tag: &str) -> Duration {
        self.table.get(type_tag).copied().unwrap_or(self.default)
    }

    /// TTL for a stored key, resolved through the tag that owns it.
    pub fn ttl_for_key(&self, key: &str) -> Duration {
        self.resolve_tag(key)
            .map(|tag| self.ttl_for(tag))
            .unwrap_or(self.default)
    }

    /// Whether `key` may have been built with `type_tag`.
    ///
    /// Any key starting with `{type_tag}_` matches, so `CATEGORY` also claims
    /// `CATEGORY_POSTS_*` keys.
    pub fn owns(&self, type_tag: &str, key: &str) -> bool {
        has_tag_prefix(key, type_tag)
    }

    /// Default TTL for unknown tags.
    pub fn default_ttl(&self) -> Duration {
        self.default
    }

    /// Longest registered tag whose prefix matches the key.
    fn resolve_tag(&self, key: &str) -> Option<&str> {
        self.table
            .keys()
            .filter(|tag| has_tag_prefix(key, tag))
            .max_by_key(|tag| tag.len())
            .map(String::as_str)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
            .with_ttl("CATEGORIES", Duration::from_secs(30 * 60))
            .with_ttl("CATEGORY", Duration::from_secs(30 * 60))
            .with_ttl("CATEGORY_POSTS", Duration::from_secs(10 * 60))
            .with_ttl("TAGS", Duration::from_secs(30 * 60))
    }
}

fn has_tag_prefix(key: &str, type_tag: &str) -> bool {
    key.strip_prefix(type_tag)
        .map(|rest| rest.starts_with(KEY_SEPARATOR))
        .unwrap_or(false)
}
