//! Eviction Policy Module
//!
//! Chooses which memory-tier entry to drop when a new key needs a slot.

use std::fmt;
use std::str::FromStr;

// == Eviction Policy ==
/// Victim selection strategy for a full memory tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Evict the entry with the oldest creation time
    #[default]
    Fifo,
    /// Evict the entry whose last insert or hit is oldest
    Lru,
}

/// What the policy sees of each resident entry.
#[derive(Debug, Clone, Copy)]
pub struct EvictionCandidate<'a> {
    pub key: &'a str,
    /// Entry creation time (Unix milliseconds)
    pub created_at: u64,
    /// Tier-local insertion sequence, breaks `created_at` ties
    pub inserted: u64,
    /// Tier-local sequence of the latest insert or hit
    pub last_access: u64,
}

impl EvictionPolicy {
    // == Select Victim ==
    /// Returns the key to evict, or None when there are no candidates.
    pub fn select_victim<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = EvictionCandidate<'a>>,
    {
        let candidates = candidates.into_iter();
        let victim = match self {
            EvictionPolicy::Fifo => candidates.min_by_key(|c| (c.created_at, c.inserted)),
            EvictionPolicy::Lru => candidates.min_by_key(|c| c.last_access),
        };
        victim.map(|c| c.key)
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(EvictionPolicy::Fifo),
            "lru" => Ok(EvictionPolicy::Lru),
            other => Err(format!("unknown eviction policy '{}'", other)),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Fifo => f.write_str("fifo"),
            EvictionPolicy::Lru => f.write_str("lru"),
        }
    }
}
