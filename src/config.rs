//! Configuration Module
//!
//! Loads cache and server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::cache::{EvictionPolicy, TtlPolicy, DEFAULT_NAMESPACE, SWEEP_INTERVAL};

/// Memory tier capacity used when none is configured.
pub const DEFAULT_MAX_ENTRIES: usize = 20;

// == Cache Config ==
/// Parameters consumed by `TieredCache::new`.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Memory tier capacity
    pub max_entries: usize,
    /// Per-type TTL table
    pub ttl: TtlPolicy,
    /// Victim selection for a full memory tier
    pub eviction: EvictionPolicy,
    /// Prefix for every durable record
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: TtlPolicy::default(),
            eviction: EvictionPolicy::default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

// == Config ==
/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache: CacheConfig,
    /// Interval between stale-entry sweeps
    pub sweep_interval: Duration,
    /// Directory of the file-backed durable store
    pub storage_dir: PathBuf,
    /// Optional byte quota for the durable store
    pub storage_quota_bytes: Option<u64>,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Memory tier capacity (default: 20)
    /// - `DEFAULT_TTL_MS` - TTL for unlisted type tags (default: 300000)
    /// - `TTL_OVERRIDES` - Per-tag TTLs, `TAG=ms,TAG=ms`
    /// - `EVICTION_POLICY` - `fifo` or `lru` (default: fifo)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `STORAGE_DIR` - Durable store directory (default: .refcache)
    /// - `STORAGE_NAMESPACE` - Durable record prefix (default: refcache:)
    /// - `STORAGE_QUOTA_BYTES` - Durable store quota (default: none)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let default_ttl = parse_var::<u64>("DEFAULT_TTL_MS")
            .map(Duration::from_millis)
            .unwrap_or_else(|| defaults.cache.ttl.default_ttl());

        let mut ttl = TtlPolicy::default().with_default(default_ttl);
        if let Ok(raw) = env::var("TTL_OVERRIDES") {
            for (tag, duration) in parse_ttl_overrides(&raw) {
                ttl = ttl.with_ttl(tag, duration);
            }
        }

        let eviction = env::var("EVICTION_POLICY")
            .ok()
            .and_then(|raw| {
                raw.parse::<EvictionPolicy>()
                    .map_err(|err| warn!("Ignoring EVICTION_POLICY: {}", err))
                    .ok()
            })
            .unwrap_or(defaults.cache.eviction);

        Self {
            cache: CacheConfig {
                max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.cache.max_entries),
                ttl,
                eviction,
                namespace: env::var("STORAGE_NAMESPACE").unwrap_or(defaults.cache.namespace),
            },
            sweep_interval: parse_var("SWEEP_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            storage_quota_bytes: parse_var("STORAGE_QUOTA_BYTES"),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            sweep_interval: SWEEP_INTERVAL,
            storage_dir: PathBuf::from(".refcache"),
            storage_quota_bytes: None,
            server_port: 3000,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Parses `TAG=ms,TAG=ms`; malformed pairs are skipped.
fn parse_ttl_overrides(raw: &str) -> Vec<(String, Duration)> {
    raw.split(',')
        .filter_map(|pair| {
            let (tag, ms) = pair.split_once('=')?;
            let tag = tag.trim();
            let ms: u64 = ms.trim().parse().ok()?;
            if tag.is_empty() {
                return None;
            }
            Some((tag.to_string(), Duration::from_millis(ms)))
        })
        .collect()
}
