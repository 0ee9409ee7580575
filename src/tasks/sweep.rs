//! Stale-Entry Sweep Task
//!
//! Background task that periodically removes TTL-expired entries from both
//! cache tiers, independent of capacity pressure.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TieredCache;

// == Sweep Handle ==
/// Owns the running sweep task. Stopping or dropping the handle aborts it.
#[derive(Debug)]
pub struct SweepHandle {
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Aborts the sweep task.
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a background task that sweeps stale entries every `interval`.
///
/// The first sweep runs one full interval after spawning. Each pass holds
/// the cache write lock, so it never interleaves with a get or set.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(TieredCache::new(&config, store)));
/// let sweeper = spawn_sweep_task(cache.clone(), SWEEP_INTERVAL);
/// // Later, during shutdown:
/// sweeper.stop();
/// ```
pub fn spawn_sweep_task(cache: Arc<RwLock<TieredCache>>, interval: Duration) -> SweepHandle {
    let task = tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.sweep_expired()
            };

            if removed > 0 {
                info!("Cache sweep: removed {} stale entries", removed);
            } else {
                debug!("Cache sweep: no stale entries found");
            }
        }
    });

    SweepHandle { task }
}
