//! Per-object-key mutual exclusion.
//!
//! The pipeline reads and writes fixed object keys. Without coordination a
//! synthesis run can read a script that an upload is replacing, then publish
//! audio for the old text. Handlers take the locks for every key they touch
//! for the duration of the operation, so within one process the script that
//! was read and the audio that was written always belong together.
//!
//! The locks are process-local. Several gateway replicas sharing one bucket
//! still race and fall back to last-writer-wins on the bucket.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of async mutexes keyed by object key.
#[derive(Debug, Clone, Default)]
pub struct KeyLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// Guards held for a set of keys; released on drop.
#[derive(Debug)]
pub struct KeyGuards {
    #[cfg_attr(not(test), allow(dead_code))]
    keys: Vec<String>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex_for(&self, key: &str) -> Arc<Mutex<()>> {
        // Clone the Arc out so no map shard stays locked across an await
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Lock a single key.
    pub async fn lock(&self, key: &str) -> KeyGuards {
        self.lock_all(&[key]).await
    }

    /// Lock several keys.
    ///
    /// Keys are sorted and de-duplicated before acquisition so two callers
    /// asking for overlapping sets can never deadlock.
    pub async fn lock_all(&self, keys: &[&str]) -> KeyGuards {
        let mut ordered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        ordered.sort();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for key in &ordered {
            guards.push(self.mutex_for(key).lock_owned().await);
        }

        KeyGuards {
            keys: ordered,
            _guards: guards,
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.locks.len()
    }
}
