//! Per-asset mutual exclusion
//!
//! Mutating operations against one asset id must not interleave: a lost
//! update between reading a record and writing its replacement corrupts the
//! version chain and can strand temp files. Callers take the asset's lock
//! for the whole read-transform-write sequence. The record-level
//! `processing` flag is observable state only, never a mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// A keyed map of asynchronous locks, one per asset id.
#[derive(Default)]
pub struct AssetLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl AssetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for an asset, waiting if another operation holds it.
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop lock entries no longer held by anyone. Called after deletes to
    /// keep the map from growing with dead ids.
    pub fn prune(&self) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.retain(|_, lock| Arc::strong_count(lock) > 1 || lock.try_lock().is_err());
    }
}
