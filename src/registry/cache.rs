//! Cached list of subscribed event keys
//!
//! A dirty-flag cache: `None` means invalid. Invalidation happens while the
//! caller holds the registry write lock and rebuilds are stored while the
//! caller holds the registry read lock, so a valid cache always matches the
//! registry's key set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::event::EventKey;

#[derive(Debug, Default)]
pub(crate) struct KeyCache {
    keys: RwLock<Option<Arc<[EventKey]>>>,
    rebuilds: AtomicU64,
}

impl KeyCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cached keys, if valid
    pub(crate) async fn get(&self) -> Option<Arc<[EventKey]>> {
        self.keys.read().await.clone()
    }

    /// Store a freshly computed key list and mark the cache valid
    pub(crate) async fn store(&self, keys: Arc<[EventKey]>) {
        *self.keys.write().await = Some(keys);
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) async fn invalidate(&self) {
        self.keys.write().await.take();
    }

    /// How many times the cache has been rebuilt
    pub(crate) fn rebuilds(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }
}
