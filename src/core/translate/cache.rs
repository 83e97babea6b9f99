//! Single-flight table cache
//!
//! Translation tables are read many times per run but change rarely. The
//! cache loads a table once and hands out shared references; concurrent
//! first accesses wait for one load instead of each issuing their own.

use crate::domain::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lazily loaded, explicitly invalidated table slot
pub struct CachedTable<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> CachedTable<T> {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached value, loading it on first use
    ///
    /// The slot lock is held across the load, so a concurrent caller waits
    /// for the in-flight load and then reuses its result. A failed load
    /// caches nothing; the next caller retries.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }

        let loaded = Arc::new(load().await?);
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drops the cached value; the next access reloads
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }

    /// True when a value is currently cached
    pub async fn is_loaded(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

impl<T> Default for CachedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
