//! Per-key locking for multi-key operations.
//!
//! A paginated value spans several backend keys, so a store racing a retrieve
//! or delete on the same base key can interleave and leave a mixed value
//! behind. The lock manager serializes such operations per base key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::error::{StorageError, StorageResult};

/// Registry of one mutex per base key.
#[derive(Default)]
pub struct KeyLockManager {
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLockManager {
    /// Creates an empty lock manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets or creates the lock for `key`.
    fn get_lock(&self, key: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(lock) = locks.get(key) {
                return Arc::clone(lock);
            }
        }

        let mut locks = self.locks.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Returns the number of tracked keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.locks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Executes `f` while holding the lock for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned or `f` fails.
    pub fn with_key_lock<R, F>(&self, key: &str, f: F) -> StorageResult<R>
    where
        F: FnOnce() -> StorageResult<R>,
    {
        let lock = self.get_lock(key);
        let _guard = lock
            .lock()
            .map_err(|e| StorageError::Lock(format!("mutex poisoned: {e}")))?;
        f()
    }
}
