//! Serialized paginated store.

use super::error::StorageResult;
use super::lock::KeyLockManager;
use super::paginated::{
    delete_secure_paginated, retrieve_secure_paginated, store_secure_paginated,
};
use super::traits::SecureKeyValueStore;

/// Paginated storage over a backend, with every operation on a base key
/// holding that key's lock for its full duration.
pub struct PaginatedSecureStore<S: SecureKeyValueStore> {
    backend: S,
    locks: KeyLockManager,
}

impl<S: SecureKeyValueStore> PaginatedSecureStore<S> {
    /// Wraps `backend`.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            locks: KeyLockManager::new(),
        }
    }

    /// Returns the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Replaces the value under `base_key` with `data`.
    ///
    /// # Errors
    ///
    /// See [`store_secure_paginated`].
    pub fn store(&self, base_key: &str, data: &str) -> StorageResult<()> {
        self.locks.with_key_lock(base_key, || {
            store_secure_paginated(&self.backend, base_key, data, false)
        })
    }

    /// Writes `data` under `base_key` without deleting the previous value
    /// first. Chunks of a longer previous value are leaked.
    ///
    /// # Errors
    ///
    /// See [`store_secure_paginated`].
    pub fn store_without_delete(&self, base_key: &str, data: &str) -> StorageResult<()> {
        self.locks.with_key_lock(base_key, || {
            store_secure_paginated(&self.backend, base_key, data, true)
        })
    }

    /// Reads the value under `base_key`; `None` if absent or corrupted.
    ///
    /// # Errors
    ///
    /// Returns an error only if the key lock is poisoned.
    pub fn retrieve(&self, base_key: &str) -> StorageResult<Option<String>> {
        self.locks.with_key_lock(base_key, || {
            Ok(retrieve_secure_paginated(&self.backend, base_key))
        })
    }

    /// Deletes the value under `base_key`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the key lock is poisoned.
    pub fn delete(&self, base_key: &str) -> StorageResult<()> {
        self.locks.with_key_lock(base_key, || {
            delete_secure_paginated(&self.backend, base_key);
            Ok(())
        })
    }
}
