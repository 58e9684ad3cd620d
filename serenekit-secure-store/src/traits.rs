//! Platform interfaces for secure storage.

use super::error::StorageResult;

/// Size-limited secure key-value store provided by the platform.
///
/// Platform implementations typically wrap:
/// - iOS: Keychain Services
/// - Android: `EncryptedSharedPreferences` backed by the Android Keystore
///
/// Every call must be individually atomic. Backends are only expected to hold
/// small values (about 2048 characters per key); longer values go through
/// [`crate::store_secure_paginated`].
pub trait SecureKeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails. Callers treat "item not found" and
    /// "decryption failed" style errors as absence.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or the value exceeds the per-key limit.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails. Deleting a missing key may fail
    /// on some platforms.
    fn delete_item(&self, key: &str) -> StorageResult<()>;
}
