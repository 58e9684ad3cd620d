//! In-memory secure store for testing.
//!
//! NOT secure for production use. Values are kept in plaintext; the store only
//! mimics the platform behaviors the paginated layer has to cope with: a
//! per-value size cap, undecryptable entries and failing writes.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use super::error::{StorageError, StorageResult};
use super::paginated::CHUNK_SIZE;
use super::traits::SecureKeyValueStore;

/// In-memory [`SecureKeyValueStore`] backed by a `HashMap`.
pub struct MemorySecureStore {
    items: RwLock<HashMap<String, String>>,
    corrupted: RwLock<HashSet<String>>,
    failing_writes: RwLock<HashSet<String>>,
    max_value_len: usize,
}

impl MemorySecureStore {
    /// Creates an empty store accepting values up to [`CHUNK_SIZE`] characters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_value_len(CHUNK_SIZE)
    }

    /// Creates an empty store with a custom per-value cap, in characters.
    #[must_use]
    pub fn with_max_value_len(max_value_len: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            corrupted: RwLock::new(HashSet::new()),
            failing_writes: RwLock::new(HashSet::new()),
            max_value_len,
        }
    }

    /// Returns the number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no items are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Makes reads of `key` fail as if its ciphertext could not be decrypted,
    /// until the key is deleted.
    pub fn corrupt(&self, key: &str) {
        self.corrupted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
    }

    /// Makes every write to `key` fail.
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_writes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
    }
}

impl Default for MemorySecureStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Backend("lock poisoned".to_string())
}

impl SecureKeyValueStore for MemorySecureStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        if self.corrupted.read().map_err(poisoned)?.contains(key) {
            return Err(StorageError::Backend(format!(
                "decryption failed for {key}"
            )));
        }
        Ok(self.items.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.failing_writes.read().map_err(poisoned)?.contains(key) {
            return Err(StorageError::Backend(format!("write to {key} failed")));
        }
        let len = value.chars().count();
        if len > self.max_value_len {
            return Err(StorageError::ValueTooLarge {
                key: key.to_string(),
                len,
                max: self.max_value_len,
            });
        }
        self.corrupted.write().map_err(poisoned)?.remove(key);
        self.items
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_item(&self, key: &str) -> StorageResult<()> {
        let was_corrupted = self.corrupted.write().map_err(poisoned)?.remove(key);
        let removed = self.items.write().map_err(poisoned)?.remove(key);
        if removed.is_none() && !was_corrupted {
            return Err(StorageError::Backend(format!("item not found: {key}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic() {
        let store = MemorySecureStore::new();

        assert!(store.is_empty());
        assert!(store.get_item("a").expect("get").is_none());

        store.set_item("a", "hello").expect("set");
        assert_eq!(store.get_item("a").expect("get"), Some("hello".to_string()));

        store.set_item("a", "world").expect("set");
        assert_eq!(store.get_item("a").expect("get"), Some("world".to_string()));

        store.delete_item("a").expect("delete");
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_delete_missing_fails() {
        let store = MemorySecureStore::new();
        assert!(matches!(
            store.delete_item("missing"),
            Err(StorageError::Backend(_))
        ));
    }

    #[test]
    fn test_memory_store_enforces_cap() {
        let store = MemorySecureStore::with_max_value_len(4);
        store.set_item("a", "abcd").expect("set");
        match store.set_item("a", "abcde") {
            Err(StorageError::ValueTooLarge { len, max, .. }) => {
                assert_eq!(len, 5);
                assert_eq!(max, 4);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_memory_store_corruption_cleared_by_write() {
        let store = MemorySecureStore::new();
        store.set_item("a", "one").expect("set");
        store.corrupt("a");
        assert!(store.get_item("a").is_err());

        store.set_item("a", "two").expect("set");
        assert_eq!(store.get_item("a").expect("get"), Some("two".to_string()));
    }

    #[test]
    fn test_memory_store_keys_sorted() {
        let store = MemorySecureStore::new();
        store.set_item("b", "2").expect("set");
        store.set_item("a", "1").expect("set");
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
    }
}
