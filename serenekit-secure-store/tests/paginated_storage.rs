//! Paginated storage against the in-memory secure store.

use serenekit_secure_store::{
    delete_secure_paginated, retrieve_secure_paginated, store_secure_paginated,
    MemorySecureStore, SecureKeyValueStore, StorageError, CHUNK_SIZE,
};
use test_case::test_case;
use uuid::Uuid;

fn base_key() -> String {
    format!("auth-{}", Uuid::new_v4())
}

fn sample(len: usize) -> String {
    "abcdefghijklmnopqrstuvwxyz0123456789"
        .chars()
        .cycle()
        .take(len)
        .collect()
}

#[test_case(1 ; "single character")]
#[test_case(CHUNK_SIZE - 1 ; "just under one chunk")]
#[test_case(CHUNK_SIZE ; "exactly one chunk")]
#[test_case(CHUNK_SIZE * 2 ; "exact multiple of the chunk size")]
#[test_case(CHUNK_SIZE * 2 + 1 ; "one past a multiple")]
#[test_case(100_001 ; "over one hundred thousand")]
fn test_round_trip(len: usize) {
    let store = MemorySecureStore::new();
    let key = base_key();
    let data = sample(len);

    store_secure_paginated(&store, &key, &data, false).expect("store");
    assert_eq!(retrieve_secure_paginated(&store, &key), Some(data));
}

#[test]
fn test_round_trip_multibyte() {
    let store = MemorySecureStore::new();
    let key = base_key();
    let data = "🌿 breathe in, breathe out ".repeat(400);

    store_secure_paginated(&store, &key, &data, false).expect("store");
    assert_eq!(retrieve_secure_paginated(&store, &key), Some(data));
}

#[test]
fn test_tampered_chunk_is_rejected() {
    let store = MemorySecureStore::new();
    let key = base_key();
    let data = sample(CHUNK_SIZE * 3);
    store_secure_paginated(&store, &key, &data, false).expect("store");

    let mut chunk = store
        .get_item(&format!("{key}-1"))
        .expect("get")
        .expect("present");
    chunk.replace_range(0..1, "#");
    store.set_item(&format!("{key}-1"), &chunk).expect("set");

    assert_eq!(retrieve_secure_paginated(&store, &key), None);
}

#[test]
fn test_truncated_chunk_is_rejected() {
    let store = MemorySecureStore::new();
    let key = base_key();
    store_secure_paginated(&store, &key, &sample(CHUNK_SIZE + 5), false).expect("store");
    store.set_item(&format!("{key}-1"), "abcd").expect("set");

    assert_eq!(retrieve_secure_paginated(&store, &key), None);
}

#[test]
fn test_delete_never_stored_is_noop() {
    let store = MemorySecureStore::new();
    let key = base_key();
    delete_secure_paginated(&store, &key);
    delete_secure_paginated(&store, &key);
    assert!(store.is_empty());
}

#[test]
fn test_delete_twice_leaves_nothing() {
    let store = MemorySecureStore::new();
    let key = base_key();
    store_secure_paginated(&store, &key, &sample(CHUNK_SIZE * 4 + 3), false).expect("store");

    delete_secure_paginated(&store, &key);
    assert!(store.is_empty());
    delete_secure_paginated(&store, &key);
    assert!(store.is_empty());
    assert_eq!(retrieve_secure_paginated(&store, &key), None);
}

#[test]
fn test_delete_leaves_other_base_keys_alone() {
    let store = MemorySecureStore::new();
    store_secure_paginated(&store, "refresh", "r", false).expect("store");
    store_secure_paginated(&store, "identity", "i", false).expect("store");

    delete_secure_paginated(&store, "refresh");
    assert_eq!(
        store.keys(),
        vec![
            "identity-0".to_string(),
            "identity-length".to_string(),
            "identity-sha512".to_string(),
        ]
    );
}

#[test]
fn test_overwrite_with_shorter_value() {
    let store = MemorySecureStore::new();
    let key = base_key();
    let long = sample(CHUNK_SIZE * 5 + 17);
    let short = sample(10);

    store_secure_paginated(&store, &key, &long, false).expect("store");
    store_secure_paginated(&store, &key, &short, false).expect("store");

    assert_eq!(retrieve_secure_paginated(&store, &key), Some(short));
    assert_eq!(store.len(), 3);
}

#[test]
fn test_empty_value_rejected() {
    let store = MemorySecureStore::new();
    let key = base_key();
    store_secure_paginated(&store, &key, "kept", false).expect("store");

    assert_eq!(
        store_secure_paginated(&store, &key, "", false),
        Err(StorageError::EmptyValue)
    );
    assert_eq!(retrieve_secure_paginated(&store, &key).as_deref(), Some("kept"));
}

#[test]
fn test_huge_recorded_length_reads_as_absent() {
    let store = MemorySecureStore::new();
    let key = base_key();
    store_secure_paginated(&store, &key, "abc", false).expect("store");
    store
        .set_item(&format!("{key}-length"), "9223372036854775807")
        .expect("set");

    assert_eq!(retrieve_secure_paginated(&store, &key), None);
}
