//! Paginated storage of long values over a size-limited secure store.
//!
//! A value stored under base key `B` occupies:
//! - `B-length`: number of characters in the value, in decimal. This tells
//!   readers when to stop, in particular when the value is an exact multiple
//!   of the chunk size.
//! - `B-sha512`: SHA-512 of the value, standard base64 with padding and no
//!   trailing newline. Used to detect corruption.
//! - `B-{n}`: the `n`th chunk, 0-indexed, each [`CHUNK_SIZE`] characters
//!   except possibly the last.
//!
//! The length and digest entries are the existence markers: without a length
//! there is no value.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};

use super::error::{StorageError, StorageResult};
use super::traits::SecureKeyValueStore;

/// Maximum number of characters written to a single backend key.
pub const CHUNK_SIZE: usize = 2048;

fn length_key(base_key: &str) -> String {
    format!("{base_key}-length")
}

fn digest_key(base_key: &str) -> String {
    format!("{base_key}-sha512")
}

fn chunk_key(base_key: &str, index: usize) -> String {
    format!("{base_key}-{index}")
}

/// Computes the digest stored alongside a value.
#[must_use]
pub fn value_digest(data: &str) -> String {
    STANDARD.encode(Sha512::digest(data.as_bytes()))
}

/// Splits `data` into chunks of at most [`CHUNK_SIZE`] characters, never
/// breaking a code point.
fn split_chunks(data: &str) -> Vec<&str> {
    let mut chunks = Vec::with_capacity(data.len().div_ceil(CHUNK_SIZE));
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in data.char_indices() {
        if count == CHUNK_SIZE {
            chunks.push(&data[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < data.len() {
        chunks.push(&data[start..]);
    }
    chunks
}

/// Stores `data` under `base_key`, spread across as many backend keys as needed.
///
/// Unless `suppress_delete` is set, any existing value under `base_key` is
/// deleted first. Suppressing the delete leaks chunks when the previous value
/// was longer than the new one.
///
/// # Errors
///
/// Returns [`StorageError::EmptyValue`] if `data` is empty, or the first
/// backend error raised while writing. A failed store may leave a partial
/// value behind, which [`retrieve_secure_paginated`] rejects.
pub fn store_secure_paginated(
    store: &dyn SecureKeyValueStore,
    base_key: &str,
    data: &str,
    suppress_delete: bool,
) -> StorageResult<()> {
    if data.is_empty() {
        return Err(StorageError::EmptyValue);
    }

    if !suppress_delete {
        delete_secure_paginated(store, base_key);
    }

    let digest = value_digest(data);
    let length = data.chars().count();

    store.set_item(&length_key(base_key), &length.to_string())?;
    store.set_item(&digest_key(base_key), &digest)?;
    for (index, chunk) in split_chunks(data).into_iter().enumerate() {
        store.set_item(&chunk_key(base_key, index), chunk)?;
    }

    log::debug!("stored {base_key} as {} chunks", length.div_ceil(CHUNK_SIZE));
    Ok(())
}

/// Reads an item, treating backend errors as absence.
fn get_or_absent(store: &dyn SecureKeyValueStore, key: &str) -> Option<String> {
    match store.get_item(key) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("treating unreadable secure item {key} as absent: {err}");
            None
        }
    }
}

/// Retrieves a value written by [`store_secure_paginated`].
///
/// Returns `None` if the value is absent, any part of it is missing, or it
/// fails the length or digest check. A corrupted value is reported, not
/// cleared, so this never races a concurrent writer.
#[must_use]
pub fn retrieve_secure_paginated(
    store: &dyn SecureKeyValueStore,
    base_key: &str,
) -> Option<String> {
    let expected_length = get_or_absent(store, &length_key(base_key))?;
    let expected_length = match expected_length.parse::<i64>() {
        Ok(len) if len > 0 => usize::try_from(len).ok()?,
        _ => return None,
    };
    let expected_parts = expected_length.div_ceil(CHUNK_SIZE);
    log::debug!("retrieving {base_key} from {expected_parts} parts");

    let expected_digest = get_or_absent(store, &digest_key(base_key))?;

    let mut retrieved = String::new();
    for index in 0..expected_parts {
        let Some(part) = get_or_absent(store, &chunk_key(base_key, index)) else {
            log::debug!("{base_key} is missing part {index}");
            return None;
        };
        retrieved.push_str(&part);
    }

    if retrieved.chars().count() != expected_length {
        log::debug!("{base_key} has the wrong length when joined");
        return None;
    }

    if value_digest(&retrieved) != expected_digest {
        log::debug!("{base_key} failed the digest check");
        return None;
    }

    Some(retrieved)
}

/// Deletes a value written by [`store_secure_paginated`]. Best-effort: all
/// backend errors are swallowed.
///
/// Chunks are scanned from index 0 until at least as many indices as the
/// recorded length implies were visited and an index turns up empty, so
/// leftovers of an interrupted longer write are removed too. An index whose
/// read fails is deleted as well, since it may hold a chunk under corrupted
/// encryption. A backend that reports every index as present keeps the scan
/// going.
pub fn delete_secure_paginated(store: &dyn SecureKeyValueStore, base_key: &str) {
    let length_key = length_key(base_key);
    let min_keys_to_check = match store.get_item(&length_key) {
        Ok(Some(raw)) => raw
            .parse::<usize>()
            .map_or(1, |len| len.div_ceil(CHUNK_SIZE).max(1)),
        Ok(None) => 1,
        Err(err) => {
            log::debug!("length of {base_key} unreadable, deleting until a gap: {err}");
            1
        }
    };

    for key in [length_key, digest_key(base_key)] {
        if let Err(err) = store.delete_item(&key) {
            log::trace!("ignoring delete failure for {key}: {err}");
        }
    }

    let mut index = 0;
    loop {
        let key = chunk_key(base_key, index);
        let present = match store.get_item(&key) {
            Ok(value) => value.is_some(),
            Err(_) => true,
        };
        if present {
            if let Err(err) = store.delete_item(&key) {
                log::trace!("ignoring delete failure for {key}: {err}");
            }
        }
        index += 1;
        if index >= min_keys_to_check && !present {
            break;
        }
    }
}
