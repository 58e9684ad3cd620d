//! Secure storage of arbitrary-length values over size-limited platform stores.
//!
//! Platform secure stores (Keychain, Android Keystore backed preferences) cap
//! the size of each value. This crate spreads a value across a family of keys
//! with a length marker and a SHA-512 digest, so it can be reassembled and
//! checked for corruption on read.

pub mod error;
pub mod lock;
pub mod memory;
pub mod paginated;
pub mod store;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use lock::KeyLockManager;
pub use memory::MemorySecureStore;
pub use paginated::{
    delete_secure_paginated, retrieve_secure_paginated, store_secure_paginated,
    value_digest, CHUNK_SIZE,
};
pub use store::PaginatedSecureStore;
pub use traits::SecureKeyValueStore;
