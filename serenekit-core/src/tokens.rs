//! Persistence of the signed-in user's tokens.
//!
//! Id tokens routinely exceed the per-key limit of platform secure stores, so
//! the token pair is serialized to JSON and stored paginated.

use serde::{Deserialize, Serialize};
use serenekit_secure_store::{
    PaginatedSecureStore, SecureKeyValueStore, StorageError, StorageResult,
};

use crate::login::LoginMessage;

/// Base key the token pair is stored under.
pub const AUTH_TOKENS_KEY: &str = "auth-tokens";

/// Tokens of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct AuthTokens {
    /// Short-lived bearer token.
    pub id_token: String,
    /// Single-use token for refreshing the id token, if issued.
    pub refresh_token: Option<String>,
}

impl AuthTokens {
    /// Extracts the tokens from a successful login.
    #[must_use]
    pub fn from_login(message: &LoginMessage) -> Option<Self> {
        match message {
            LoginMessage::Success {
                id_token,
                refresh_token,
                ..
            } => Some(Self {
                id_token: id_token.clone(),
                refresh_token: refresh_token.clone(),
            }),
            _ => None,
        }
    }
}

/// Reads and writes [`AuthTokens`] in a secure store.
pub struct AuthTokenStore<S: SecureKeyValueStore> {
    store: PaginatedSecureStore<S>,
}

impl<S: SecureKeyValueStore> AuthTokenStore<S> {
    /// Wraps a platform secure store.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self {
            store: PaginatedSecureStore::new(backend),
        }
    }

    /// Stores `tokens`, or clears the stored tokens when signing out.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens cannot be serialized or the secure store
    /// rejects a write.
    pub fn set(&self, tokens: Option<&AuthTokens>) -> StorageResult<()> {
        let Some(tokens) = tokens else {
            return self.store.delete(AUTH_TOKENS_KEY);
        };
        let json = serde_json::to_string(tokens)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.store(AUTH_TOKENS_KEY, &json)
    }

    /// Loads the stored tokens. Missing, corrupted or unparsable data reads as
    /// signed out.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store's key lock is poisoned.
    pub fn get(&self) -> StorageResult<Option<AuthTokens>> {
        let Some(json) = self.store.retrieve(AUTH_TOKENS_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(err) => {
                log::warn!("discarding unparsable stored tokens: {err}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenekit_secure_store::{MemorySecureStore, CHUNK_SIZE};

    fn long_tokens() -> AuthTokens {
        AuthTokens {
            id_token: "e".repeat(CHUNK_SIZE * 2 + 100),
            refresh_token: Some("r".repeat(900)),
        }
    }

    #[test]
    fn test_set_get_clear() {
        let store = AuthTokenStore::new(MemorySecureStore::new());
        assert_eq!(store.get().expect("get"), None);

        let tokens = long_tokens();
        store.set(Some(&tokens)).expect("set");
        assert_eq!(store.get().expect("get"), Some(tokens));

        store.set(None).expect("clear");
        assert_eq!(store.get().expect("get"), None);
        assert!(store.store.backend().is_empty());
    }

    #[test]
    fn test_from_login() {
        let message = LoginMessage::Success {
            id_token: "id".to_string(),
            refresh_token: None,
            onboard: true,
        };
        assert_eq!(
            AuthTokens::from_login(&message),
            Some(AuthTokens {
                id_token: "id".to_string(),
                refresh_token: None,
            })
        );
        assert_eq!(AuthTokens::from_login(&LoginMessage::Dismiss), None);
    }

    #[test]
    fn test_garbage_reads_as_signed_out() {
        let store = AuthTokenStore::new(MemorySecureStore::new());
        store.store.store(AUTH_TOKENS_KEY, "not json").expect("store");
        assert_eq!(store.get().expect("get"), None);
    }
}
