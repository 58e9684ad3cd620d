//! Login outcomes handed from the browser auth session to the login screen.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// The outcome of a login attempt, as delivered through the login message pipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum LoginMessage {
    /// The user decided not to log in on the provider's page.
    Cancel,
    /// The browser was dismissed, returning to the app.
    Dismiss,
    /// The auth session ended in a way we don't recognize.
    Unknown {
        /// The session result kind as reported by the platform.
        raw_type: String,
    },
    /// The authorization server rejected the provider's token.
    Error {
        /// Human-readable reason; may be empty.
        message: String,
    },
    /// The user logged in and we received tokens.
    Success {
        /// Short-lived bearer token for API requests.
        id_token: String,
        /// Long-lived, single-use token for obtaining a new id token, if issued.
        refresh_token: Option<String>,
        /// Whether the account was just created.
        onboard: bool,
    },
}

/// How an external browser auth session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum AuthSessionOutcome {
    /// The user canceled on the provider's page.
    Cancel,
    /// The browser was dismissed.
    Dismiss,
    /// The session redirected back to the app.
    Success {
        /// Full redirect URL, tokens in the fragment.
        url: String,
    },
    /// Any other platform-reported result kind.
    Other {
        /// The result kind as reported by the platform.
        raw_type: String,
    },
}

impl LoginMessage {
    /// Converts a finished browser auth session into the message to deliver.
    ///
    /// On success the redirect URL's fragment is read as form-encoded
    /// parameters: `auth_error=1` with `auth_error_message` reports a
    /// failure, otherwise `id_token` is required and `refresh_token` and
    /// `onboard=1` are optional.
    #[must_use]
    pub fn from_auth_session(outcome: AuthSessionOutcome) -> Self {
        let url = match outcome {
            AuthSessionOutcome::Cancel => return Self::Cancel,
            AuthSessionOutcome::Dismiss => return Self::Dismiss,
            AuthSessionOutcome::Other { raw_type } => return Self::Unknown { raw_type },
            AuthSessionOutcome::Success { url } => url,
        };

        let fragment = url.find('#').map_or(url.as_str(), |idx| &url[idx + 1..]);
        let params = FragmentParams::parse(fragment);

        if params.get("auth_error").as_deref() == Some("1") {
            return Self::Error {
                message: params
                    .get("auth_error_message")
                    .map(Cow::into_owned)
                    .unwrap_or_default(),
            };
        }

        let id_token = match params.get("id_token") {
            Some(token) if !token.is_empty() => token.into_owned(),
            _ => {
                return Self::Error {
                    message: "no id token".to_string(),
                }
            }
        };

        Self::Success {
            id_token,
            refresh_token: params.get("refresh_token").map(Cow::into_owned),
            onboard: params.get("onboard").as_deref() == Some("1"),
        }
    }

    /// Whether this message carries tokens.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// `application/x-www-form-urlencoded` pairs; lookups return the first match.
struct FragmentParams<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> FragmentParams<'a> {
    fn parse(raw: &'a str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .collect();
        Self { pairs }
    }

    fn get(&self, name: &str) -> Option<Cow<'a, str>> {
        self.pairs
            .iter()
            .find(|(key, _)| decode_component(key) == name)
            .map(|&(_, value)| decode_component(value))
    }
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['+', '%']) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(spaced),
    }
}
