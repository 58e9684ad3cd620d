#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Login handoff and secure persistence primitives for the SereneKit client.
//!
//! - [`LoginMessagePipe`] hands the result of an OAuth browser session to a
//!   login screen that may have been remounted while the browser was open.
//! - [`AuthTokenStore`] keeps the resulting tokens in the platform secure
//!   store, paginated through [`serenekit_secure_store`].

mod cancelable;
pub use cancelable::{CancelableOperation, Canceler};

mod config;
pub use config::PipeConfig;

mod error;
pub use error::*;

mod handoff;
pub use handoff::{dispatch_login_result, receive_pending_login};

mod login;
pub use login::{AuthSessionOutcome, LoginMessage};

pub mod logger;

pub mod pipe;
pub use pipe::{LoginMessagePipe, ReadableLoginMessagePipe, WritableLoginMessagePipe};

mod tokens;
pub use tokens::{AuthTokenStore, AuthTokens, AUTH_TOKENS_KEY};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("serenekit_core");
