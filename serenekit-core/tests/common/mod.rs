//! Common test utilities shared across integration tests.

use serenekit_core::{LoginMessage, LoginMessagePipe, PipeConfig};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn new_pipe() -> LoginMessagePipe {
    init_logging();
    LoginMessagePipe::new(PipeConfig::default())
}

pub fn success(id_token: &str) -> LoginMessage {
    LoginMessage::Success {
        id_token: id_token.to_string(),
        refresh_token: Some(format!("{id_token}-refresh")),
        onboard: false,
    }
}
