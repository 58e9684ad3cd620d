//! Timing configuration for the login handoff.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs for the login message pipe and the handoff around it.
///
/// Missing fields fall back to the defaults when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// How often waiting operations re-check the pipe. One UI frame by default.
    pub poll_interval_ms: u64,
    /// How long a remounted login screen waits for a pending message.
    pub read_timeout_ms: u64,
    /// How long a writer stays open after the browser session returns.
    pub writer_close_delay_ms: u64,
}

impl PipeConfig {
    /// Poll cadence as a [`Duration`], at least one millisecond.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        if self.poll_interval_ms == 0 {
            Duration::from_millis(1)
        } else {
            Duration::from_millis(self.poll_interval_ms)
        }
    }

    /// Read timeout as a [`Duration`].
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Writer close delay as a [`Duration`].
    #[must_use]
    pub const fn writer_close_delay(&self) -> Duration {
        Duration::from_millis(self.writer_close_delay_ms)
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 16,
            read_timeout_ms: 3000,
            writer_close_delay_ms: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipeConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(16));
        assert_eq!(config.read_timeout(), Duration::from_secs(3));
        assert_eq!(config.writer_close_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipeConfig =
            serde_json::from_str(r#"{"read_timeout_ms": 500}"#).expect("parse");
        assert_eq!(config.read_timeout_ms, 500);
        assert_eq!(config.poll_interval_ms, 16);
        assert_eq!(config.writer_close_delay_ms, 3000);
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = PipeConfig {
            poll_interval_ms: 0,
            ..PipeConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
