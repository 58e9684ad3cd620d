use thiserror::Error;

/// Result type for login message pipe operations.
pub type PipeResult<T> = Result<T, PipeError>;

/// Error outputs from the login message pipe
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum PipeError {
    /// The operation was canceled by its caller
    #[error("canceled")]
    Canceled,
    /// The pipe was torn down or taken over by another writer
    #[error("pipe was destroyed")]
    PipeDestroyed,
    /// The reader is no longer registered with the pipe
    #[error("reader was removed from pipe")]
    ReaderRemoved,
    /// A new writer could not replace the existing pipe
    #[error("takeover_conflict: {0}")]
    Takeover(String),
    /// The task driving the operation panicked or was aborted
    #[error("task_failed: {0}")]
    Task(String),
}

impl PipeError {
    /// Whether this is a plain cancellation, the expected outcome of losing a
    /// race against a timeout.
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
