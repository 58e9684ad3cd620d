//! In-process handoff of a login result from the browser auth session to the
//! login screen.
//!
//! The screen that starts an OAuth round trip may be torn down and remounted
//! while the browser is open (e.g. the app was backgrounded). The session
//! callback then cannot hand the result to the screen directly. Instead it
//! writes it into this pipe, and the remounted screen reads it back.
//!
//! There is at most one pipe at a time, with a single writer and any number of
//! readers. Every reader registered when a message is written receives it, and
//! the writer cannot overwrite a message until all current readers consumed it.
//!
//! All state lives in one slot that is only ever replaced wholesale through a
//! compare-and-swap; a lost race re-reads the slot and retries. Waiting is
//! done by polling the slot once per UI frame.
//!
//! ```no_run
//! # use serenekit_core::{LoginMessage, LoginMessagePipe};
//! # async fn demo() -> Result<(), serenekit_core::PipeError> {
//! let pipe = LoginMessagePipe::global();
//! let writer = pipe.create_write_pipe()?;
//!
//! if let Some(reader) = pipe.create_read_pipe_if_available() {
//!     let read = reader.read();
//!     writer.send(LoginMessage::Dismiss).wait().await?;
//!     assert_eq!(read.wait().await?, LoginMessage::Dismiss);
//! }
//! # Ok(())
//! # }
//! ```

mod reader;
mod slot;
mod writer;

use std::sync::{Arc, OnceLock};

use uuid::Uuid;

pub use reader::ReadableLoginMessagePipe;
pub use writer::WritableLoginMessagePipe;

use crate::config::PipeConfig;
use crate::error::{PipeError, PipeResult};
use slot::{PipeSlot, StoredPipe};

/// Owner of the pipe slot. Use [`LoginMessagePipe::global`] in the app so the
/// auth session and the login screen meet at the same slot.
#[derive(Debug)]
pub struct LoginMessagePipe {
    slot: Arc<PipeSlot>,
    config: PipeConfig,
}

static GLOBAL_PIPE: OnceLock<LoginMessagePipe> = OnceLock::new();

impl LoginMessagePipe {
    /// Creates an independent pipe slot.
    #[must_use]
    pub fn new(config: PipeConfig) -> Self {
        Self {
            slot: Arc::new(PipeSlot::default()),
            config,
        }
    }

    /// The process-wide pipe, created with the default configuration on first use.
    pub fn global() -> &'static Self {
        GLOBAL_PIPE.get_or_init(|| Self::new(PipeConfig::default()))
    }

    /// The configuration this pipe was created with.
    #[must_use]
    pub const fn config(&self) -> &PipeConfig {
        &self.config
    }

    /// Whether a pipe currently exists.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Creates the writer for a new pipe.
    ///
    /// An existing pipe is assumed to belong to a writer and readers that died
    /// without cleaning up, and is destroyed. Readers still waiting on it fail
    /// with [`PipeError::PipeDestroyed`].
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::Takeover`] if the slot changed underneath the
    /// takeover, which means two writers are racing.
    pub fn create_write_pipe(&self) -> PipeResult<WritableLoginMessagePipe> {
        if let Some(existing) = self.slot.load() {
            log::warn!("login message pipe: destroying existing pipe {existing:?}");
            if !self.slot.compare_and_swap(Some(&existing), None) {
                log::error!("login message pipe: failed to destroy existing pipe");
                return Err(PipeError::Takeover(
                    "failed to destroy existing pipe".to_string(),
                ));
            }
        }

        let writer_id = Uuid::new_v4();
        if !self
            .slot
            .compare_and_swap(None, Some(StoredPipe::new(writer_id)))
        {
            log::error!("login message pipe: failed to create pipe");
            return Err(PipeError::Takeover("failed to create pipe".to_string()));
        }

        log::debug!("login message pipe: writer {writer_id} created");
        Ok(WritableLoginMessagePipe::new(
            Arc::clone(&self.slot),
            writer_id,
            self.config.poll_interval(),
            self.config.writer_close_delay(),
        ))
    }

    /// Joins the current pipe as a reader, or returns `None` if there is no
    /// pipe. No pipe is the normal case when no login was in flight.
    #[must_use]
    pub fn create_read_pipe_if_available(&self) -> Option<ReadableLoginMessagePipe> {
        let reader_id = Uuid::new_v4();
        loop {
            let item = self.slot.load()?;
            if self
                .slot
                .compare_and_swap(Some(&item), Some(item.with_reader(reader_id)))
            {
                log::debug!("login message pipe: reader {reader_id} joined");
                return Some(ReadableLoginMessagePipe::new(
                    Arc::clone(&self.slot),
                    reader_id,
                    item.writer_id,
                    self.config.poll_interval(),
                ));
            }
        }
    }
}

impl Default for LoginMessagePipe {
    fn default() -> Self {
        Self::new(PipeConfig::default())
    }
}
