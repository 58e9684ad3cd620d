use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::slot::{wait_for_pipe_condition, PipeSlot};
use crate::cancelable::CancelableOperation;
use crate::error::PipeError;
use crate::login::LoginMessage;

/// The sending end of the login message pipe.
///
/// Dropping the writer closes it.
#[derive(Debug)]
pub struct WritableLoginMessagePipe {
    slot: Arc<PipeSlot>,
    writer_id: Uuid,
    poll_interval: Duration,
    close_delay: Duration,
}

impl WritableLoginMessagePipe {
    pub(super) const fn new(
        slot: Arc<PipeSlot>,
        writer_id: Uuid,
        poll_interval: Duration,
        close_delay: Duration,
    ) -> Self {
        Self {
            slot,
            writer_id,
            poll_interval,
            close_delay,
        }
    }

    /// Sends a message to every reader.
    ///
    /// Waits until all currently registered readers consumed the previous
    /// message, so an unread message is never overwritten. A slow reader
    /// therefore stalls the send; race it against a timeout. Fails with
    /// [`PipeError::PipeDestroyed`] if this writer loses the pipe while
    /// waiting.
    #[must_use = "dropping the operation cancels the send"]
    pub fn send(&self, message: LoginMessage) -> CancelableOperation<()> {
        let slot = Arc::clone(&self.slot);
        let writer_id = self.writer_id;
        let poll_interval = self.poll_interval;

        CancelableOperation::spawn(async move {
            loop {
                let item = wait_for_pipe_condition(&slot, poll_interval, |pipe| match pipe {
                    Some(pipe) if pipe.writer_id == Some(writer_id) => Ok(pipe.message_consumed()),
                    _ => Err(PipeError::PipeDestroyed),
                })
                .await?;
                let Some(item) = item else {
                    return Err(PipeError::PipeDestroyed);
                };

                let next = item.with_message(message.clone());
                if slot.compare_and_swap(Some(&item), Some(next)) {
                    log::debug!("login message pipe: writer {writer_id} sent a message");
                    return Ok(());
                }
            }
        })
    }

    /// Closes the writer.
    ///
    /// With no readers left the pipe is torn down; otherwise it is kept, minus
    /// the writer, so stragglers can still consume the last message. Does
    /// nothing if another writer has since taken over.
    pub fn close(&self) {
        loop {
            let Some(item) = self.slot.load() else {
                return;
            };
            if item.writer_id != Some(self.writer_id) {
                return;
            }
            let next = if item.readers.is_empty() {
                None
            } else {
                Some(item.without_writer())
            };
            if self.slot.compare_and_swap(Some(&item), next) {
                log::debug!(
                    "login message pipe: writer {} closed, {} readers remain",
                    self.writer_id,
                    item.readers.len()
                );
                return;
            }
        }
    }

    /// Closes the writer after `delay`, giving readers that are still
    /// starting up a chance to pick up the last message.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn close_after(self, delay: Duration) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            drop(self);
        });
    }

    /// [`WritableLoginMessagePipe::close_after`] with the pipe's configured
    /// `writer_close_delay_ms`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn close_after_delay(self) {
        let delay = self.close_delay;
        self.close_after(delay);
    }
}

impl Drop for WritableLoginMessagePipe {
    fn drop(&mut self) {
        self.close();
    }
}
