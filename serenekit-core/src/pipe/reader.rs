use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::slot::{wait_for_pipe_condition, PipeSlot, StoredPipe};
use crate::cancelable::CancelableOperation;
use crate::error::{PipeError, PipeResult};
use crate::login::LoginMessage;

/// The receiving end of the login message pipe.
///
/// Dropping the reader closes it.
#[derive(Debug)]
pub struct ReadableLoginMessagePipe {
    slot: Arc<PipeSlot>,
    reader_id: Uuid,
    /// The writer that owned the pipe when this reader joined.
    writer_id: Option<Uuid>,
    poll_interval: Duration,
}

/// Decides whether `pipe` has a message for this reader.
///
/// An unread message is still delivered after its writer closed; with nothing
/// left to read, a closed or replaced writer ends the wait.
fn has_unread_message(
    pipe: Option<&StoredPipe>,
    writer_id: Option<Uuid>,
    reader_id: Uuid,
) -> PipeResult<bool> {
    let Some(pipe) = pipe else {
        return Err(PipeError::PipeDestroyed);
    };
    if pipe.writer_id.is_some() && pipe.writer_id != writer_id {
        return Err(PipeError::PipeDestroyed);
    }
    let Some(reader) = pipe.reader(reader_id) else {
        return Err(PipeError::ReaderRemoved);
    };
    let unread = pipe
        .message
        .as_ref()
        .is_some_and(|message| reader.last_read != Some(message.ctr));
    if !unread && pipe.writer_id.is_none() {
        return Err(PipeError::PipeDestroyed);
    }
    Ok(unread)
}

impl ReadableLoginMessagePipe {
    pub(super) const fn new(
        slot: Arc<PipeSlot>,
        reader_id: Uuid,
        writer_id: Option<Uuid>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            slot,
            reader_id,
            writer_id,
            poll_interval,
        }
    }

    /// Receives the next message this reader has not seen yet.
    ///
    /// Race the returned operation against a timeout and cancel it if the
    /// writer seems to have died: a writer that vanished without closing
    /// leaves the read waiting forever.
    #[must_use = "dropping the operation cancels the read"]
    pub fn read(&self) -> CancelableOperation<LoginMessage> {
        let slot = Arc::clone(&self.slot);
        let reader_id = self.reader_id;
        let writer_id = self.writer_id;
        let poll_interval = self.poll_interval;

        CancelableOperation::spawn(async move {
            loop {
                let item = wait_for_pipe_condition(&slot, poll_interval, |pipe| {
                    has_unread_message(pipe, writer_id, reader_id)
                })
                .await?;
                let Some((item, message)) =
                    item.and_then(|item| item.message.clone().map(|message| (item, message)))
                else {
                    return Err(PipeError::PipeDestroyed);
                };

                let next = item.with_last_read(reader_id, message.ctr);
                if slot.compare_and_swap(Some(&item), Some(next)) {
                    log::debug!(
                        "login message pipe: reader {reader_id} consumed message {}",
                        message.ctr
                    );
                    return Ok(message.value);
                }
            }
        })
    }

    /// Leaves the pipe. Pending reads then fail with
    /// [`PipeError::ReaderRemoved`]. Does nothing if the pipe is gone.
    ///
    /// The last reader leaving a pipe whose writer already closed tears the
    /// pipe down.
    pub fn close(&self) {
        loop {
            let Some(item) = self.slot.load() else {
                return;
            };
            if item.writer_id.is_some() && item.writer_id != self.writer_id {
                return;
            }
            if item.reader(self.reader_id).is_none() {
                return;
            }
            let next = item.without_reader(self.reader_id);
            let next = if next.writer_id.is_none() && next.readers.is_empty() {
                None
            } else {
                Some(next)
            };
            if self.slot.compare_and_swap(Some(&item), next) {
                log::debug!("login message pipe: reader {} closed", self.reader_id);
                return;
            }
        }
    }
}

impl Drop for ReadableLoginMessagePipe {
    fn drop(&mut self) {
        self.close();
    }
}
