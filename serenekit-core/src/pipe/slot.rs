//! The shared pipe slot and its compare-and-swap primitive.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use crate::error::PipeResult;
use crate::login::LoginMessage;

/// A registered reader and the counter of the last message it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredPipeReader {
    pub(crate) id: Uuid,
    pub(crate) last_read: Option<u64>,
}

/// The most recently written message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PipeMessage {
    pub(crate) value: LoginMessage,
    pub(crate) ctr: u64,
}

/// Snapshot of the pipe. Never mutated in place; updates build a new value
/// and swap it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredPipe {
    /// `None` once the writer closed while readers remained.
    pub(crate) writer_id: Option<Uuid>,
    pub(crate) readers: Vec<StoredPipeReader>,
    pub(crate) message: Option<PipeMessage>,
}

impl StoredPipe {
    pub(crate) const fn new(writer_id: Uuid) -> Self {
        Self {
            writer_id: Some(writer_id),
            readers: Vec::new(),
            message: None,
        }
    }

    pub(crate) fn reader(&self, reader_id: Uuid) -> Option<&StoredPipeReader> {
        self.readers.iter().find(|reader| reader.id == reader_id)
    }

    /// Whether every current reader has consumed the pending message.
    pub(crate) fn message_consumed(&self) -> bool {
        self.message.as_ref().is_none_or(|message| {
            self.readers
                .iter()
                .all(|reader| reader.last_read == Some(message.ctr))
        })
    }

    pub(crate) fn with_message(&self, value: LoginMessage) -> Self {
        let ctr = self.message.as_ref().map_or(0, |message| message.ctr) + 1;
        Self {
            message: Some(PipeMessage { value, ctr }),
            ..self.clone()
        }
    }

    pub(crate) fn with_reader(&self, reader_id: Uuid) -> Self {
        let mut readers = self.readers.clone();
        readers.push(StoredPipeReader {
            id: reader_id,
            last_read: None,
        });
        Self {
            readers,
            ..self.clone()
        }
    }

    pub(crate) fn without_reader(&self, reader_id: Uuid) -> Self {
        Self {
            readers: self
                .readers
                .iter()
                .filter(|reader| reader.id != reader_id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub(crate) fn with_last_read(&self, reader_id: Uuid, ctr: u64) -> Self {
        Self {
            readers: self
                .readers
                .iter()
                .map(|reader| {
                    if reader.id == reader_id {
                        StoredPipeReader {
                            id: reader.id,
                            last_read: Some(ctr),
                        }
                    } else {
                        reader.clone()
                    }
                })
                .collect(),
            ..self.clone()
        }
    }

    pub(crate) fn without_writer(&self) -> Self {
        Self {
            writer_id: None,
            ..self.clone()
        }
    }
}

/// The single slot holding the current pipe, if any.
///
/// All mutation goes through [`PipeSlot::compare_and_swap`], which compares by
/// identity: a caller can only replace the exact snapshot it read.
#[derive(Debug, Default)]
pub(crate) struct PipeSlot {
    current: Mutex<Option<Arc<StoredPipe>>>,
}

impl PipeSlot {
    pub(crate) fn load(&self) -> Option<Arc<StoredPipe>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the slot with `value` if it still holds `expected`.
    pub(crate) fn compare_and_swap(
        &self,
        expected: Option<&Arc<StoredPipe>>,
        value: Option<StoredPipe>,
    ) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let unchanged = match (current.as_ref(), expected) {
            (None, None) => true,
            (Some(current), Some(expected)) => Arc::ptr_eq(current, expected),
            _ => false,
        };
        if unchanged {
            *current = value.map(Arc::new);
        }
        unchanged
    }
}

/// Waits until the slot satisfies `predicate`, then returns the snapshot that
/// satisfied it.
///
/// The predicate runs immediately and then once per `poll_interval`. It may
/// return an error to abort the wait. Never finishes if the predicate is never
/// satisfied; callers race it against cancellation or a timeout. Dropping the
/// future stops the wait.
pub(crate) async fn wait_for_pipe_condition<P>(
    slot: &PipeSlot,
    poll_interval: Duration,
    mut predicate: P,
) -> PipeResult<Option<Arc<StoredPipe>>>
where
    P: FnMut(Option<&StoredPipe>) -> PipeResult<bool>,
{
    loop {
        let item = slot.load();
        if predicate(item.as_deref())? {
            return Ok(item);
        }
        tokio::time::sleep(poll_interval).await;
    }
}
