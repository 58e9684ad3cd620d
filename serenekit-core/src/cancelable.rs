//! Operations that can be canceled independently of one another.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{PipeError, PipeResult};

#[derive(Debug, Default)]
struct CancelState {
    token: CancellationToken,
    finished: AtomicBool,
}

impl CancelState {
    fn cancel(&self) {
        if !self.finished.load(Ordering::Acquire) {
            self.token.cancel();
        }
    }
}

/// A running operation exposing `done`, `cancel` and its eventual result.
///
/// The work runs on the tokio runtime from the moment the operation is
/// created; awaiting [`CancelableOperation::wait`] only observes it. Dropping
/// an unfinished operation cancels it.
#[derive(Debug)]
pub struct CancelableOperation<T> {
    state: Arc<CancelState>,
    handle: Option<JoinHandle<PipeResult<T>>>,
}

impl<T: Send + 'static> CancelableOperation<T> {
    /// Spawns `work` onto the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub(crate) fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = PipeResult<T>> + Send + 'static,
    {
        let state = Arc::new(CancelState::default());
        let task_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                () = task_state.token.cancelled() => Err(PipeError::Canceled),
                result = work => result,
            };
            task_state.finished.store(true, Ordering::Release);
            result
        });
        Self {
            state,
            handle: Some(handle),
        }
    }
}

impl<T> CancelableOperation<T> {
    /// Whether the operation has settled or been canceled.
    #[must_use]
    pub fn done(&self) -> bool {
        self.state.finished.load(Ordering::Acquire) || self.state.token.is_cancelled()
    }

    /// Cancels the operation. An unfinished operation settles with
    /// [`PipeError::Canceled`]; a finished one is unaffected.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// Returns a handle that cancels this operation from elsewhere, e.g. while
    /// another task awaits [`CancelableOperation::wait`].
    #[must_use]
    pub fn canceler(&self) -> Canceler {
        Canceler {
            state: Arc::clone(&self.state),
        }
    }

    /// Lets the operation run to completion without anyone awaiting it.
    /// The returned handle can still cancel it.
    #[must_use]
    pub fn detach(mut self) -> Canceler {
        let canceler = self.canceler();
        self.handle = None;
        canceler
    }

    /// Waits for the operation to settle. Dropping the returned future before
    /// it completes cancels the operation.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::Canceled`] if canceled before finishing, the
    /// operation's own error if it failed, or [`PipeError::Task`] if the task
    /// driving it panicked.
    pub async fn wait(mut self) -> PipeResult<T> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(PipeError::Canceled);
        };
        let joined = handle.await;
        self.handle = None;
        match joined {
            Ok(result) => result,
            Err(err) => Err(PipeError::Task(err.to_string())),
        }
    }
}

/// Cancels a [`CancelableOperation`] without owning it.
#[derive(Debug, Clone)]
pub struct Canceler {
    state: Arc<CancelState>,
}

impl Canceler {
    /// Same as [`CancelableOperation::cancel`].
    pub fn cancel(&self) {
        self.state.cancel();
    }
}

impl<T> Drop for CancelableOperation<T> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completes() {
        let op = CancelableOperation::spawn(async { Ok(7) });
        assert_eq!(op.wait().await, Ok(7));
    }

    #[tokio::test]
    async fn test_propagates_error() {
        let op = CancelableOperation::<()>::spawn(async { Err(PipeError::ReaderRemoved) });
        assert_eq!(op.wait().await, Err(PipeError::ReaderRemoved));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending() {
        let op = CancelableOperation::spawn(async {
            std::future::pending::<()>().await;
            Ok(())
        });
        assert!(!op.done());
        op.cancel();
        assert!(op.done());
        assert_eq!(op.wait().await, Err(PipeError::Canceled));
    }

    #[tokio::test]
    async fn test_cancel_after_finish_is_noop() {
        let op = CancelableOperation::spawn(async { Ok("value") });
        while !op.done() {
            tokio::task::yield_now().await;
        }
        op.cancel();
        assert_eq!(op.wait().await, Ok("value"));
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let op = CancelableOperation::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
            Ok(())
        });
        drop(op);
        // the task drops its sender once canceled
        assert!(rx.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_wait_cancels() {
        let op = CancelableOperation::spawn(async {
            std::future::pending::<()>().await;
            Ok(())
        });
        let cancel_state = Arc::clone(&op.state);
        let waited = tokio::time::timeout(Duration::from_millis(50), op.wait()).await;
        assert!(waited.is_err());
        assert!(cancel_state.token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_canceler_from_another_task() {
        let op = CancelableOperation::spawn(async {
            std::future::pending::<()>().await;
            Ok(())
        });
        let canceler = op.canceler();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceler.cancel();
        });
        assert_eq!(op.wait().await, Err(PipeError::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_runs_to_completion() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let op = CancelableOperation::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            tx.send(()).map_err(|()| PipeError::Task("receiver gone".to_string()))
        });
        let _canceler = op.detach();
        assert_eq!(rx.await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_can_still_be_canceled() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let op = CancelableOperation::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
            Ok(())
        });
        op.detach().cancel();
        assert!(rx.await.is_err());
    }
}
