//! Both ends of the login handoff, as used by the login screen.

use crate::cancelable::{CancelableOperation, Canceler};
use crate::error::PipeError;
use crate::login::LoginMessage;
use crate::pipe::{LoginMessagePipe, WritableLoginMessagePipe};

/// Delivers the result of a browser auth session.
///
/// While the login screen that started the session is still mounted the
/// message goes straight to `apply` and `None` is returned. Otherwise it is
/// sent through the pipe in the background for a remounted screen to pick up.
/// The send runs until every reader consumed the previous message or the
/// writer loses the pipe; the returned [`Canceler`] may be dropped.
pub fn dispatch_login_result<F>(
    writer: &WritableLoginMessagePipe,
    consumer_mounted: bool,
    message: LoginMessage,
    apply: F,
) -> Option<Canceler>
where
    F: FnOnce(LoginMessage),
{
    if consumer_mounted {
        apply(message);
        return None;
    }

    let send = writer.send(message);
    let delivery = CancelableOperation::spawn(async move {
        let result = send.wait().await;
        match &result {
            Ok(()) | Err(PipeError::Canceled) => {}
            Err(err) => log::warn!("login result not delivered: {err}"),
        }
        result
    });
    Some(delivery.detach())
}

/// Picks up a login result left by an auth session that outlived the screen
/// which started it.
///
/// Returns `None` when no login was in flight, when nothing arrives within the
/// pipe's `read_timeout_ms` (the writer is assumed dead), or when the pipe
/// failed. The reader is always closed before returning.
pub async fn receive_pending_login(pipe: &LoginMessagePipe) -> Option<LoginMessage> {
    let reader = pipe.create_read_pipe_if_available()?;
    let timeout = pipe.config().read_timeout();

    let result = tokio::time::timeout(timeout, reader.read().wait()).await;
    reader.close();

    match result {
        Ok(Ok(message)) => Some(message),
        Ok(Err(PipeError::Canceled)) => None,
        Ok(Err(err)) => {
            log::info!("login message pipe unusable: {err}");
            None
        }
        Err(_) => {
            log::info!("no login message within {}ms", timeout.as_millis());
            None
        }
    }
}
