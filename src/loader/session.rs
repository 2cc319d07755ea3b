//! Load session bookkeeping

use crate::types::SessionId;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One fetch run, owning its own cancellation token
///
/// The loader holds at most one current session. Superseding it cancels the token and
/// drops the reference; nothing is reused across sessions.
pub(crate) struct LoadSession {
    /// Session identity, checked before every state mutation
    pub(crate) id: SessionId,
    /// Cancelled on supersession, shutdown, or when the last loader handle drops
    pub(crate) token: CancellationToken,
    /// Task driving the page loop
    pub(crate) task: Option<JoinHandle<()>>,
}

impl LoadSession {
    pub(crate) fn new(id: SessionId, token: CancellationToken) -> Self {
        Self {
            id,
            token,
            task: None,
        }
    }

    /// Cancel the session and hand back its task so the caller may await it
    pub(crate) fn cancel(mut self) -> Option<JoinHandle<()>> {
        self.token.cancel();
        self.task.take()
    }
}
