//! Deferred query trigger
//!
//! Keystrokes update the displayed text at once. A background task coalesces them and
//! publishes the latest text as the settled query once no new keystroke arrived for the
//! configured window. Whatever the number of intermediate keystrokes, the settled text
//! always converges to the last one pushed.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

enum Command {
    Push(String),
    Flush(oneshot::Sender<()>),
}

/// Debounced, cancellable query text
///
/// Must be created inside a tokio runtime. Dropping the debouncer stops its task.
pub struct QueryDebouncer {
    tx: mpsc::UnboundedSender<Command>,
    displayed: watch::Sender<String>,
    settled: watch::Receiver<String>,
    cancel: CancellationToken,
}

impl QueryDebouncer {
    /// Spawn the debounce task with a quiescence `window`
    pub fn new(window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (settled_tx, settled) = watch::channel(String::new());
        let cancel = CancellationToken::new();

        tokio::spawn(run(rx, settled_tx, window, cancel.clone()));

        Self {
            tx,
            displayed: watch::Sender::new(String::new()),
            settled,
            cancel,
        }
    }

    /// Record a keystroke; the displayed text changes immediately
    pub fn push(&self, text: impl Into<String>) {
        let text = text.into();
        self.displayed.send_replace(text.clone());
        if self.tx.send(Command::Push(text)).is_err() {
            debug!("Query debouncer stopped, keystroke not scheduled");
        }
    }

    /// Text as typed so far
    pub fn displayed(&self) -> String {
        self.displayed.borrow().clone()
    }

    /// Last text that survived the quiescence window
    pub fn settled(&self) -> String {
        self.settled.borrow().clone()
    }

    /// Receiver notified each time the settled text changes
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.settled.clone()
    }

    /// Publish any pending text now and return the settled text
    pub async fn flush(&self) -> String {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).is_ok() {
            // An error only means the task stopped; the settled value is still readable
            let _ = done.await;
        }
        self.settled()
    }

    /// Stop the task; pending text is discarded
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the task has been stopped
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for QueryDebouncer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Command>,
    settled: watch::Sender<String>,
    window: Duration,
    cancel: CancellationToken,
) {
    let mut pending: Option<String> = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            command = rx.recv() => match command {
                // Each keystroke restarts the window
                Some(Command::Push(text)) => pending = Some(text),
                Some(Command::Flush(ack)) => {
                    if let Some(text) = pending.take() {
                        publish(&settled, text);
                    }
                    let _ = ack.send(());
                }
                None => break,
            },
            _ = sleep(window), if pending.is_some() => {
                if let Some(text) = pending.take() {
                    publish(&settled, text);
                }
            }
        }
    }

    debug!("Query debouncer stopped");
}

fn publish(settled: &watch::Sender<String>, text: String) {
    settled.send_if_modified(|current| {
        if *current == text {
            return false;
        }
        debug!(query = %text, "Query settled");
        *current = text;
        true
    });
}
