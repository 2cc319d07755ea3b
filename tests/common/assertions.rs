//! Event helpers for integration tests

use closet_catalog::CatalogEvent;
use std::time::Duration;
use tokio::sync::broadcast;

/// Collect events until one satisfies `done` (inclusive) or `timeout` elapses
///
/// Subscribe before triggering the load so no event is missed.
///
/// # Returns
/// The collected events, or `None` on timeout or a closed channel
pub async fn collect_events_until<F>(
    events: &mut broadcast::Receiver<CatalogEvent>,
    timeout: Duration,
    mut done: F,
) -> Option<Vec<CatalogEvent>>
where
    F: FnMut(&CatalogEvent) -> bool,
{
    tokio::time::timeout(timeout, async {
        let mut seen = Vec::new();
        loop {
            match events.recv().await {
                Ok(event) => {
                    let finished = done(&event);
                    seen.push(event);
                    if finished {
                        return Some(seen);
                    }
                }
                Err(_) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}

/// Whether the event ends a session
pub fn is_terminal(event: &CatalogEvent) -> bool {
    matches!(
        event,
        CatalogEvent::Settled { .. }
            | CatalogEvent::LoadFailed { .. }
            | CatalogEvent::StreamInterrupted { .. }
    )
}
