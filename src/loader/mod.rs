//! Incremental catalog loading.
//!
//! [`CatalogLoader`] drives repeated page fetches for one load session at a time:
//! - the first page is revealed all at once (`FirstPageLoading` → `Streaming`/`Settled`)
//! - later pages are appended in cursor order while `loading_more` is set
//! - facet sets (sections, collections) grow by union in first-seen order
//! - a new session cancels the previous one; the stale session never touches state again
//!
//! Every mutation happens under the state write lock after checking that the session is
//! still current and its token is not cancelled. Supersession cancels the token under the
//! same lock, so a stale response can never land after a reset.

mod facets;
mod session;


pub use facets::{FacetSet, collections_of, sections_of};

use crate::config::{Config, RetryConfig};
use crate::error::{Error, Result};
use crate::fetcher::{AirtableSource, PageSource};
use crate::record::map_page;
use crate::retry::fetch_with_retry;
use crate::types::{CatalogEvent, CatalogSnapshot, LoadPhase, RawPage, SessionId};
use chrono::Utc;
use futures::Stream;
use session::LoadSession;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// State owned by the loader for the current session
#[derive(Default)]
struct LoaderState {
    snapshot: CatalogSnapshot,
    sections: FacetSet,
    collections: FacetSet,
    current: Option<LoadSession>,
}

impl LoaderState {
    fn publish_facets(&mut self) {
        self.snapshot.sections = self.sections.as_slice().to_vec();
        self.snapshot.collections = self.collections.as_slice().to_vec();
    }
}

struct LoaderInner {
    /// Page source (HTTP in production, scripted in tests)
    source: Arc<dyn PageSource>,
    /// Caller-side retry policy for each page
    retry: RetryConfig,
    /// Owned collection, facets and current session
    state: RwLock<LoaderState>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: broadcast::Sender<CatalogEvent>,
    /// Last issued session number
    last_session: AtomicU64,
    /// Parent of every session token; cancelled when the last handle drops
    root: CancellationToken,
}

/// Incremental loader handle (cloneable; the last clone dropped cancels any session)
#[derive(Clone)]
pub struct CatalogLoader {
    inner: Arc<LoaderInner>,
    _teardown: Arc<DropGuard>,
}

impl CatalogLoader {
    /// Create an idle loader for the configured remote source
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be built
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let source = AirtableSource::new(&config.source)?;
        Ok(Self::with_source(Arc::new(source), config.retry.clone()))
    }

    /// Create an idle loader over any page source
    pub fn with_source(source: Arc<dyn PageSource>, retry: RetryConfig) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let root = CancellationToken::new();
        let teardown = Arc::new(root.clone().drop_guard());

        Self {
            inner: Arc::new(LoaderInner {
                source,
                retry,
                state: RwLock::new(LoaderState::default()),
                event_tx,
                last_session: AtomicU64::new(0),
                root,
            }),
            _teardown: teardown,
        }
    }

    /// Create a loader and immediately start the first session
    pub async fn start(config: &Config) -> Result<Self> {
        let loader = Self::new(config)?;
        loader.refetch().await;
        Ok(loader)
    }

    /// Start a new load session, superseding any session in flight
    ///
    /// The collection and facet sets are reset to empty before this returns.
    pub async fn refetch(&self) -> SessionId {
        let id = SessionId(self.inner.last_session.fetch_add(1, Ordering::SeqCst) + 1);
        let token = self.inner.root.child_token();

        let mut state = self.inner.state.write().await;
        if let Some(previous) = state.current.take() {
            debug!(session = %previous.id, superseded_by = %id, "Superseding load session");
            // The stale task observes its token and exits on its own
            drop(previous.cancel());
        }

        state.sections = FacetSet::new();
        state.collections = FacetSet::new();
        state.snapshot = CatalogSnapshot {
            session: Some(id),
            phase: LoadPhase::FirstPageLoading,
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        self.inner
            .event_tx
            .send(CatalogEvent::SessionStarted { session: id })
            .ok();

        let mut session = LoadSession::new(id, token.clone());
        session.task = Some(tokio::spawn(run_session(self.inner.clone(), id, token)));
        state.current = Some(session);
        drop(state);

        info!(session = %id, source = self.inner.source.name(), "Catalog load session started");
        id
    }

    /// Current loader state
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.inner.state.read().await.snapshot.clone()
    }

    /// Subscribe to load events
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Load events as a stream; lagged receivers skip ahead silently
    pub fn events(&self) -> impl Stream<Item = CatalogEvent> + Send + 'static {
        futures::stream::unfold(self.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }

    /// Wait until the current session reaches a terminal phase
    ///
    /// Returns immediately for an idle loader, and as soon as the session is shut down
    /// with no successor.
    pub async fn wait_until_idle(&self) -> CatalogSnapshot {
        let mut rx = self.subscribe();
        loop {
            let token = {
                let state = self.inner.state.read().await;
                let snapshot = &state.snapshot;
                match &state.current {
                    Some(session)
                        if !snapshot.phase.is_terminal() && snapshot.phase != LoadPhase::Idle =>
                    {
                        session.token.clone()
                    }
                    _ => return snapshot.clone(),
                }
            };
            tokio::select! {
                _ = token.cancelled() => continue,
                received = rx.recv() => match received {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return self.snapshot().await,
                },
            }
        }
    }

    /// Cancel the current session and wait for its task to exit
    ///
    /// The last snapshot stays readable; no further mutation happens until the next
    /// [`refetch`](CatalogLoader::refetch).
    pub async fn shutdown(&self) {
        let current = self.inner.state.write().await.current.take();
        if let Some(session) = current {
            let id = session.id;
            if let Some(task) = session.cancel() {
                if let Err(e) = task.await {
                    warn!(session = %id, error = %e, "Load task ended abnormally");
                }
            }
            info!(session = %id, "Catalog loader shut down");
        }
    }
}

impl LoaderInner {
    /// Apply a mutation if `id` is still the live session
    ///
    /// Events returned by `mutate` are broadcast while the lock is held so their order
    /// matches the order of mutations.
    async fn apply<F>(&self, id: SessionId, token: &CancellationToken, mutate: F) -> bool
    where
        F: FnOnce(&mut LoaderState) -> Vec<CatalogEvent>,
    {
        let mut state = self.state.write().await;
        let is_current = state.current.as_ref().is_some_and(|s| s.id == id);
        if token.is_cancelled() || !is_current {
            debug!(session = %id, "Dropping update from stale session");
            return false;
        }

        let events = mutate(&mut state);
        state.snapshot.updated_at = Some(Utc::now());
        for event in events {
            self.event_tx.send(event).ok();
        }
        true
    }

    async fn fetch_page(&self, cursor: Option<&str>, token: &CancellationToken) -> Result<RawPage> {
        fetch_with_retry(&self.retry, token, || self.source.fetch(cursor, token)).await
    }
}

/// Page loop of one session
async fn run_session(inner: Arc<LoaderInner>, id: SessionId, token: CancellationToken) {
    let first = match inner.fetch_page(None, &token).await {
        Ok(page) => page,
        Err(e) => {
            first_page_failed(&inner, id, &token, e).await;
            return;
        }
    };

    let (items, skipped) = map_page(&first.records);
    if skipped > 0 {
        debug!(session = %id, skipped, "Skipped records without a name");
    }
    let revealed = items.len();
    let mut cursor = first.next_cursor;
    let has_more = cursor.is_some();

    let applied = inner
        .apply(id, &token, |state| {
            state.sections = FacetSet::from_values(sections_of(&items));
            state.collections = FacetSet::from_values(collections_of(&items));
            state.publish_facets();

            let snapshot = &mut state.snapshot;
            snapshot.items = Arc::new(items);
            snapshot.phase = if has_more {
                LoadPhase::Streaming
            } else {
                LoadPhase::Settled
            };
            snapshot.pages_loaded = 1;
            snapshot.skipped_records = skipped;

            let mut events = vec![CatalogEvent::FirstPageLoaded {
                session: id,
                items: revealed,
                has_more,
            }];
            if !has_more {
                events.push(CatalogEvent::Settled {
                    session: id,
                    total: revealed,
                });
            }
            events
        })
        .await;
    if !applied {
        return;
    }
    info!(session = %id, items = revealed, has_more, "First page revealed");

    let mut page_number = 1;
    while let Some(next) = cursor.take() {
        if token.is_cancelled() {
            debug!(session = %id, "Session cancelled before next page");
            return;
        }

        let page = match inner.fetch_page(Some(&next), &token).await {
            Ok(page) => page,
            Err(e) if e.is_cancelled() => {
                debug!(session = %id, "Page fetch cancelled");
                return;
            }
            Err(e) => {
                stream_interrupted(&inner, id, &token, e).await;
                return;
            }
        };

        page_number += 1;
        let (items, skipped) = map_page(&page.records);
        let appended = items.len();
        cursor = page.next_cursor;
        let has_more = cursor.is_some();

        let applied = inner
            .apply(id, &token, |state| {
                state.sections.extend(sections_of(&items));
                state.collections.extend(collections_of(&items));
                state.publish_facets();

                let snapshot = &mut state.snapshot;
                let mut merged = Vec::with_capacity(snapshot.items.len() + items.len());
                merged.extend(snapshot.items.iter().cloned());
                merged.extend(items);
                let total = merged.len();
                snapshot.items = Arc::new(merged);
                snapshot.pages_loaded = page_number;
                snapshot.skipped_records += skipped;
                if !has_more {
                    snapshot.phase = LoadPhase::Settled;
                }

                let mut events = vec![CatalogEvent::PageAppended {
                    session: id,
                    page: page_number,
                    items: appended,
                    total,
                }];
                if !has_more {
                    events.push(CatalogEvent::Settled { session: id, total });
                }
                events
            })
            .await;
        if !applied {
            return;
        }
        debug!(session = %id, page = page_number, items = appended, "Page appended");
    }

    info!(session = %id, "Catalog load settled");
}

async fn first_page_failed(
    inner: &LoaderInner,
    id: SessionId,
    token: &CancellationToken,
    err: Error,
) {
    if err.is_cancelled() {
        debug!(session = %id, "First page fetch cancelled");
        return;
    }

    let message = err.to_string();
    let applied = inner
        .apply(id, token, |state| {
            state.snapshot.phase = LoadPhase::FirstPageError;
            state.snapshot.error = Some(message.clone());
            vec![CatalogEvent::LoadFailed {
                session: id,
                error: message.clone(),
            }]
        })
        .await;
    if applied {
        error!(session = %id, error = %err, "Failed to load catalog");
    }
}

async fn stream_interrupted(
    inner: &LoaderInner,
    id: SessionId,
    token: &CancellationToken,
    err: Error,
) {
    let message = err.to_string();
    let applied = inner
        .apply(id, token, |state| {
            state.snapshot.phase = LoadPhase::Settled;
            state.snapshot.interrupted = Some(message.clone());
            vec![CatalogEvent::StreamInterrupted {
                session: id,
                error: message.clone(),
                total: state.snapshot.items.len(),
            }]
        })
        .await;
    if applied {
        warn!(session = %id, error = %err, "Streaming stopped early, keeping partial catalog");
    }
}
