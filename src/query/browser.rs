//! Catalog browsing state for one presentation surface

use super::{QueryDebouncer, QueryEngine};
use crate::browse::{DisplayGroup, group_for_display};
use crate::config::SearchConfig;
use crate::loader::CatalogLoader;
use crate::types::{FilterSelection, Item};
use tokio::sync::watch;

/// Loader, query engine, deferred query text and filter selection tied together
///
/// The filter applies immediately; typed text goes through the debouncer and only the
/// settled text reaches the engine.
pub struct CatalogBrowser {
    loader: CatalogLoader,
    engine: QueryEngine,
    debouncer: QueryDebouncer,
    filter: FilterSelection,
}

impl CatalogBrowser {
    /// Create a browser over `loader`; must be called inside a tokio runtime
    pub fn new(loader: CatalogLoader, config: &SearchConfig) -> Self {
        Self {
            loader,
            engine: QueryEngine::new(config.clone()),
            debouncer: QueryDebouncer::new(config.debounce),
            filter: FilterSelection::All,
        }
    }

    /// The underlying loader
    pub fn loader(&self) -> &CatalogLoader {
        &self.loader
    }

    /// Record typed query text
    pub fn set_query(&self, text: impl Into<String>) {
        self.debouncer.push(text);
    }

    /// Query text as typed (not yet settled)
    pub fn query_text(&self) -> String {
        self.debouncer.displayed()
    }

    /// Query text the results are computed from
    pub fn settled_query(&self) -> String {
        self.debouncer.settled()
    }

    /// Settle any pending query text now
    pub async fn flush_query(&self) -> String {
        self.debouncer.flush().await
    }

    /// Receiver notified whenever the settled query text changes
    pub fn subscribe_query(&self) -> watch::Receiver<String> {
        self.debouncer.subscribe()
    }

    /// Replace the filter selection
    pub fn set_filter(&mut self, filter: FilterSelection) {
        self.filter = filter;
    }

    /// Current filter selection
    pub fn filter(&self) -> &FilterSelection {
        &self.filter
    }

    /// Times the search index has been rebuilt
    pub fn rebuild_count(&self) -> usize {
        self.engine.rebuild_count()
    }

    /// Matching items for the loader's current collection
    pub async fn results(&mut self) -> Vec<Item> {
        let snapshot = self.loader.snapshot().await;
        let text = self.debouncer.settled();
        self.engine.query(&snapshot.items, &self.filter, &text)
    }

    /// Current results arranged into display groups
    ///
    /// The Featured group follows the typed text, so it disappears on the first
    /// keystroke while results still come from the settled text.
    pub async fn groups(&mut self) -> Vec<DisplayGroup> {
        let snapshot = self.loader.snapshot().await;
        let settled = self.debouncer.settled();
        let results = self.engine.query(&snapshot.items, &self.filter, &settled);
        let typed = self.debouncer.displayed();
        group_for_display(&results, &snapshot.sections, &self.filter, &typed)
    }
}
