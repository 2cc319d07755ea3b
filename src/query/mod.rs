//! Query engine: fuzzy search, filter selection and the hidden sentinel entry
//!
//! Results are a pure function of `(items, filter, text)`. [`QueryEngine`] keeps the
//! search index for the last collection it saw and rebuilds it only when the collection
//! `Arc` changes, so typing and switching filters only re-query the index.

mod browser;
mod debounce;
mod index;


pub use browser::CatalogBrowser;
pub use debounce::QueryDebouncer;
pub use index::{SearchField, SearchHit, SearchIndex};

use crate::config::{SearchConfig, SentinelConfig};
use crate::types::{FilterSelection, Item, UNCATEGORIZED};
use std::sync::Arc;
use tracing::debug;

/// Cached-index query engine
pub struct QueryEngine {
    config: SearchConfig,
    index: Option<SearchIndex>,
    rebuilds: usize,
}

impl QueryEngine {
    /// Create an engine with no index yet
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            index: None,
            rebuilds: 0,
        }
    }

    /// Search settings in use
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Number of times the index has been built
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Ordered matching items for `text` within `filter`
    ///
    /// Empty text (after trimming) returns the filtered collection in collection order;
    /// otherwise items come in relevance order. The sentinel is excluded unless non-blank
    /// `text` is exactly the secret, in which case it is the only result.
    pub fn query(
        &mut self,
        items: &Arc<Vec<Item>>,
        filter: &FilterSelection,
        text: &str,
    ) -> Vec<Item> {
        let sentinel = &self.config.sentinel;
        if text.trim().is_empty() {
            return filter_only(items, filter, sentinel);
        }
        if text == sentinel.secret {
            return vec![reveal_sentinel(items, sentinel)];
        }

        let hits = self.rank(items, text);
        hits.into_iter()
            .map(|hit| &items[hit.index])
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    /// Relevance ranking for `text` over `items`, independent of any filter
    ///
    /// The sentinel never appears in a ranking.
    pub fn rank(&mut self, items: &Arc<Vec<Item>>, text: &str) -> Vec<SearchHit> {
        let sentinel_id = self.config.sentinel.id.clone();
        let index = self.index_for(items);
        index
            .search(text)
            .into_iter()
            .filter(|hit| index.items()[hit.index].id != sentinel_id)
            .collect()
    }

    fn index_for(&mut self, items: &Arc<Vec<Item>>) -> &SearchIndex {
        if self.index.as_ref().is_none_or(|index| !index.is_for(items)) {
            self.rebuilds += 1;
            debug!(items = items.len(), rebuilds = self.rebuilds, "Rebuilding search index");
            self.index = None;
        }
        let config = &self.config;
        self.index
            .get_or_insert_with(|| SearchIndex::build(items.clone(), config))
    }
}

/// Stateless form of [`QueryEngine::query`]; builds a throwaway index
pub fn query_items(
    items: &Arc<Vec<Item>>,
    filter: &FilterSelection,
    text: &str,
    config: &SearchConfig,
) -> Vec<Item> {
    QueryEngine::new(config.clone()).query(items, filter, text)
}

fn filter_only(items: &[Item], filter: &FilterSelection, sentinel: &SentinelConfig) -> Vec<Item> {
    items
        .iter()
        .filter(|item| item.id != sentinel.id && filter.matches(item))
        .cloned()
        .collect()
}

/// The collection's own sentinel record, or a synthetic one from `config`
fn reveal_sentinel(items: &[Item], config: &SentinelConfig) -> Item {
    items
        .iter()
        .find(|item| item.id == config.id)
        .cloned()
        .unwrap_or_else(|| Item {
            id: config.id.clone(),
            uid: 0,
            name: config.name.clone(),
            images: Vec::new(),
            note: config.note.clone(),
            section: UNCATEGORIZED.to_string(),
            tags: String::new(),
            collections: Vec::new(),
            size: String::new(),
            featured: false,
        })
}
