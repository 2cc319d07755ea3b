//! Selection list ("cart") and its persistence port
//!
//! The list holds selected item ids in the order they were added. Persistence is
//! best-effort: a missing or corrupt store yields an empty list, and failed writes are
//! logged and otherwise ignored.

mod file;

pub use file::JsonFileStore;

use crate::types::Item;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Best-effort storage for the selected ids
///
/// Implementations never fail: problems are logged and reported as an empty load or a
/// dropped save.
pub trait SelectionStore: Send + Sync {
    /// Stored ids, or an empty list when nothing usable is stored
    fn load(&self) -> Vec<String>;

    /// Replace the stored ids
    fn save(&self, ids: &[String]);

    /// Store name for logging
    fn name(&self) -> &str {
        "selection-store"
    }
}

/// In-memory store; clones share the same contents
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    ids: Arc<Mutex<Vec<String>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `ids`
    pub fn with_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut stored) = store.ids.lock() {
            *stored = ids.into_iter().map(Into::into).collect();
        }
        store
    }

    /// Current contents
    pub fn stored(&self) -> Vec<String> {
        self.ids.lock().map(|ids| ids.clone()).unwrap_or_default()
    }

    /// Number of saves performed
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl SelectionStore for MemoryStore {
    fn load(&self) -> Vec<String> {
        self.stored()
    }

    fn save(&self, ids: &[String]) {
        if let Ok(mut stored) = self.ids.lock() {
            *stored = ids.to_vec();
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Insertion-ordered set of selected item ids, saved on every change
pub struct SelectionList<S: SelectionStore> {
    store: S,
    ids: Vec<String>,
}

impl<S: SelectionStore> SelectionList<S> {
    /// Load the list once from `store`; duplicate ids are dropped
    pub fn load(store: S) -> Self {
        let mut ids: Vec<String> = Vec::new();
        for id in store.load() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        debug!(store = store.name(), selected = ids.len(), "Selection list loaded");
        Self { store, ids }
    }

    /// Add `id` if absent, remove it if present; returns whether it is now selected
    pub fn toggle(&mut self, id: &str) -> bool {
        let selected = match self.ids.iter().position(|s| s == id) {
            Some(pos) => {
                self.ids.remove(pos);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        };
        self.store.save(&self.ids);
        selected
    }

    /// Remove `id`; returns whether it was selected
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(pos) = self.ids.iter().position(|s| s == id) else {
            return false;
        };
        self.ids.remove(pos);
        self.store.save(&self.ids);
        true
    }

    /// Whether `id` is selected
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// Number of selected ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in insertion order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Selected items of `items`, in collection order
    ///
    /// Ids that are not in the collection (yet) are skipped.
    pub fn items_from(&self, items: &[Item]) -> Vec<Item> {
        items
            .iter()
            .filter(|item| self.contains(&item.id))
            .cloned()
            .collect()
    }

    /// The backing store
    pub fn store(&self) -> &S {
        &self.store
    }
}
