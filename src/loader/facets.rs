//! Insertion-ordered facet sets (sections, collections)

use crate::types::Item;
use std::collections::HashSet;

/// Distinct values in first-seen order
///
/// Values already present keep their position; new values are appended in the order
/// they are encountered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl FacetSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from values, keeping first-seen order
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self::new();
        set.extend(values);
        set
    }

    /// Insert one value; returns true if it was new
    pub fn insert(&mut self, value: &str) -> bool {
        if self.seen.contains(value) {
            return false;
        }
        self.seen.insert(value.to_string());
        self.order.push(value.to_string());
        true
    }

    /// Union values into the set; returns how many were new
    pub fn extend<'a>(&mut self, values: impl IntoIterator<Item = &'a str>) -> usize {
        values.into_iter().filter(|v| self.insert(v)).count()
    }

    /// Whether the value is present
    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    /// Values in first-seen order
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Section values of `items`, in item order
pub fn sections_of(items: &[Item]) -> impl Iterator<Item = &str> {
    items.iter().map(|item| item.section.as_str())
}

/// Collection values of `items`, flattened in item order
pub fn collections_of(items: &[Item]) -> impl Iterator<Item = &str> {
    items
        .iter()
        .flat_map(|item| item.collections.iter().map(String::as_str))
}
