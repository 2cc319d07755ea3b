//! Presentation helpers: featured ordering, display groups, section counts, uid lookup

use crate::types::{FilterSelection, Item};
use serde::Serialize;

/// Label of the leading group holding featured items
pub const FEATURED_GROUP: &str = "Featured";

/// Labelled run of items shown together
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayGroup {
    /// Group heading
    pub label: String,
    /// Items in display order
    pub items: Vec<Item>,
}

/// Item counts per section
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SectionCounts {
    /// Count of every item
    pub total: usize,
    /// `(section, count)` in facet order
    pub sections: Vec<(String, usize)>,
}

impl SectionCounts {
    /// Count for one section (0 when unknown)
    pub fn get(&self, section: &str) -> usize {
        self.sections
            .iter()
            .find(|(name, _)| name == section)
            .map_or(0, |(_, count)| *count)
    }
}

/// Featured items first; order is otherwise preserved
pub fn sort_featured_first(items: &[Item]) -> Vec<Item> {
    let mut sorted = items.to_vec();
    // sort_by_key is stable
    sorted.sort_by_key(|item| !item.featured);
    sorted
}

/// Arrange query results into display groups
///
/// With the `All` filter: a leading [`FEATURED_GROUP`] when the query text is empty and
/// any item is featured, then one group per section in `sections` order with featured
/// items first. With any other filter: one featured-first group labelled by the filter
/// value. Empty groups are omitted.
pub fn group_for_display(
    items: &[Item],
    sections: &[String],
    filter: &FilterSelection,
    query_text: &str,
) -> Vec<DisplayGroup> {
    let label = match filter {
        FilterSelection::All => None,
        FilterSelection::Section(value) | FilterSelection::Collection(value) => Some(value),
    };
    if let Some(label) = label {
        if items.is_empty() {
            return Vec::new();
        }
        return vec![DisplayGroup {
            label: label.clone(),
            items: sort_featured_first(items),
        }];
    }

    let mut groups = Vec::new();

    if query_text.trim().is_empty() {
        let featured: Vec<Item> = items.iter().filter(|i| i.featured).cloned().collect();
        if !featured.is_empty() {
            groups.push(DisplayGroup {
                label: FEATURED_GROUP.to_string(),
                items: featured,
            });
        }
    }

    for section in sections {
        let members: Vec<Item> = items
            .iter()
            .filter(|item| item.section == *section)
            .cloned()
            .collect();
        if !members.is_empty() {
            groups.push(DisplayGroup {
                label: section.clone(),
                items: sort_featured_first(&members),
            });
        }
    }

    groups
}

/// Per-section item counts in facet order plus the total
pub fn section_counts(items: &[Item], sections: &[String]) -> SectionCounts {
    SectionCounts {
        total: items.len(),
        sections: sections
            .iter()
            .map(|section| {
                let count = items.iter().filter(|item| item.section == *section).count();
                (section.clone(), count)
            })
            .collect(),
    }
}

/// Item with the given uid; the first match wins when uids repeat
pub fn find_by_uid(items: &[Item], uid: i64) -> Option<&Item> {
    items.iter().find(|item| item.uid == uid)
}
