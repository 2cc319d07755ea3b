//! Record mapping from the remote field bag to [`Item`]
//!
//! Mapping is pure. The only rejection rule is a missing or empty `Name`; every other
//! field falls back to a safe default when absent or of an unexpected type.

use crate::types::{Item, RawRecord, UNCATEGORIZED};
use serde_json::Value;

/// Remote field names
pub mod fields {
    /// Display name (required)
    pub const NAME: &str = "Name";
    /// Human-assigned reference number
    pub const ID: &str = "ID";
    /// Attachments, each an object with a `url`
    pub const IMAGES: &str = "Images";
    /// Free-text note
    pub const NOTE: &str = "Note";
    /// Single category label
    pub const SECTION: &str = "Section";
    /// Comma-separated labels
    pub const TAGS: &str = "Tags";
    /// Multiple category labels
    pub const COLLECTIONS: &str = "Collections";
    /// Free-text size
    pub const SIZE: &str = "Size";
    /// Featured flag
    pub const FEATURED: &str = "Featured";
}

/// Map one raw record into an [`Item`], or `None` when it has no name
pub fn map_record(record: &RawRecord) -> Option<Item> {
    let bag = &record.fields;

    let name = string_field(bag.get(fields::NAME));
    if name.is_empty() {
        return None;
    }

    let section = string_field(bag.get(fields::SECTION));
    let section = if section.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        section
    };

    Some(Item {
        id: record.id.clone(),
        uid: integer_field(bag.get(fields::ID)),
        name,
        images: image_urls(bag.get(fields::IMAGES)),
        note: string_field(bag.get(fields::NOTE)),
        section,
        tags: string_field(bag.get(fields::TAGS)),
        collections: string_list(bag.get(fields::COLLECTIONS)),
        size: string_field(bag.get(fields::SIZE)),
        featured: bag
            .get(fields::FEATURED)
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// Map a page of raw records, keeping source order
///
/// Returns the mapped items and the number of records that were skipped.
pub fn map_page(records: &[RawRecord]) -> (Vec<Item>, usize) {
    let items: Vec<Item> = records.iter().filter_map(map_record).collect();
    let skipped = records.len() - items.len();
    (items, skipped)
}

fn string_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn integer_field(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn image_urls(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_string),
            Value::String(url) => Some(url.clone()),
            _ => None,
        })
        .collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
