//! Core types for closet-catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Section assigned to items whose record carries none
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One normalized catalog entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Source-assigned identity (selection-list membership, list keys)
    pub id: String,
    /// Human-assigned reference number used for deep links (not guaranteed unique)
    pub uid: i64,
    /// Display name, never empty
    pub name: String,
    /// Image URLs in source order
    pub images: Vec<String>,
    /// Free-text note
    pub note: String,
    /// Single category label
    pub section: String,
    /// Comma-separated free-text labels
    pub tags: String,
    /// Category labels orthogonal to `section`
    pub collections: Vec<String>,
    /// Free-text size
    pub size: String,
    /// Display-ordering hint, never used for filtering
    pub featured: bool,
}

/// The single active categorical constraint
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FilterSelection {
    /// No constraint
    #[default]
    All,
    /// Items whose `section` equals the value
    Section(String),
    /// Items whose `collections` contain the value
    Collection(String),
}

impl FilterSelection {
    /// Whether the item passes this filter
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            FilterSelection::All => true,
            FilterSelection::Section(section) => item.section == *section,
            FilterSelection::Collection(collection) => {
                item.collections.iter().any(|c| c == collection)
            }
        }
    }

    /// Whether this is the no-op filter
    pub fn is_all(&self) -> bool {
        matches!(self, FilterSelection::All)
    }
}

/// One raw record as returned by the remote source: identity plus untyped field bag
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Opaque record identity
    pub id: String,
    /// Field name to JSON value
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// One page of raw records and the cursor for the next one
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Records in source order
    #[serde(default)]
    pub records: Vec<RawRecord>,
    /// Continuation token; absent when the dataset is exhausted
    #[serde(default, rename = "offset", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Identifier of one load session
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable phase of the current load session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// No session has started
    #[default]
    Idle,
    /// First page requested, nothing revealed yet
    FirstPageLoading,
    /// First page failed; the collection is empty
    FirstPageError,
    /// First page revealed, later pages still arriving
    Streaming,
    /// No more pages will be merged for this session
    Settled,
}

impl LoadPhase {
    /// Whether the session can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadPhase::FirstPageError | LoadPhase::Settled)
    }
}

/// Point-in-time view of the loader state exposed to the presentation layer
#[derive(Clone, Debug, Default)]
pub struct CatalogSnapshot {
    /// Session owning this state (None before the first session)
    pub session: Option<SessionId>,
    /// Current phase
    pub phase: LoadPhase,
    /// Item collection; a new `Arc` is installed on every change
    pub items: Arc<Vec<Item>>,
    /// Distinct sections in first-seen order
    pub sections: Vec<String>,
    /// Distinct collections in first-seen order
    pub collections: Vec<String>,
    /// Blocking error from the first page
    pub error: Option<String>,
    /// Non-blocking error that stopped streaming after the first page
    pub interrupted: Option<String>,
    /// Pages merged so far in this session
    pub pages_loaded: usize,
    /// Raw records dropped by the mapper in this session
    pub skipped_records: usize,
    /// Time of the last applied change
    pub updated_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    /// Coarse flag: true only while the first page is pending
    pub fn loading(&self) -> bool {
        self.phase == LoadPhase::FirstPageLoading
    }

    /// Coarse flag: true while later pages are streaming in
    pub fn loading_more(&self) -> bool {
        self.phase == LoadPhase::Streaming
    }

    /// Whether a blocking error replaces the normal view
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Event emitted during a load session
///
/// Only mutations that were actually applied produce events; a superseded session
/// is silent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// A new session superseded any previous one and reset the collection
    SessionStarted {
        /// Session ID
        session: SessionId,
    },

    /// The first page was revealed
    FirstPageLoaded {
        /// Session ID
        session: SessionId,
        /// Items revealed
        items: usize,
        /// Whether more pages will stream in
        has_more: bool,
    },

    /// A later page was appended
    PageAppended {
        /// Session ID
        session: SessionId,
        /// 1-based page number
        page: usize,
        /// Items appended by this page
        items: usize,
        /// Collection size after the append
        total: usize,
    },

    /// All pages have been merged
    Settled {
        /// Session ID
        session: SessionId,
        /// Final collection size
        total: usize,
    },

    /// The first page failed; the error replaces the normal view
    LoadFailed {
        /// Session ID
        session: SessionId,
        /// Error message
        error: String,
    },

    /// A later page failed; partial data stays visible
    StreamInterrupted {
        /// Session ID
        session: SessionId,
        /// Error message
        error: String,
        /// Items kept
        total: usize,
    },
}

impl CatalogEvent {
    /// Session this event belongs to
    pub fn session(&self) -> SessionId {
        match self {
            CatalogEvent::SessionStarted { session }
            | CatalogEvent::FirstPageLoaded { session, .. }
            | CatalogEvent::PageAppended { session, .. }
            | CatalogEvent::Settled { session, .. }
            | CatalogEvent::LoadFailed { session, .. }
            | CatalogEvent::StreamInterrupted { session, .. } => *session,
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn item(section: &str, collections: &[&str]) -> Item {
        Item {
            id: "rec1".to_string(),
            uid: 1,
            name: "Wool Coat".to_string(),
            images: vec![],
            note: String::new(),
            section: section.to_string(),
            tags: String::new(),
            collections: collections.iter().map(|c| c.to_string()).collect(),
            size: String::new(),
            featured: false,
        }
    }

    #[test]
    fn test_filter_selection_matches() {
        let coat = item("Outerwear", &["Winter", "Neutrals"]);

        assert!(FilterSelection::All.matches(&coat));
        assert!(FilterSelection::Section("Outerwear".into()).matches(&coat));
        assert!(!FilterSelection::Section("outerwear".into()).matches(&coat));
        assert!(FilterSelection::Collection("Winter".into()).matches(&coat));
        assert!(!FilterSelection::Collection("Summer".into()).matches(&coat));
    }

    #[test]
    fn test_filter_selection_serde_shape() {
        let json = serde_json::to_value(FilterSelection::Section("Hats".into())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "section", "value": "Hats"}));

        let all: FilterSelection = serde_json::from_str(r#"{"type":"all"}"#).unwrap();
        assert!(all.is_all());
    }

    #[test]
    fn test_raw_page_decodes_offset_as_cursor() {
        let page: RawPage = serde_json::from_str(
            r#"{"records":[{"id":"rec1","createdTime":"2024-01-01T00:00:00.000Z","fields":{"Name":"Hat"}}],"offset":"itr/rec1"}"#,
        )
        .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].fields["Name"], "Hat");
        assert_eq!(page.next_cursor.as_deref(), Some("itr/rec1"));

        let last: RawPage = serde_json::from_str(r#"{"records":[]}"#).unwrap();
        assert_eq!(last.next_cursor, None);
    }

    #[test]
    fn test_snapshot_flags_follow_phase() {
        let mut snapshot = CatalogSnapshot {
            phase: LoadPhase::FirstPageLoading,
            ..Default::default()
        };
        assert!(snapshot.loading());
        assert!(!snapshot.loading_more());

        snapshot.phase = LoadPhase::Streaming;
        assert!(!snapshot.loading());
        assert!(snapshot.loading_more());

        snapshot.phase = LoadPhase::FirstPageError;
        snapshot.error = Some("remote API error: 500".into());
        assert!(snapshot.has_error());
        assert!(snapshot.phase.is_terminal());
    }

    #[test]
    fn test_event_serialization() {
        let event = CatalogEvent::PageAppended {
            session: SessionId(3),
            page: 2,
            items: 100,
            total: 200,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "page_appended");
        assert_eq!(json["session"], 3);
        assert_eq!(event.session(), SessionId(3));
    }
}
