//! # closet-catalog
//!
//! Client-side core for browsing a paginated remote catalog of items.
//!
//! ## Design Philosophy
//!
//! closet-catalog is designed to be:
//! - **Progressive** - The first page is shown as soon as it arrives, later pages stream in
//! - **Cancellation-safe** - A superseded load never touches state again
//! - **Library-first** - No UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to load events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use closet_catalog::{CatalogLoader, Config, FilterSelection, QueryEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.source.base_id = "appXXXXXXXXXXXXXX".to_string();
//!     config.source.table = "Closet".to_string();
//!     config.source.view = "Grid view".to_string();
//!     let config = config.apply_env();
//!
//!     let loader = CatalogLoader::start(&config).await?;
//!
//!     // Subscribe to events
//!     let mut events = loader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let snapshot = loader.wait_until_idle().await;
//!     let mut engine = QueryEngine::new(config.search.clone());
//!     let hats = engine.query(
//!         &snapshot.items,
//!         &FilterSelection::Section("Hats".to_string()),
//!         "top hat",
//!     );
//!     println!("{} matching hats", hats.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Presentation helpers (grouping, counts, uid lookup)
pub mod browse;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Page fetching from the remote source
pub mod fetcher;
/// Deep links and the request form
pub mod links;
/// Incremental loader (load sessions, facets)
pub mod loader;
/// Search, filtering and the deferred query trigger
pub mod query;
/// Record mapping
pub mod record;
/// Retry logic with exponential backoff
pub mod retry;
/// Selection list and its persistence port
pub mod selection;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use browse::{DisplayGroup, SectionCounts, find_by_uid, group_for_display, section_counts};
pub use config::{
    Config, RequestFormConfig, RetryConfig, SearchConfig, SelectionConfig, SentinelConfig,
    SourceConfig,
};
pub use error::{Error, Result};
pub use fetcher::{AirtableSource, PageSource};
pub use loader::{CatalogLoader, FacetSet};
pub use query::{
    CatalogBrowser, QueryDebouncer, QueryEngine, SearchField, SearchHit, SearchIndex, query_items,
};
pub use record::{map_page, map_record};
pub use selection::{JsonFileStore, MemoryStore, SelectionList, SelectionStore};
pub use types::{
    CatalogEvent, CatalogSnapshot, FilterSelection, Item, LoadPhase, RawPage, RawRecord, SessionId,
};
