//! JSON file store for the selection list

use super::SelectionStore;
use crate::config::SelectionConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Stores the selected ids as a JSON array of strings in one file
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `{storage_dir}/{storage_key}.json`
    pub fn new(config: &SelectionConfig) -> Self {
        Self::at(config.storage_path())
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored ids
    ///
    /// A missing file is an empty list. Anything that is not a JSON array of strings is
    /// an error.
    pub fn try_load(&self) -> Result<Vec<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| {
            Error::Storage(format!(
                "corrupt selection data in '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Write the ids, creating the parent directory if needed
    pub fn try_save(&self, ids: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(ids)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SelectionStore for JsonFileStore {
    fn load(&self) -> Vec<String> {
        self.try_load().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Failed to load selection list");
            Vec::new()
        })
    }

    fn save(&self, ids: &[String]) {
        if let Err(e) = self.try_save(ids) {
            warn!(path = %self.path.display(), error = %e, "Failed to save selection list");
        }
    }

    fn name(&self) -> &str {
        "json-file"
    }
}
