//! Configuration types for closet-catalog
//!
//! Remote credentials and table identifiers are carried in an explicit [`Config`] value
//! passed to the loader; nothing is read from module-level state.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`SourceConfig::api_key`]
pub const API_KEY_ENV: &str = "CLOSET_CATALOG_API_KEY";

/// Environment variable overriding [`SourceConfig::base_id`]
pub const BASE_ID_ENV: &str = "CLOSET_CATALOG_BASE_ID";

/// Remote tabular source settings (base, table, view, credential)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// API root (default: "https://api.airtable.com/v0")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base identifier
    #[serde(default)]
    pub base_id: String,

    /// Table name or identifier within the base
    #[serde(default)]
    pub table: String,

    /// View identifier fixing server-side ordering
    #[serde(default)]
    pub view: String,

    /// Server-side visibility filter (default: "NOT(Hidden)")
    #[serde(default = "default_filter_formula")]
    pub filter_formula: String,

    /// Bearer credential
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout (None = wait until success, failure or cancellation)
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,

    /// User agent sent with every page request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            base_id: String::new(),
            table: String::new(),
            view: String::new(),
            filter_formula: default_filter_formula(),
            api_key: String::new(),
            request_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

// The credential must never end up in logs.
impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("api_base_url", &self.api_base_url)
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .field("view", &self.view)
            .field("filter_formula", &self.filter_formula)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Retry behavior for page fetches
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0, a failed page is final)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Hidden easter-egg entry excluded from normal results
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SentinelConfig {
    /// Fixed synthetic item id
    #[serde(default = "default_sentinel_id")]
    pub id: String,

    /// Exact, case-sensitive query text revealing the sentinel
    #[serde(default = "default_sentinel_secret")]
    pub secret: String,

    /// Display name of the synthetic sentinel item
    #[serde(default = "default_sentinel_name")]
    pub name: String,

    /// Note shown on the synthetic sentinel item
    #[serde(default = "default_sentinel_note")]
    pub note: String,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            id: default_sentinel_id(),
            secret: default_sentinel_secret(),
            name: default_sentinel_name(),
            note: default_sentinel_note(),
        }
    }
}

/// Search and query-trigger settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum fuzzy score accepted as a match (0.0 = exact, 1.0 = anything; default: 0.3)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Query words shorter than this must match as a substring (default: 3)
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,

    /// Quiescence window before a typed query is evaluated (default: 150ms)
    #[serde(default = "default_debounce", with = "millis_serde", rename = "debounce_ms")]
    pub debounce: Duration,

    /// Easter-egg sentinel settings
    #[serde(default)]
    pub sentinel: SentinelConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_token_len: default_min_token_len(),
            debounce: default_debounce(),
            sentinel: SentinelConfig::default(),
        }
    }
}

/// Selection-list persistence settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Storage key; the file store writes `{storage_dir}/{storage_key}.json` (default: "photogallery-cart")
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Directory for the file-backed store (default: ".")
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            storage_dir: default_storage_dir(),
        }
    }
}

impl SelectionConfig {
    /// Path of the JSON file holding the selected ids
    pub fn storage_path(&self) -> PathBuf {
        self.storage_dir.join(format!("{}.json", self.storage_key))
    }
}

/// Outbound request form settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestFormConfig {
    /// Form URL accepting pre-filled entries
    #[serde(default)]
    pub form_url: String,

    /// Form field receiving the client name
    #[serde(default)]
    pub name_entry: String,

    /// Form field receiving the item list
    #[serde(default)]
    pub items_entry: String,
}

/// Main configuration for the catalog
///
/// Fields are organized into sub-configs:
/// - [`source`](SourceConfig) — remote base, table, view and credential
/// - [`retry`](RetryConfig) — caller-side retry policy for page fetches
/// - [`search`](SearchConfig) — fuzzy threshold, debounce window, sentinel
/// - [`selection`](SelectionConfig) — selection-list storage
/// - [`request_form`](RequestFormConfig) — outbound request form
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Retry policy for page fetches
    #[serde(default)]
    pub retry: RetryConfig,

    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Selection-list storage
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Outbound request form
    #[serde(default)]
    pub request_form: RequestFormConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config '{}': {}", path.display(), e),
            ))
        })?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override credential and base id from the environment when set
    pub fn apply_env(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            self.source.api_key = key;
        }
        if let Ok(base) = std::env::var(BASE_ID_ENV)
            && !base.is_empty()
        {
            self.source.base_id = base;
        }
        self
    }

    /// Check the configuration for values the loader cannot work with
    pub fn validate(&self) -> Result<()> {
        let source = &self.source;
        match url::Url::parse(&source.api_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(Error::config(
                    "source.api_base_url",
                    format!("unsupported scheme '{}'", url.scheme()),
                ));
            }
            Err(e) => {
                return Err(Error::config(
                    "source.api_base_url",
                    format!("invalid URL: {}", e),
                ));
            }
        }

        for (key, value) in [
            ("source.base_id", &source.base_id),
            ("source.table", &source.table),
            ("source.view", &source.view),
            ("source.api_key", &source.api_key),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(key, format!("{} must not be empty", key)));
            }
        }

        if !(0.0..=1.0).contains(&self.search.threshold) {
            return Err(Error::config(
                "search.threshold",
                format!("threshold {} is outside 0.0..=1.0", self.search.threshold),
            ));
        }

        if self.search.sentinel.secret.trim().is_empty() {
            return Err(Error::config(
                "search.sentinel.secret",
                "sentinel secret must not be blank",
            ));
        }

        let multiplier = self.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(Error::config(
                "retry.backoff_multiplier",
                format!("backoff multiplier {} must be finite and positive", multiplier),
            ));
        }

        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.airtable.com/v0".to_string()
}

fn default_filter_formula() -> String {
    "NOT(Hidden)".to_string()
}

fn default_user_agent() -> String {
    concat!("closet-catalog/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_threshold() -> f64 {
    0.3
}

fn default_min_token_len() -> usize {
    3
}

fn default_debounce() -> Duration {
    Duration::from_millis(150)
}

fn default_sentinel_id() -> String {
    "rec_sentinel_mellon".to_string()
}

fn default_sentinel_secret() -> String {
    "mellon".to_string()
}

fn default_sentinel_name() -> String {
    "Mellon".to_string()
}

fn default_sentinel_note() -> String {
    "You solved the riddle. You're now in the cool club.".to_string()
}

fn default_storage_key() -> String {
    "photogallery-cart".to_string()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".")
}

// Duration serialization helper (seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper (seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

// Duration serialization helper (milliseconds)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
