//! Page fetching from the remote tabular source
//!
//! [`PageSource`] is the seam the loader drives. [`AirtableSource`] is the HTTP
//! implementation: one GET per call, fixed view and visibility filter, opaque cursor
//! passed through unmodified. Retrying is the caller's business (see [`crate::retry`]).

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::RawPage;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Source of paginated raw records
///
/// Implementations must return [`Error::Cancelled`] when `cancel` fires before the
/// page is available.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page, starting at `cursor` (None for the first page)
    async fn fetch(&self, cursor: Option<&str>, cancel: &CancellationToken) -> Result<RawPage>;

    /// Human-readable name for logging
    fn name(&self) -> &str {
        "page-source"
    }
}

/// HTTP page source speaking the Airtable list-records API
pub struct AirtableSource {
    /// HTTP client (connection pool shared across pages)
    http_client: reqwest::Client,

    /// Fully-built table endpoint
    endpoint: url::Url,

    /// View identifier
    view: String,

    /// Server-side visibility filter
    filter_formula: String,

    /// Bearer credential
    api_key: String,
}

impl AirtableSource {
    /// Create a new source from configuration
    ///
    /// # Errors
    /// Returns error if the endpoint URL is invalid or the HTTP client cannot be created
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut endpoint = url::Url::parse(&config.api_base_url).map_err(|e| {
            Error::config("source.api_base_url", format!("invalid URL: {}", e))
        })?;
        endpoint
            .path_segments_mut()
            .map_err(|_| Error::config("source.api_base_url", "URL cannot be a base"))?
            .pop_if_empty()
            .push(&config.base_id)
            .push(&config.table);

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint,
            view: config.view.clone(),
            filter_formula: config.filter_formula.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// URL for the page starting at `cursor`
    pub fn page_url(&self, cursor: Option<&str>) -> url::Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("view", &self.view);
            query.append_pair("filterByFormula", &self.filter_formula);
            if let Some(cursor) = cursor {
                query.append_pair("offset", cursor);
            }
        }
        url
    }

    async fn request(&self, cursor: Option<&str>) -> Result<RawPage> {
        let url = self.page_url(cursor);
        debug!(endpoint = %self.endpoint, has_cursor = cursor.is_some(), "Fetching page");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::remote(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<RawPage>(&body).map_err(|e| Error::Decode(e.to_string()))
    }
}

#[async_trait]
impl PageSource for AirtableSource {
    async fn fetch(&self, cursor: Option<&str>, cancel: &CancellationToken) -> Result<RawPage> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            page = self.request(cursor) => page,
        }
    }

    fn name(&self) -> &str {
        "airtable"
    }
}
