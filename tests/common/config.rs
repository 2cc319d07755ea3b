//! Test configuration helpers for mock and live remotes

use super::fixtures::{API_KEY, BASE_ID, TABLE, VIEW};
use closet_catalog::Config;
use closet_catalog::config::{API_KEY_ENV, BASE_ID_ENV};

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Config pointing at a wiremock server
pub fn mock_config(server_uri: &str) -> Config {
    let mut config = Config::default();
    config.source.api_base_url = format!("{}/v0", server_uri);
    config.source.base_id = BASE_ID.to_string();
    config.source.table = TABLE.to_string();
    config.source.view = VIEW.to_string();
    config.source.api_key = API_KEY.to_string();
    config
}

/// Load a config for the real remote from `.env` / the environment
///
/// Required environment variables:
/// - `CLOSET_CATALOG_API_KEY` - Bearer credential
/// - `CLOSET_CATALOG_BASE_ID` - Base identifier
/// - `CLOSET_CATALOG_TABLE` - Table name
/// - `CLOSET_CATALOG_VIEW` - View name
pub fn load_live_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let mut config = Config::default().apply_env();
    config.source.table = std::env::var("CLOSET_CATALOG_TABLE")
        .map_err(|_| ConfigError("CLOSET_CATALOG_TABLE not set in environment".to_string()))?;
    config.source.view = std::env::var("CLOSET_CATALOG_VIEW")
        .map_err(|_| ConfigError("CLOSET_CATALOG_VIEW not set in environment".to_string()))?;

    config
        .validate()
        .map_err(|e| ConfigError(format!("Invalid live config: {}", e)))?;
    Ok(config)
}

/// Check if live test credentials are available
pub fn has_live_credentials() -> bool {
    dotenvy::dotenv().ok();
    std::env::var(API_KEY_ENV).is_ok()
        && std::env::var(BASE_ID_ENV).is_ok()
        && std::env::var("CLOSET_CATALOG_TABLE").is_ok()
        && std::env::var("CLOSET_CATALOG_VIEW").is_ok()
}

/// Skip test if credentials are not available
#[macro_export]
macro_rules! skip_if_no_credentials {
    () => {
        if !$crate::common::has_live_credentials() {
            eprintln!("Skipping test: catalog credentials not found in .env");
            return;
        }
    };
}
