//! Error types for closet-catalog
//!
//! This module provides the error taxonomy for the library:
//! - Remote failures carrying the HTTP status of the page request
//! - A distinguishable `Cancelled` outcome for superseded load sessions
//! - Configuration errors naming the offending key
//! - Best-effort storage failures for the selection list
//!
//! Records that fail mapping are not errors at all: the record mapper returns `None`
//! and the loader simply counts them.

use thiserror::Error;

/// Result type alias for closet-catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for closet-catalog
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "source.base_id")
        key: Option<String>,
    },

    /// The remote source answered with a non-success status
    #[error("{message}")]
    Remote {
        /// HTTP status code returned by the remote source
        status: u16,
        /// Human-readable message (e.g., "remote API error: 503")
        message: String,
    },

    /// The load session was superseded or torn down before the request completed
    ///
    /// Never shown to the user and never logged as a failure.
    #[error("request cancelled")]
    Cancelled,

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The page body could not be decoded
    #[error("malformed page: {0}")]
    Decode(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Selection-list persistence failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Build a remote error from a response status
    pub fn remote(status: u16) -> Self {
        Error::Remote {
            status,
            message: format!("remote API error: {}", status),
        }
    }

    /// Whether this is the silent outcome of a superseded fetch
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
