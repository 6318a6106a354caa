//! Error types for content sources.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `SourceError`.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors raised while fetching raw records.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A collection file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A response or file was not valid JSON.
    #[error("invalid JSON for collection '{collection}': {source}")]
    Json {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP request itself failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The API token environment variable is unset or empty.
    #[error("environment variable {0} is not set")]
    MissingToken(String),

    /// No database id is configured for the collection.
    #[error("no database configured for collection '{0}'")]
    NotConfigured(String),

    /// Every source in a chain failed, or the chain was empty.
    #[error("no source could provide collection '{0}'")]
    Unavailable(String),
}

impl SourceError {
    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON error for a collection.
    pub fn json(collection: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            collection: collection.into(),
            source,
        }
    }
}
