//! Error types for tagwatch-store

use std::path::PathBuf;

/// Result type for tagwatch-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a version marker
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Version marker gs://{bucket}/{object} not found")]
    NotFound { bucket: String, object: String },

    #[error("Blob store returned {status} for gs://{bucket}/{object}: {body}")]
    Status {
        bucket: String,
        object: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid blob store endpoint: {endpoint}")]
    InvalidEndpoint { endpoint: String },

    #[error("Failed to obtain access token: {message}")]
    Token { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the marker object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
