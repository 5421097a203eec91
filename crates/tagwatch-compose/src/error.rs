//! Error types for tagwatch-compose

use std::path::PathBuf;

/// Result type for tagwatch-compose operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating or deploying a manifest
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The synced repository has no manifest where one is expected
    #[error(
        "Repository does not contain a compose manifest: {path} is missing. Check the application's docker-compose-location."
    )]
    ManifestMissing { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The orchestration tool ran and exited unsuccessfully
    #[error("`{program}` failed (exit code {code}): {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_manifest_missing(&self) -> bool {
        matches!(self, Error::ManifestMissing { .. })
    }
}
