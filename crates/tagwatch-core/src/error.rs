//! Error types for tagwatch-core

use std::path::PathBuf;

use crate::reconcile::FailureKind;

/// Result type for tagwatch-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tagwatch-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Watch file could not be read
    #[error("Failed to read watch file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Watch file is not valid YAML or has the wrong shape
    #[error("Failed to parse watch file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Watch file parsed but describes an unusable target set
    #[error("Invalid watch configuration: {message}")]
    InvalidConfig { message: String },

    /// An application failed during a reconcile pass
    #[error("{name}: {kind} failed: {source}")]
    Application {
        name: String,
        kind: FailureKind,
        #[source]
        source: Box<Error>,
    },

    // Transparent wrappers for underlying crate errors
    /// Version source error from tagwatch-store
    #[error(transparent)]
    Store(#[from] tagwatch_store::Error),

    /// Repository sync error from tagwatch-git
    #[error(transparent)]
    Git(#[from] tagwatch_git::Error),

    /// Manifest or deployment error from tagwatch-compose
    #[error(transparent)]
    Compose(#[from] tagwatch_compose::Error),
}

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
