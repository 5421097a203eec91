//! Error types for tagwatch-git

use std::path::PathBuf;

/// Result type for tagwatch-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tagwatch-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// The remote has no commits the local branch lacks.
    ///
    /// Not a failure: [`crate::CloneOrPull`] reports it as
    /// [`crate::SyncOutcome::AlreadyUpToDate`].
    #[error("already up-to-date")]
    AlreadyUpToDate,

    #[error("Clone of {url} into {path} failed: {message}")]
    CloneFailed {
        url: String,
        path: PathBuf,
        message: String,
    },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Pull failed: {message}")]
    PullFailed { message: String },

    #[error("{message}")]
    CannotFastForward { message: String },

    #[error("Repository at {path} has HEAD detached; cannot pull")]
    DetachedHead { path: PathBuf },

    #[error("Repository at {path} is bare; a working tree is required")]
    BareRepository { path: PathBuf },
}

impl Error {
    /// Whether this error is the designated "nothing to update" outcome.
    pub fn is_already_up_to_date(&self) -> bool {
        matches!(self, Error::AlreadyUpToDate)
    }
}
