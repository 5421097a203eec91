//! Clone-or-pull synchronisation of manifest repositories

use std::fmt;
use std::path::Path;

use crate::{Error, GitBackend, Result};

/// Remote pulled from on every sync
pub const DEFAULT_REMOTE: &str = "origin";

/// What a successful sync did to the local checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The checkout did not exist and was cloned
    Cloned,
    /// New commits were pulled into the existing checkout
    Pulled,
    /// The existing checkout already had every remote commit
    AlreadyUpToDate,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Cloned => write!(f, "cloned"),
            SyncOutcome::Pulled => write!(f, "pulled"),
            SyncOutcome::AlreadyUpToDate => write!(f, "already up-to-date"),
        }
    }
}

/// Ensures a local path holds a current working copy of a repository.
pub trait RepositorySync {
    /// Bring `path` in line with the default branch of `url`.
    fn sync(&self, path: &Path, url: &str) -> Result<SyncOutcome>;
}

/// Clones when the checkout is missing, pulls when it exists.
///
/// An existing checkout is never re-cloned, even if its origin URL no
/// longer matches `url`.
#[derive(Debug, Clone)]
pub struct CloneOrPull<B> {
    backend: B,
    remote: String,
}

impl<B: GitBackend> CloneOrPull<B> {
    pub fn new(backend: B) -> Self {
        Self::with_remote(backend, DEFAULT_REMOTE)
    }

    pub fn with_remote(backend: B, remote: impl Into<String>) -> Self {
        Self {
            backend,
            remote: remote.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: GitBackend> RepositorySync for CloneOrPull<B> {
    fn sync(&self, path: &Path, url: &str) -> Result<SyncOutcome> {
        if !path.exists() {
            tracing::info!(url = %url, path = %path.display(), "git clone");
            self.backend.clone_repo(url, path)?;
            return Ok(SyncOutcome::Cloned);
        }

        tracing::info!(remote = %self.remote, path = %path.display(), "git pull");
        match self.backend.pull(path, &self.remote) {
            Ok(()) => Ok(SyncOutcome::Pulled),
            Err(Error::AlreadyUpToDate) => Ok(SyncOutcome::AlreadyUpToDate),
            Err(e) => Err(e),
        }
    }
}
