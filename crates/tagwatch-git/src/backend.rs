//! Git backend trait and the git2 implementation

use std::path::Path;

use git2::Repository;

use crate::{Result, helpers};

/// Low-level git operations used by [`crate::CloneOrPull`].
///
/// Implementations perform exactly one network operation per call and
/// never decide between clone and pull themselves.
pub trait GitBackend {
    /// Clone `url` into `path`. `path` must not exist yet.
    fn clone_repo(&self, url: &str, path: &Path) -> Result<()>;

    /// Pull the checked-out branch of the repository at `path` from `remote`.
    ///
    /// Returns [`crate::Error::AlreadyUpToDate`] when there is nothing to pull.
    fn pull(&self, path: &Path, remote: &str) -> Result<()>;
}

/// [`GitBackend`] backed by libgit2.
///
/// Authentication relies on whatever libgit2 picks up by default, so
/// manifest repositories must be public or reachable via local paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Backend;

impl Git2Backend {
    pub fn new() -> Self {
        Self
    }
}

impl GitBackend for Git2Backend {
    fn clone_repo(&self, url: &str, path: &Path) -> Result<()> {
        let repo = helpers::clone(url, path)?;
        tracing::debug!(
            url = %url,
            path = %path.display(),
            branch = ?helpers::get_current_branch(&repo).ok().flatten(),
            "Cloned repository"
        );
        Ok(())
    }

    fn pull(&self, path: &Path, remote: &str) -> Result<()> {
        let repo = Repository::open(path)?;
        helpers::pull(&repo, remote)
    }
}
