//! Shared git2 helper functions
//!
//! These functions encapsulate the git2 patterns behind clone and pull.

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, RemoteCallbacks, Repository};

use crate::{Error, Result};

/// Get the current branch name from a repository.
///
/// Returns the branch name if HEAD points to a branch, or `None` if HEAD is detached.
pub fn get_current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = repo.head()?;

    if head.is_branch() {
        Ok(Some(head.shorthand().unwrap_or("HEAD").to_string()))
    } else {
        Ok(None)
    }
}

/// Fetch options that report transfer progress through tracing.
fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(|progress| {
        tracing::trace!(
            received = progress.received_objects(),
            total = progress.total_objects(),
            bytes = progress.received_bytes(),
            "Transfer progress"
        );
        true
    });

    let mut opts = FetchOptions::new();
    opts.remote_callbacks(callbacks);
    opts
}

/// Clone `url` into `path`, checking out the remote's default branch.
pub fn clone(url: &str, path: &Path) -> Result<Repository> {
    RepoBuilder::new()
        .fetch_options(fetch_options())
        .clone(url, path)
        .map_err(|e| Error::CloneFailed {
            url: url.to_string(),
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
}

/// Pull the current branch from `remote_name` using fetch + fast-forward.
///
/// Returns [`Error::AlreadyUpToDate`] when the fetched commit is already
/// contained in the local branch.
///
/// # Arguments
/// * `repo` - The repository to pull into (must have a working tree)
/// * `remote_name` - Remote to fetch from, usually "origin"
pub fn pull(repo: &Repository, remote_name: &str) -> Result<()> {
    let workdir = repo.workdir().ok_or_else(|| Error::BareRepository {
        path: repo.path().to_path_buf(),
    })?;

    let branch_name = get_current_branch(repo)?.ok_or_else(|| Error::DetachedHead {
        path: workdir.to_path_buf(),
    })?;

    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    remote
        .fetch(&[branch_name.as_str()], Some(&mut fetch_options()), None)
        .map_err(|e| Error::PullFailed {
            message: format!("Fetch failed: {}", e.message()),
        })?;

    let fetch_head = repo
        .find_reference("FETCH_HEAD")
        .map_err(|e| Error::PullFailed {
            message: format!("Could not find FETCH_HEAD: {}", e.message()),
        })?;

    let fetch_commit = fetch_head.peel_to_commit().map_err(|e| Error::PullFailed {
        message: format!("Could not resolve FETCH_HEAD: {}", e.message()),
    })?;

    let head_commit = repo.head()?.peel_to_commit()?;

    let (merge_analysis, _) =
        repo.merge_analysis(&[&repo.find_annotated_commit(fetch_commit.id())?])?;

    if merge_analysis.is_up_to_date() {
        return Err(Error::AlreadyUpToDate);
    }

    if merge_analysis.is_fast_forward() {
        let refname = format!("refs/heads/{}", branch_name);
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(
            fetch_commit.id(),
            &format!("pull: fast-forward to {}", fetch_commit.id()),
        )?;

        repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
        tracing::debug!(
            branch = %branch_name,
            from = %head_commit.id(),
            to = %fetch_commit.id(),
            "Fast-forwarded"
        );
        return Ok(());
    }

    Err(Error::CannotFastForward {
        message: format!(
            "Cannot fast-forward {} from {} to {}. Manual merge required.",
            branch_name,
            head_commit.id(),
            fetch_commit.id()
        ),
    })
}
