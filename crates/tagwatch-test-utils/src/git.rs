//! Git repositories that act as manifest remotes.
//!
//! Built with the `git` CLI so fixtures do not depend on the code under test.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Default compose manifest contents used by [`GitRemote::with_manifest`].
pub const COMPOSE_MANIFEST: &str = "services:\n  app:\n    image: \"example/app:${TAG}\"\n";

/// Run `git <args>` in `dir`, panicking with stderr on failure.
///
/// # Panics
/// Panics if git cannot be spawned or exits unsuccessfully.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed in {}:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A non-bare repository on branch `main` that other repositories clone from.
///
/// Realism level: **REAL WITH HISTORY**: valid git state, `main` branch,
/// one commit per call to [`GitRemote::commit_file`].
pub struct GitRemote {
    temp_dir: TempDir,
}

impl Default for GitRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRemote {
    /// Initialise an empty-history repository with a configured identity.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        git(root, &["init"]);
        git(root, &["config", "user.email", "test@test.com"]);
        git(root, &["config", "user.name", "Test User"]);
        git(root, &["config", "commit.gpgsign", "false"]);
        // Pin the branch name regardless of init.defaultBranch
        git(root, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        Self { temp_dir }
    }

    /// A remote whose first commit contains `docker-compose.yml`.
    pub fn with_manifest() -> Self {
        let remote = Self::new();
        remote.commit_file("docker-compose.yml", COMPOSE_MANIFEST, "Add compose manifest");
        remote
    }

    /// Root path of the repository.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// URL other repositories clone from (a local path).
    pub fn url(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    /// Write `name` with `content` and commit it. Returns the new HEAD id.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> String {
        let file = self.path().join(name);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&file, content).unwrap();
        git(self.path(), &["add", name]);
        git(self.path(), &["commit", "-m", message]);
        self.head()
    }

    /// Current HEAD commit id.
    pub fn head(&self) -> String {
        git(self.path(), &["rev-parse", "HEAD"])
    }
}

/// HEAD commit id of any checkout.
pub fn head_of(path: &Path) -> String {
    git(path, &["rev-parse", "HEAD"])
}

