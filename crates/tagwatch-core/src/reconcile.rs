//! The reconcile pass
//!
//! For every watched application:
//!
//! ```text
//! Idle -> Checking -+-> Unchanged
//!                   +-> Syncing -> Locating -> Deploying -> Done
//! (any step) -> Failed
//! ```
//!
//! The last version deployed per application is remembered in memory for
//! the lifetime of the [`Reconciler`]; a fresh process therefore deploys
//! every application once on its first pass.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tagwatch_compose::{
    ComposeInvoker, DEFAULT_MANIFEST_NAME, DeployRequest, DeploymentInvoker, FileManifestLocator,
    ManifestLocator, TAG_VARIABLE,
};
use tagwatch_git::{CloneOrPull, DEFAULT_REMOTE, Git2Backend, RepositorySync, SyncOutcome};
use tagwatch_store::{VersionSource, normalize_version};

use crate::config::{WatchTarget, WatchTargetSet};
use crate::{Error, Result};

/// Directory holding one checkout per application
pub const DEFAULT_STATE_DIR: &str = "tmp";

/// What to do with the rest of a pass once an application fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure; remaining applications are not checked
    #[default]
    AbortPass,
    /// Keep reconciling the remaining applications and report every failure
    Continue,
}

/// Knobs for a [`Reconciler`] and the standard components it builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Parent directory of the per-application checkouts
    pub state_dir: PathBuf,
    /// Manifest file name inside each checkout
    pub manifest_name: String,
    /// Remote pulled from
    pub remote_name: String,
    /// Behaviour after a failed application
    pub policy: FailurePolicy,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            remote_name: DEFAULT_REMOTE.to_string(),
            policy: FailurePolicy::default(),
        }
    }
}

/// The step an application failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Reading the version marker
    VersionRead,
    /// Cloning or pulling the manifest repository
    RepositorySync,
    /// The checkout has no manifest; the application is misconfigured
    ManifestMissing,
    /// The manifest could not be checked for another reason
    ManifestLookup,
    /// The orchestration tool failed
    Deploy,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::VersionRead => "version read",
            FailureKind::RepositorySync => "repository sync",
            FailureKind::ManifestMissing => "manifest check",
            FailureKind::ManifestLookup => "manifest lookup",
            FailureKind::Deploy => "deploy",
        };
        f.write_str(s)
    }
}

/// A failed application with the error that stopped it.
#[derive(Debug)]
pub struct AppFailure {
    pub kind: FailureKind,
    pub error: Error,
}

impl AppFailure {
    pub fn new(kind: FailureKind, error: impl Into<Error>) -> Self {
        Self {
            kind,
            error: error.into(),
        }
    }
}

/// Result of reconciling one application.
#[derive(Debug)]
pub enum AppOutcome {
    /// The marker matched the last deployed version; nothing was touched
    Unchanged { version: String },
    /// The new version was synced and brought up
    Deployed {
        version: String,
        previous: Option<String>,
        sync: SyncOutcome,
    },
    /// A step failed; the last deployed version is unchanged
    Failed(AppFailure),
}

impl AppOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, AppOutcome::Failed(_))
    }
}

/// Ordered outcomes of one pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// `(application name, outcome)` in processing order
    pub outcomes: Vec<(String, AppOutcome)>,
    /// Whether the pass stopped early under [`FailurePolicy::AbortPass`]
    pub aborted: bool,
}

impl PassReport {
    /// No application failed.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &AppFailure)> {
        self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
            AppOutcome::Failed(failure) => Some((name.as_str(), failure)),
            _ => None,
        })
    }

    pub fn deployed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, AppOutcome::Deployed { .. }))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, AppOutcome::Unchanged { .. }))
            .count()
    }

    pub fn outcome(&self, name: &str) -> Option<&AppOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    /// Collapse into the first failure, if any.
    pub fn into_result(self) -> Result<()> {
        for (name, outcome) in self.outcomes {
            if let AppOutcome::Failed(AppFailure { kind, error }) = outcome {
                return Err(Error::Application {
                    name,
                    kind,
                    source: Box::new(error),
                });
            }
        }
        Ok(())
    }
}

/// Runs reconcile passes and remembers what each application last deployed.
pub struct Reconciler {
    source: Box<dyn VersionSource>,
    sync: Box<dyn RepositorySync>,
    locator: Box<dyn ManifestLocator>,
    deployer: Box<dyn DeploymentInvoker>,
    settings: ReconcileSettings,
    last_seen: HashMap<String, String>,
}

impl Reconciler {
    /// Build a reconciler from its four capabilities with default settings.
    pub fn new(
        source: impl VersionSource + 'static,
        sync: impl RepositorySync + 'static,
        locator: impl ManifestLocator + 'static,
        deployer: impl DeploymentInvoker + 'static,
    ) -> Self {
        Self {
            source: Box::new(source),
            sync: Box::new(sync),
            locator: Box::new(locator),
            deployer: Box::new(deployer),
            settings: ReconcileSettings::default(),
            last_seen: HashMap::new(),
        }
    }

    /// libgit2 sync and file-name manifest lookup configured from `settings`.
    pub fn standard(
        source: impl VersionSource + 'static,
        deployer: ComposeInvoker,
        settings: ReconcileSettings,
    ) -> Self {
        let sync = CloneOrPull::with_remote(Git2Backend::new(), settings.remote_name.clone());
        let locator = FileManifestLocator::new(settings.manifest_name.clone());
        Self::new(source, sync, locator, deployer).with_settings(settings)
    }

    pub fn with_settings(mut self, settings: ReconcileSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    /// Last version deployed for `name`; empty before the first deploy.
    pub fn last_seen(&self, name: &str) -> &str {
        self.last_seen.get(name).map(String::as_str).unwrap_or("")
    }

    /// Local checkout directory of an application.
    pub fn checkout_path(&self, name: &str) -> PathBuf {
        self.settings.state_dir.join(name)
    }

    /// Reconcile every target once, in name order.
    pub fn run_pass(&mut self, targets: &WatchTargetSet) -> PassReport {
        let span = tracing::info_span!("pass", apps = targets.len());
        let _enter = span.enter();

        let mut report = PassReport::default();
        for target in targets.iter() {
            let outcome = self.reconcile(target);
            let failed = outcome.is_failure();
            report.outcomes.push((target.name.clone(), outcome));

            if failed && self.settings.policy == FailurePolicy::AbortPass {
                report.aborted = true;
                let remaining = targets.len() - report.outcomes.len();
                if remaining > 0 {
                    tracing::warn!(app = %target.name, remaining, "Aborting pass after failure");
                }
                break;
            }
        }

        tracing::info!(
            deployed = report.deployed(),
            unchanged = report.unchanged(),
            failed = report.failures().count(),
            "Pass complete"
        );
        report
    }

    /// Reconcile a single application.
    pub fn reconcile(&mut self, target: &WatchTarget) -> AppOutcome {
        let span = tracing::info_span!("app", app = %target.name);
        let _enter = span.enter();

        tracing::info!(bucket = %target.version_bucket, "Checking for latest version");
        let raw = match self.source.read(&target.version_bucket, &target.name) {
            Ok(raw) => raw,
            Err(e) => return self.fail(AppFailure::new(FailureKind::VersionRead, e)),
        };
        let version = normalize_version(&raw);

        let last_seen = self.last_seen(&target.name);
        if version == last_seen {
            tracing::info!(version = %version, "No new updates");
            return AppOutcome::Unchanged { version };
        }
        let previous = (!last_seen.is_empty()).then(|| last_seen.to_string());
        tracing::info!(version = %version, previous = ?previous, "New version detected");

        match self.deploy(target, &version) {
            Ok(sync) => {
                self.last_seen.insert(target.name.clone(), version.clone());
                tracing::info!(version = %version, "Deployed");
                AppOutcome::Deployed {
                    version,
                    previous,
                    sync,
                }
            }
            Err(failure) => self.fail(failure),
        }
    }

    fn fail(&self, failure: AppFailure) -> AppOutcome {
        tracing::error!(kind = %failure.kind, error = %failure.error, "Reconcile failed");
        AppOutcome::Failed(failure)
    }

    /// Sync, locate, deploy. Stops at the first failing step.
    fn deploy(
        &self,
        target: &WatchTarget,
        version: &str,
    ) -> std::result::Result<SyncOutcome, AppFailure> {
        let checkout = self.checkout_path(&target.name);

        let sync = self
            .sync
            .sync(&checkout, &target.manifest_repository)
            .map_err(|e| AppFailure::new(FailureKind::RepositorySync, e))?;
        tracing::debug!(outcome = %sync, path = %checkout.display(), "Repository synced");

        let manifest = self.locate(&checkout)?;

        let request =
            DeployRequest::new(&target.name, manifest).with_variable(TAG_VARIABLE, version);
        let output = self
            .deployer
            .up(&request)
            .map_err(|e| AppFailure::new(FailureKind::Deploy, e))?;

        let combined = output.combined();
        if !combined.is_empty() {
            tracing::info!(output = %combined, "Compose output");
        }
        Ok(sync)
    }

    fn locate(&self, checkout: &Path) -> std::result::Result<PathBuf, AppFailure> {
        self.locator.locate(checkout).map_err(|e| {
            let kind = if e.is_manifest_missing() {
                FailureKind::ManifestMissing
            } else {
                FailureKind::ManifestLookup
            };
            AppFailure::new(kind, e)
        })
    }
}
