//! Reconcile scenarios over real components
//!
//! Manifest repositories are real git remotes synced with git2, version
//! markers live in a directory, and deployments are recorded instead of
//! reaching a container runtime.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tagwatch_compose::{DeployOutput, DeployRequest, DeploymentInvoker, FileManifestLocator};
use tagwatch_core::{
    AppOutcome, FailureKind, FailurePolicy, ReconcileSettings, Reconciler, WatchTarget,
    WatchTargetSet,
};
use tagwatch_git::{CloneOrPull, Git2Backend, SyncOutcome};
use tagwatch_store::LocalVersionSource;
use tagwatch_test_utils::git::{GitRemote, head_of};
use tagwatch_test_utils::watch::publish_marker;
use tempfile::TempDir;

const BUCKET: &str = "acme-versions";

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Deployer that records each request and never fails.
#[derive(Clone, Default)]
struct RecordingDeployer {
    requests: Rc<RefCell<Vec<DeployRequest>>>,
}

impl RecordingDeployer {
    fn tags(&self) -> Vec<(String, String)> {
        self.requests
            .borrow()
            .iter()
            .map(|r| (r.project.clone(), r.tag().unwrap_or_default().to_string()))
            .collect()
    }
}

impl DeploymentInvoker for RecordingDeployer {
    fn up(&self, request: &DeployRequest) -> tagwatch_compose::Result<DeployOutput> {
        assert!(request.manifest.is_file(), "deployed a missing manifest");
        self.requests.borrow_mut().push(request.clone());
        Ok(DeployOutput::default())
    }
}

/// A deployment host: version marker directory, state directory and a
/// reconciler wired to real git and manifest lookup.
struct Host {
    root: TempDir,
    deployer: RecordingDeployer,
    reconciler: Reconciler,
}

impl Host {
    fn new(policy: FailurePolicy) -> Self {
        let root = TempDir::new().unwrap();
        let deployer = RecordingDeployer::default();
        let settings = ReconcileSettings {
            state_dir: root.path().join("state"),
            policy,
            ..ReconcileSettings::default()
        };
        let reconciler = Reconciler::new(
            LocalVersionSource::new(root.path().join("versions")),
            CloneOrPull::new(Git2Backend::new()),
            FileManifestLocator::default(),
            deployer.clone(),
        )
        .with_settings(settings);

        Self {
            root,
            deployer,
            reconciler,
        }
    }

    fn publish(&self, app: &str, version: &str) {
        publish_marker(&self.root.path().join("versions"), BUCKET, app, version);
    }

    fn checkout(&self, app: &str) -> PathBuf {
        self.root.path().join("state").join(app)
    }
}

fn target(name: &str, remote: &GitRemote) -> WatchTarget {
    WatchTarget::new(name, remote.url(), BUCKET)
}

fn manifest_text(path: &Path) -> String {
    fs::read_to_string(path.join("docker-compose.yml")).unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_version_bump_redeploys_with_pulled_manifest() {
    let mut host = Host::new(FailurePolicy::AbortPass);
    let remote = GitRemote::with_manifest();
    let targets: WatchTargetSet = [target("svc1", &remote)].into_iter().collect();

    // Pass 1: first sight of the application clones and deploys.
    host.publish("svc1", "1.2.3\n");
    let report = host.reconciler.run_pass(&targets);
    assert!(report.is_success());
    match report.outcome("svc1") {
        Some(AppOutcome::Deployed {
            version,
            previous,
            sync,
        }) => {
            assert_eq!(version, "1.2.3");
            assert_eq!(previous, &None);
            assert_eq!(sync, &SyncOutcome::Cloned);
        }
        other => panic!("expected deploy, got {other:?}"),
    }
    assert_eq!(head_of(&host.checkout("svc1")), remote.head());

    // Pass 2: same marker, nothing happens.
    let report = host.reconciler.run_pass(&targets);
    assert!(matches!(
        report.outcome("svc1"),
        Some(AppOutcome::Unchanged { version }) if version == "1.2.3"
    ));

    // Pass 3: new version and a new manifest commit.
    let head = remote.commit_file(
        "docker-compose.yml",
        "services:\n  app:\n    image: \"example/app:${TAG}\"\n    ports: [\"8080:80\"]\n",
        "Expose port",
    );
    host.publish("svc1", "1.3.0\n");
    let report = host.reconciler.run_pass(&targets);
    match report.outcome("svc1") {
        Some(AppOutcome::Deployed { previous, sync, .. }) => {
            assert_eq!(previous.as_deref(), Some("1.2.3"));
            assert_eq!(sync, &SyncOutcome::Pulled);
        }
        other => panic!("expected deploy, got {other:?}"),
    }
    assert_eq!(head_of(&host.checkout("svc1")), head);
    assert!(manifest_text(&host.checkout("svc1")).contains("8080:80"));

    assert_eq!(
        host.deployer.tags(),
        vec![
            ("svc1".to_string(), "1.2.3".to_string()),
            ("svc1".to_string(), "1.3.0".to_string()),
        ]
    );
    assert_eq!(host.reconciler.last_seen("svc1"), "1.3.0");
}

#[test]
fn test_version_bump_without_manifest_change() {
    let mut host = Host::new(FailurePolicy::AbortPass);
    let remote = GitRemote::with_manifest();
    let targets: WatchTargetSet = [target("svc1", &remote)].into_iter().collect();

    host.publish("svc1", "1.0.0");
    host.reconciler.run_pass(&targets);
    host.publish("svc1", "1.0.1");
    let report = host.reconciler.run_pass(&targets);

    assert!(matches!(
        report.outcome("svc1"),
        Some(AppOutcome::Deployed { sync: SyncOutcome::AlreadyUpToDate, .. })
    ));
    assert_eq!(host.deployer.tags().len(), 2);
}

#[test]
fn test_repository_without_manifest_is_not_deployed() {
    let mut host = Host::new(FailurePolicy::AbortPass);
    let remote = GitRemote::new();
    remote.commit_file("README.md", "# deploy\n", "Initial commit");
    let targets: WatchTargetSet = [target("svc1", &remote)].into_iter().collect();

    host.publish("svc1", "1.0.0");
    let report = host.reconciler.run_pass(&targets);

    match report.outcome("svc1") {
        Some(AppOutcome::Failed(failure)) => {
            assert_eq!(failure.kind, FailureKind::ManifestMissing);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(host.deployer.tags().is_empty());
    assert_eq!(host.reconciler.last_seen("svc1"), "");

    // Fixing the repository lets the same version through on the next pass.
    remote.commit_file(
        "docker-compose.yml",
        tagwatch_test_utils::git::COMPOSE_MANIFEST,
        "Add manifest",
    );
    let report = host.reconciler.run_pass(&targets);
    assert!(report.is_success());
    assert_eq!(
        host.deployer.tags(),
        vec![("svc1".to_string(), "1.0.0".to_string())]
    );
}

#[test]
fn test_abort_policy_skips_remaining_applications() {
    let mut host = Host::new(FailurePolicy::AbortPass);
    let first = GitRemote::with_manifest();
    let second = GitRemote::with_manifest();
    let targets: WatchTargetSet = [target("alpha", &first), target("beta", &second)]
        .into_iter()
        .collect();

    // alpha has no marker published.
    host.publish("beta", "2.0.0");
    let report = host.reconciler.run_pass(&targets);

    assert!(report.aborted);
    assert_eq!(report.outcomes.len(), 1);
    assert!(matches!(
        report.outcome("alpha"),
        Some(AppOutcome::Failed(f)) if f.kind == FailureKind::VersionRead
    ));
    assert!(!host.checkout("beta").exists());
}

#[test]
fn test_continue_policy_reconciles_every_application() {
    let mut host = Host::new(FailurePolicy::Continue);
    let first = GitRemote::with_manifest();
    let second = GitRemote::with_manifest();
    let targets: WatchTargetSet = [target("alpha", &first), target("beta", &second)]
        .into_iter()
        .collect();

    host.publish("beta", "2.0.0");
    let report = host.reconciler.run_pass(&targets);

    assert!(!report.aborted);
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.deployed(), 1);
    assert_eq!(
        host.deployer.tags(),
        vec![("beta".to_string(), "2.0.0".to_string())]
    );
}

#[test]
fn test_unreachable_repository_is_a_sync_failure() {
    let mut host = Host::new(FailurePolicy::AbortPass);
    let missing = host.root.path().join("no-such-remote");
    let targets: WatchTargetSet = [WatchTarget::new(
        "svc1",
        missing.to_string_lossy(),
        BUCKET,
    )]
    .into_iter()
    .collect();

    host.publish("svc1", "1.0.0");
    let report = host.reconciler.run_pass(&targets);

    assert!(matches!(
        report.outcome("svc1"),
        Some(AppOutcome::Failed(f)) if f.kind == FailureKind::RepositorySync
    ));
    assert_eq!(host.reconciler.last_seen("svc1"), "");
}
