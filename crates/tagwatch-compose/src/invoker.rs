//! Deployment invocation
//!
//! Wraps the orchestration tool's "up" command as a subprocess, passing
//! variables through the environment so the manifest can interpolate them
//! (`image: "example/app:${TAG}"`).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use crate::{Error, Result};

/// Variable carrying the version to deploy
pub const TAG_VARIABLE: &str = "TAG";

/// A request to bring up the services of one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Compose project name
    pub project: String,
    /// Path to the manifest file
    pub manifest: PathBuf,
    /// Variables exported to the orchestration tool
    pub variables: BTreeMap<String, String>,
}

impl DeployRequest {
    pub fn new(project: impl Into<String>, manifest: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            manifest: manifest.into(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// The version being deployed, if one was set.
    pub fn tag(&self) -> Option<&str> {
        self.variables.get(TAG_VARIABLE).map(String::as_str)
    }
}

/// Captured output of a successful deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOutput {
    pub stdout: String,
    pub stderr: String,
}

impl DeployOutput {
    /// stdout followed by stderr, for logging.
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{out}\n{err}"),
        }
    }
}

/// Applies a manifest with variables.
pub trait DeploymentInvoker {
    /// Bring up every service of `request.manifest` in the background.
    fn up(&self, request: &DeployRequest) -> Result<DeployOutput>;
}

/// [`DeploymentInvoker`] running a compose CLI.
///
/// Invokes `<program> [base args] -f <manifest> -p <project> up -d`.
#[derive(Debug, Clone)]
pub struct ComposeInvoker {
    program: String,
    base_args: Vec<String>,
}

impl Default for ComposeInvoker {
    fn default() -> Self {
        Self::with_command("docker-compose", Vec::<String>::new())
    }
}

impl ComposeInvoker {
    /// The standalone `docker-compose` binary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The `docker compose` CLI plugin.
    pub fn docker_compose_plugin() -> Self {
        Self::with_command("docker", ["compose"])
    }

    /// Any compose-compatible command.
    pub fn with_command<I, S>(program: impl Into<String>, base_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            base_args: base_args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for a request.
    pub fn args(&self, request: &DeployRequest) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push("-f".into());
        args.push(request.manifest.to_string_lossy().into_owned());
        args.push("-p".into());
        args.push(request.project.clone());
        args.push("up".into());
        args.push("-d".into());
        args
    }
}

impl DeploymentInvoker for ComposeInvoker {
    fn up(&self, request: &DeployRequest) -> Result<DeployOutput> {
        let args = self.args(request);
        tracing::info!(
            program = %self.program,
            args = ?args,
            tag = ?request.tag(),
            "Bringing services up"
        );

        let output = Command::new(&self.program)
            .args(&args)
            .envs(&request.variables)
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(DeployOutput { stdout, stderr })
        } else {
            let code = output.status.code().unwrap_or(-1);
            Err(Error::CommandFailed {
                program: self.program.clone(),
                code,
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> DeployRequest {
        DeployRequest::new("svc1", "tmp/svc1/docker-compose.yml").with_variable(TAG_VARIABLE, "1.2.3")
    }

    #[test]
    fn test_docker_compose_args() {
        let args = ComposeInvoker::new().args(&request());
        assert_eq!(
            args,
            vec!["-f", "tmp/svc1/docker-compose.yml", "-p", "svc1", "up", "-d"]
        );
    }

    #[test]
    fn test_plugin_args_prefix_compose() {
        let invoker = ComposeInvoker::docker_compose_plugin();
        assert_eq!(invoker.program(), "docker");
        assert_eq!(invoker.args(&request())[..3], ["compose", "-f", "tmp/svc1/docker-compose.yml"]);
    }

    #[test]
    fn test_request_tag() {
        assert_eq!(request().tag(), Some("1.2.3"));
        assert_eq!(DeployRequest::new("svc1", "m.yml").tag(), None);
    }

    #[test]
    fn test_combined_output() {
        let output = DeployOutput {
            stdout: "started\n".into(),
            stderr: "Creating svc1_app_1 ... done\n".into(),
        };
        assert_eq!(output.combined(), "started\nCreating svc1_app_1 ... done");
        assert_eq!(DeployOutput::default().combined(), "");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let invoker = ComposeInvoker::with_command("tagwatch-no-such-compose-binary", Vec::<String>::new());
        let err = invoker.up(&request()).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }), "got: {err}");
    }
}
