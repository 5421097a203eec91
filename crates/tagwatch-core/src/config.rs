//! Watch file loading and validation
//!
//! The watch file maps application names to where their manifest and
//! version marker live:
//!
//! ```yaml
//! apps:
//!   svc1:
//!     docker-compose-location: https://github.com/acme/svc1-deploy.git
//!     version-bucket: v-bucket
//!     frequency: 5m
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One `apps` entry as written in the watch file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    /// URL of the repository holding the compose manifest
    #[serde(rename = "docker-compose-location")]
    pub manifest_repository: String,

    /// Bucket holding the version marker (object name = application name)
    #[serde(rename = "version-bucket")]
    pub version_bucket: String,

    /// Polling frequency, carried verbatim
    #[serde(default)]
    pub frequency: String,
}

/// Parsed watch file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchFile {
    #[serde(default)]
    pub apps: BTreeMap<String, AppEntry>,
}

impl WatchFile {
    /// Parse a watch file from YAML content.
    ///
    /// Only checks the shape; use [`WatchFile::into_targets`] to validate.
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Validate every entry and build the target set.
    pub fn into_targets(self) -> Result<WatchTargetSet> {
        if self.apps.is_empty() {
            return Err(Error::invalid_config("no applications under `apps`"));
        }

        let mut targets = WatchTargetSet::new();
        for (name, entry) in self.apps {
            targets.insert(WatchTarget::from_entry(name, entry)?)?;
        }
        Ok(targets)
    }
}

/// Load and validate a watch file from disk.
pub fn load_watch_file(path: &Path) -> Result<WatchTargetSet> {
    let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let file = WatchFile::parse(&content).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let targets = file.into_targets()?;
    tracing::debug!(path = %path.display(), apps = targets.len(), "Loaded watch file");
    Ok(targets)
}

/// Check that an application name is usable as a directory and object name.
///
/// Names must be a single, non-empty path component.
pub fn validate_app_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name cannot be `.` or `..`")
    } else if name.contains(['/', '\\']) {
        Some("name cannot contain path separators")
    } else if name.contains('\0') {
        Some("name cannot contain NUL")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::invalid_config(format!(
            "application `{}`: {reason}",
            name.escape_debug()
        ))),
        None => Ok(()),
    }
}

/// One watched application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    /// Unique application name; also the version marker's object name and
    /// the checkout directory name
    pub name: String,
    /// Repository holding the compose manifest
    pub manifest_repository: String,
    /// Bucket holding the version marker
    pub version_bucket: String,
    /// Polling frequency, informational only
    pub frequency: String,
}

impl WatchTarget {
    pub fn new(
        name: impl Into<String>,
        manifest_repository: impl Into<String>,
        version_bucket: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            manifest_repository: manifest_repository.into(),
            version_bucket: version_bucket.into(),
            frequency: String::new(),
        }
    }

    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = frequency.into();
        self
    }

    fn from_entry(name: String, entry: AppEntry) -> Result<Self> {
        let target = Self {
            name,
            manifest_repository: entry.manifest_repository.trim().to_string(),
            version_bucket: entry.version_bucket.trim().to_string(),
            frequency: entry.frequency,
        };
        target.validate()?;
        Ok(target)
    }

    /// Check the target is complete enough to reconcile.
    pub fn validate(&self) -> Result<()> {
        validate_app_name(&self.name)?;
        if self.manifest_repository.is_empty() {
            return Err(Error::invalid_config(format!(
                "application `{}`: docker-compose-location is empty",
                self.name
            )));
        }
        if self.version_bucket.is_empty() {
            return Err(Error::invalid_config(format!(
                "application `{}`: version-bucket is empty",
                self.name
            )));
        }
        Ok(())
    }
}

/// All watched applications, keyed by name.
///
/// Iterates in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchTargetSet {
    targets: BTreeMap<String, WatchTarget>,
}

impl WatchTargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validated target. Names must be unique.
    pub fn insert(&mut self, target: WatchTarget) -> Result<()> {
        target.validate()?;
        if self.targets.contains_key(&target.name) {
            return Err(Error::invalid_config(format!(
                "application `{}` is defined twice",
                target.name
            )));
        }
        self.targets.insert(target.name.clone(), target);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&WatchTarget> {
        self.targets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchTarget> {
        self.targets.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl FromIterator<WatchTarget> for WatchTargetSet {
    /// Collect targets; later duplicates replace earlier ones.
    fn from_iter<I: IntoIterator<Item = WatchTarget>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }
}
