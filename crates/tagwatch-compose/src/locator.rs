//! Manifest lookup inside a synced checkout

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// File name looked up when none is configured
pub const DEFAULT_MANIFEST_NAME: &str = "docker-compose.yml";

/// Finds the deployment manifest of a checkout.
pub trait ManifestLocator {
    /// Return the manifest path inside `checkout`, or
    /// [`Error::ManifestMissing`] when there is none.
    fn locate(&self, checkout: &Path) -> Result<PathBuf>;
}

/// Looks for a fixed file name at the checkout root.
#[derive(Debug, Clone)]
pub struct FileManifestLocator {
    file_name: String,
}

impl Default for FileManifestLocator {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_NAME)
    }
}

impl FileManifestLocator {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl ManifestLocator for FileManifestLocator {
    fn locate(&self, checkout: &Path) -> Result<PathBuf> {
        let path = checkout.join(&self.file_name);

        match path.metadata() {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(Error::ManifestMissing { path }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::ManifestMissing { path }),
            Err(e) => Err(Error::io(path, e)),
        }
    }
}
