//! Directory-backed version source

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result, VersionSource};

/// Reads version markers from `<root>/<bucket>/<object>`.
///
/// Mirrors a bucket layout on local disk, e.g. a synced copy of the
/// remote store or a fixture directory in tests.
#[derive(Debug, Clone)]
pub struct LocalVersionSource {
    root: PathBuf,
}

impl LocalVersionSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, object: &str) -> PathBuf {
        self.root.join(bucket).join(object)
    }
}

impl VersionSource for LocalVersionSource {
    fn read(&self, bucket: &str, object: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, object);
        tracing::debug!(path = %path.display(), "Reading version marker");

        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            }),
            Err(e) => Err(Error::io(path, e)),
        }
    }
}
