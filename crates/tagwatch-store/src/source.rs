//! Version source trait and marker normalization

use crate::Result;

/// Reads the raw version marker for an application.
///
/// Every call is a fresh read of the remote object: implementations must
/// not retry or cache.
pub trait VersionSource {
    /// Read the object `object` from `bucket` and return its full contents.
    fn read(&self, bucket: &str, object: &str) -> Result<Vec<u8>>;
}

impl<T: VersionSource + ?Sized> VersionSource for Box<T> {
    fn read(&self, bucket: &str, object: &str) -> Result<Vec<u8>> {
        (**self).read(bucket, object)
    }
}

/// Convert raw marker bytes into the comparable version string.
///
/// Strips exactly one trailing `\n`. Invalid UTF-8 sequences are replaced
/// with U+FFFD.
pub fn normalize_version(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
