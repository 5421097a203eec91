//! Watch files and version marker directories for test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

/// One `apps` entry of a watch file.
pub struct WatchEntry<'a> {
    pub name: &'a str,
    pub repository: &'a str,
    pub bucket: &'a str,
    pub frequency: &'a str,
}

/// Render a watch file for the given entries.
pub fn render_watch_file(entries: &[WatchEntry<'_>]) -> String {
    let mut out = String::from("apps:\n");
    for entry in entries {
        out.push_str(&format!(
            "  {}:\n    docker-compose-location: \"{}\"\n    version-bucket: \"{}\"\n    frequency: \"{}\"\n",
            entry.name, entry.repository, entry.bucket, entry.frequency
        ));
    }
    out
}

/// Write a watch file to `dir/watch.yml` and return its path.
pub fn write_watch_file(dir: &Path, entries: &[WatchEntry<'_>]) -> PathBuf {
    let path = dir.join("watch.yml");
    fs::write(&path, render_watch_file(entries)).unwrap();
    path
}

/// Publish `content` as the marker `root/bucket/object`, the layout read
/// by a directory-backed version source.
pub fn publish_marker(root: &Path, bucket: &str, object: &str, content: &str) {
    let dir = root.join(bucket);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(object), content).unwrap();
}
