use std::fs;

use pretty_assertions::assert_eq;
use tagwatch_store::{Error, LocalVersionSource, VersionSource, normalize_version};
use tempfile::TempDir;

fn source_with_marker(bucket: &str, object: &str, content: &[u8]) -> (TempDir, LocalVersionSource) {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join(bucket);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(object), content).unwrap();
    let source = LocalVersionSource::new(temp.path());
    (temp, source)
}

#[test]
fn test_reads_raw_bytes() {
    let (_temp, source) = source_with_marker("v-bucket", "svc1", b"1.2.3\n");
    let raw = source.read("v-bucket", "svc1").unwrap();
    assert_eq!(raw, b"1.2.3\n".to_vec());
    assert_eq!(normalize_version(&raw), "1.2.3");
}

#[test]
fn test_each_read_is_fresh() {
    let (temp, source) = source_with_marker("v-bucket", "svc1", b"1.2.3\n");
    assert_eq!(source.read("v-bucket", "svc1").unwrap(), b"1.2.3\n".to_vec());

    fs::write(temp.path().join("v-bucket/svc1"), b"1.2.4\n").unwrap();
    assert_eq!(source.read("v-bucket", "svc1").unwrap(), b"1.2.4\n".to_vec());
}

#[test]
fn test_missing_object_is_not_found() {
    let (_temp, source) = source_with_marker("v-bucket", "svc1", b"1.2.3\n");
    let err = source.read("v-bucket", "svc2").unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("gs://v-bucket/svc2"));
}

#[test]
fn test_missing_bucket_is_not_found() {
    let temp = TempDir::new().unwrap();
    let source = LocalVersionSource::new(temp.path());
    let err = source.read("nope", "svc1").unwrap_err();
    assert!(matches!(err, Error::NotFound { ref bucket, .. } if bucket == "nope"));
}

#[test]
fn test_directory_in_place_of_object_is_io_error() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("v-bucket/svc1")).unwrap();
    let source = LocalVersionSource::new(temp.path());

    let err = source.read("v-bucket", "svc1").unwrap_err();
    assert!(!err.is_not_found(), "expected an I/O error, got: {err}");
}
