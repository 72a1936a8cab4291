//! Destination Integration Tests
//!
//! Tests for purging, directory creation and artifact lookup.

use mkjars::core::sha256_file;
use mkjars::{Destination, NameMatcher};
use tempfile::TempDir;

const RUNTIME_JAR: &str = "rattlesnake-runtime-0.2.0-snapshot.jar";

#[tokio::test]
async fn test_purge_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let dest = Destination::new(temp.path());
    std::fs::write(temp.path().join(RUNTIME_JAR), b"stale").unwrap();

    assert!(dest.purge_stale(RUNTIME_JAR).await.unwrap());
    assert!(!dest.purge_stale(RUNTIME_JAR).await.unwrap());
    assert!(!temp.path().join(RUNTIME_JAR).exists());
}

#[tokio::test]
async fn test_purge_in_missing_destination() {
    let temp = TempDir::new().unwrap();
    let dest = Destination::new(temp.path().join("jars"));

    assert!(!dest.purge_stale(RUNTIME_JAR).await.unwrap());
}

#[tokio::test]
async fn test_ensure_exists_is_noop_for_existing_dir() {
    let temp = TempDir::new().unwrap();
    let dest = Destination::new(temp.path());
    std::fs::write(temp.path().join("keep.jar"), b"keep").unwrap();

    dest.ensure_exists().await.unwrap();

    assert_eq!(std::fs::read(temp.path().join("keep.jar")).unwrap(), b"keep");
}

#[tokio::test]
async fn test_no_match_leaves_destination_unchanged() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    let jars = temp.path().join("jars");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::create_dir_all(&jars).unwrap();
    std::fs::write(target.join("runtime-1.0.jar"), b"thin").unwrap();

    let dest = Destination::new(&jars);
    let copied = dest
        .locate_and_copy(
            "runtime",
            &target,
            &NameMatcher::suffix("with-dependencies.jar"),
            RUNTIME_JAR,
        )
        .await
        .unwrap();

    assert!(copied.is_empty());
    assert_eq!(std::fs::read_dir(&jars).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_search_dir_is_silent() {
    let temp = TempDir::new().unwrap();
    let dest = Destination::new(temp.path());

    let copied = dest
        .locate_and_copy(
            "compiler",
            &temp.path().join("no-such-target"),
            &NameMatcher::prefix("Rattlesnake-assembly"),
            "rattlesnake-compiler-0.2.0-snapshot.jar",
        )
        .await
        .unwrap();

    assert!(copied.is_empty());
}

#[tokio::test]
async fn test_single_match_copied_with_identical_content() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    let jars = temp.path().join("jars");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::create_dir_all(&jars).unwrap();
    let source = target.join("foo-with-dependencies.jar");
    std::fs::write(&source, b"PK\x03\x04 jar bytes").unwrap();

    let dest = Destination::new(&jars);
    let copied = dest
        .locate_and_copy(
            "runtime",
            &target,
            &NameMatcher::suffix("with-dependencies.jar"),
            RUNTIME_JAR,
        )
        .await
        .unwrap();

    assert_eq!(copied.len(), 1);
    assert_eq!(std::fs::read_dir(&jars).unwrap().count(), 1);
    assert_eq!(
        std::fs::read(jars.join(RUNTIME_JAR)).unwrap(),
        std::fs::read(&source).unwrap()
    );
    assert_eq!(copied[0].source, source);
    assert_eq!(copied[0].size_bytes, 14);
    assert_eq!(copied[0].sha256, sha256_file(&source).await.unwrap());
}

#[tokio::test]
async fn test_multiple_matches_last_one_wins() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("a-with-dependencies.jar"), b"a").unwrap();
    std::fs::write(target.join("b-with-dependencies.jar"), b"b").unwrap();

    let dest = Destination::new(temp.path());
    let copied = dest
        .locate_and_copy(
            "agent",
            &target,
            &NameMatcher::suffix("with-dependencies.jar"),
            "rattlesnake-agent-0.2.0-snapshot.jar",
        )
        .await
        .unwrap();

    assert_eq!(copied.len(), 2);
    assert_eq!(
        std::fs::read(temp.path().join("rattlesnake-agent-0.2.0-snapshot.jar")).unwrap(),
        b"b"
    );
}
