//! Tests for write probes, grant stores and the answer channel.

use super::*;
use crate::file_system::test_support::write_file;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Write probe
// ============================================================================

#[test]
fn test_probe_on_writable_directory_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let access = DirectAccess::new("WriteAccessCheck", Vec::new());

    assert!(access.has_write_access(dir.path()));
    assert!(entries(dir.path()).is_empty());
}

#[test]
fn test_probe_uses_nearest_existing_ancestor() {
    let dir = tempfile::tempdir().unwrap();
    let access = DirectAccess::new("WriteAccessCheck", Vec::new());

    assert!(access.has_write_access(&dir.path().join("not/yet/created")));
    assert!(!dir.path().join("not").exists());
}

#[test]
fn test_probe_skips_existing_marker_names() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("WriteAccessCheck0"), "user data");
    let access = DirectAccess::new("WriteAccessCheck", Vec::new());

    assert!(access.has_write_access(dir.path()));
    assert_eq!(entries(dir.path()), vec!["WriteAccessCheck0"]);
    assert_eq!(fs::read_to_string(dir.path().join("WriteAccessCheck0")).unwrap(), "user data");
}

#[test]
fn test_probe_refuses_restricted_roots() {
    let dir = tempfile::tempdir().unwrap();
    let card = dir.path().join("card");
    fs::create_dir(&card).unwrap();
    let access = DirectAccess::new("WriteAccessCheck", vec![card.clone()]);

    assert!(!access.has_write_access(&card));
    assert!(!access.has_write_access(&card.join("sub")));
    assert!(access.has_write_access(dir.path()));
}

#[tokio::test]
async fn test_direct_strategy_can_not_obtain_access() {
    let dir = tempfile::tempdir().unwrap();
    let strategy = AccessStrategy::Direct(DirectAccess::new("WriteAccessCheck", Vec::new()));

    assert!(!strategy.is_sandboxed());
    assert_eq!(strategy.request_write_access(dir.path()).await, AccessOutcome::Denied);
}

// ============================================================================
// Sandboxed access
// ============================================================================

struct NoConsent;

impl ConsentFlow for NoConsent {
    fn request(&self, _path: &Path, listener: AccessListener) {
        listener.denied();
    }
}

#[test]
fn test_grant_on_storage_root_covers_everything_below() {
    let dir = tempfile::tempdir().unwrap();
    let card = dir.path().join("card");
    fs::create_dir_all(card.join("music")).unwrap();
    let grants = Arc::new(MemoryGrantStore::new());
    let access = SandboxedAccess::new(
        grants.clone(),
        Arc::new(NoConsent),
        DirectAccess::new("WriteAccessCheck", vec![card.clone()]),
        vec![card.clone()],
    );
    assert!(!access.has_write_access(&card.join("music")));

    grants.persist(AccessGrant::new(card.clone(), GrantToken::new("t"))).unwrap();
    assert!(access.has_write_access(&card.join("music/not/yet")));

    grants.revoke(&card).unwrap();
    assert!(!access.has_write_access(&card.join("music")));
}

#[test]
fn test_read_only_grant_doesnt_count() {
    let dir = tempfile::tempdir().unwrap();
    let card = dir.path().join("card");
    fs::create_dir_all(&card).unwrap();
    let grants = Arc::new(MemoryGrantStore::new());
    let mut grant = AccessGrant::new(card.clone(), GrantToken::new("ro"));
    grant.writable = false;
    grants.persist(grant).unwrap();
    let access = SandboxedAccess::new(
        grants,
        Arc::new(NoConsent),
        DirectAccess::new("WriteAccessCheck", vec![card.clone()]),
        vec![card.clone()],
    );

    assert!(!access.has_write_access(&card));
}

// ============================================================================
// Grant stores
// ============================================================================

#[test]
fn test_find_prefers_the_closest_grant() {
    let store = MemoryGrantStore::new();
    store.persist(AccessGrant::new("/card", GrantToken::new("outer"))).unwrap();
    store.persist(AccessGrant::new("/card/music", GrantToken::new("inner"))).unwrap();

    assert_eq!(store.find(Path::new("/card/music/a.mp3")).unwrap().token.as_str(), "inner");
    assert_eq!(store.find(Path::new("/card/photos")).unwrap().token.as_str(), "outer");
    assert!(store.find(Path::new("/cardboard")).is_none());
}

#[test]
fn test_persist_replaces_grant_for_same_root() {
    let store = MemoryGrantStore::new();
    store.persist(AccessGrant::new("/card", GrantToken::new("old"))).unwrap();
    store.persist(AccessGrant::new("/card", GrantToken::new("new"))).unwrap();

    let grants = store.grants();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].token, GrantToken::new("new"));
}

#[test]
fn test_revoke() {
    let store = MemoryGrantStore::new();
    store.persist(AccessGrant::new("/card", GrantToken::new("t"))).unwrap();

    assert!(store.revoke(Path::new("/card")).unwrap());
    assert!(!store.revoke(Path::new("/card")).unwrap());
    assert!(store.grants().is_empty());
}

#[test]
fn test_json_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("nested/grants.json");

    let store = JsonGrantStore::open(&path).unwrap();
    assert!(store.grants().is_empty());
    store.persist(AccessGrant::new("/card", GrantToken::new("tree-1"))).unwrap();
    store.persist(AccessGrant::new("/usb", GrantToken::new("tree-2"))).unwrap();
    store.revoke(Path::new("/usb")).unwrap();
    drop(store);

    let reopened = JsonGrantStore::open(&path).unwrap();
    let grants = reopened.grants();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].root, PathBuf::from("/card"));
    assert_eq!(grants[0].token.as_str(), "tree-1");
    assert!(grants[0].writable);
    assert!(!dir.path().join("nested/grants.json.tmp").exists());
}

#[test]
fn test_json_store_keeps_memory_in_step_with_failed_saves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grants.json");
    let store = JsonGrantStore::open(&path).unwrap();
    store.persist(AccessGrant::new("/card", GrantToken::new("tree-1"))).unwrap();

    // A directory in place of the temp file makes every save fail
    fs::create_dir(dir.path().join("grants.json.tmp")).unwrap();

    let result = store.persist(AccessGrant::new("/usb", GrantToken::new("tree-2")));
    assert!(matches!(result, Err(GrantStoreError::Io { .. })));
    assert!(store.find(Path::new("/usb")).is_none());

    assert!(store.revoke(Path::new("/card")).is_err());
    assert_eq!(store.grants().len(), 1);
    assert_eq!(store.find(Path::new("/card/x")).unwrap().token.as_str(), "tree-1");
}

#[test]
fn test_json_store_file_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grants.json");
    fs::write(
        &path,
        r#"{"grants": [{"root": "/card", "token": "abc", "writable": false, "grantedAt": 1700000000}]}"#,
    )
    .unwrap();

    let store = JsonGrantStore::open(&path).unwrap();
    let grant = store.find(Path::new("/card/x")).unwrap();
    assert!(!grant.writable);
    assert_eq!(grant.granted_at, 1_700_000_000);
}

#[test]
fn test_json_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grants.json");
    fs::write(&path, "[1, 2").unwrap();

    assert!(matches!(JsonGrantStore::open(&path), Err(GrantStoreError::Parse { .. })));
}

// ============================================================================
// Answer channel
// ============================================================================

#[tokio::test]
async fn test_listener_delivers_one_answer() {
    let (listener, answer) = AccessListener::channel();
    listener.granted();
    assert_eq!(answer.await.unwrap(), AccessOutcome::Granted);
}

#[tokio::test]
async fn test_dropped_listener_closes_the_channel() {
    let (listener, answer) = AccessListener::channel();
    drop(listener);
    assert!(answer.await.is_err());
}

#[test]
fn test_answer_after_abandon_is_ignored() {
    let (listener, answer) = AccessListener::channel();
    drop(answer);
    listener.error();
}
