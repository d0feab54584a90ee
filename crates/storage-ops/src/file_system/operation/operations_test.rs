//! Tests for the concrete operations, against both volumes.

use super::*;
use crate::config::EngineConfig;
use crate::file_system::access::{AccessGrant, AccessGrantStore, GrantToken, MemoryGrantStore};
use crate::file_system::events::OperationEvent;
use crate::file_system::test_support::{FlakyVolume, RecordingIndex, RecordingObserver, RecordingProgress, write_file};
use crate::file_system::types::FileHandle;
use crate::file_system::volume::DirectVolume;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// `card/` refuses raw writes and is covered by a grant; `home/` is plain storage.
struct Fixture {
    _dir: tempfile::TempDir,
    card: PathBuf,
    home: PathBuf,
    env: OperationEnv,
    index: Arc<RecordingIndex>,
    observer: Arc<RecordingObserver>,
    progress: Arc<RecordingProgress>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let card = dir.path().join("card");
        let home = dir.path().join("home");
        fs::create_dir_all(&card).unwrap();
        fs::create_dir_all(&home).unwrap();

        let grants = Arc::new(MemoryGrantStore::new());
        grants
            .persist(AccessGrant::new(card.clone(), GrantToken::new("card")))
            .unwrap();
        let config = EngineConfig {
            sandboxed_roots: vec![card.clone()],
            ..EngineConfig::default()
        };
        let index = Arc::new(RecordingIndex::default());
        let observer = Arc::new(RecordingObserver::default());
        let progress = Arc::new(RecordingProgress::default());
        let env = OperationEnv::new(config, grants)
            .with_index(index.clone())
            .with_observer(observer.clone())
            .with_progress(progress.clone());

        Self {
            _dir: dir,
            card,
            home,
            env,
            index,
            observer,
            progress,
        }
    }
}

fn handle(path: &Path) -> FileHandle {
    FileHandle::capture(path).unwrap()
}

// ============================================================================
// Copy / Move
// ============================================================================

#[test]
fn test_copy_onto_card_needs_sandboxed_volume() {
    let fixture = Fixture::new();
    let source = fixture.home.join("song.mp3");
    write_file(&source, "la la la");
    let operation = CopyOperation::new(fixture.env.clone());
    let args = CopyArguments::new(vec![handle(&source)], fixture.card.join("music")).unwrap();
    let id = OperationId::new();

    assert!(!operation.operate(id, &args));
    assert!(!fixture.card.join("music").exists());

    assert!(operation.operate_sandboxed(id, &args));
    assert_eq!(fs::read_to_string(fixture.card.join("music/song.mp3")).unwrap(), "la la la");
    assert!(source.exists());
}

#[test]
fn test_operations_use_the_volumes_they_are_given() {
    let fixture = Fixture::new();
    let source = fixture.home.join("one.txt");
    write_file(&source, "1");
    fs::create_dir(fixture.home.join("out")).unwrap();
    let env = fixture
        .env
        .clone()
        .with_volumes(Arc::new(FlakyVolume::new(1)), Arc::new(DirectVolume::default()));
    let operation = CopyOperation::new(env);
    let args = CopyArguments::new(vec![handle(&source)], fixture.home.join("out")).unwrap();
    let id = OperationId::new();

    assert!(!operation.operate(id, &args));
    assert!(!fixture.home.join("out/one.txt").exists());

    assert!(operation.operate_sandboxed(id, &args));
    assert_eq!(fs::read_to_string(fixture.home.join("out/one.txt")).unwrap(), "1");
}

#[test]
fn test_copy_reports_progress_with_operation_id() {
    let fixture = Fixture::new();
    write_file(&fixture.home.join("docs/a.txt"), "a");
    write_file(&fixture.home.join("docs/b.txt"), "b");
    let target = fixture.home.join("backup");
    fs::create_dir(&target).unwrap();
    let operation = CopyOperation::new(fixture.env.clone());
    let args = CopyArguments::new(vec![handle(&fixture.home.join("docs"))], &target).unwrap();
    let id = OperationId::new();

    assert!(operation.operate(id, &args));

    let updates = fixture.progress.updates();
    assert_eq!(updates.len(), 2);
    assert!(updates.iter().all(|u| u.operation_id == id && u.total == 2));
    assert_eq!(
        fixture.index.added(),
        vec![(target.join("docs").to_string_lossy().to_string(), true)]
    );
}

#[test]
fn test_move_from_home_onto_card() {
    let fixture = Fixture::new();
    let source = fixture.home.join("album");
    write_file(&source.join("one.mp3"), "1");
    write_file(&source.join("two.mp3"), "2");
    let operation = MoveOperation::new(fixture.env.clone());
    let args = MoveArguments::new(vec![handle(&source)], &fixture.card).unwrap();
    let id = OperationId::new();

    assert!(!operation.operate(id, &args));
    assert!(source.exists());

    assert!(operation.operate_sandboxed(id, &args));
    assert!(!source.exists());
    assert_eq!(fs::read_to_string(fixture.card.join("album/two.mp3")).unwrap(), "2");
    assert_eq!(
        fixture.index.added().last().cloned(),
        Some((fixture.card.join("album").to_string_lossy().to_string(), true))
    );
}

#[test]
fn test_move_within_card_between_directories() {
    let fixture = Fixture::new();
    let source = fixture.card.join("inbox/photo.jpg");
    write_file(&source, "jpeg");
    fs::create_dir(fixture.card.join("photos")).unwrap();
    let operation = MoveOperation::new(fixture.env.clone());
    let args = MoveArguments::new(vec![handle(&source)], fixture.card.join("photos")).unwrap();

    assert!(operation.operate_sandboxed(OperationId::new(), &args));
    assert!(!source.exists());
    assert_eq!(fs::read_to_string(fixture.card.join("photos/photo.jpg")).unwrap(), "jpeg");
}

#[test]
fn test_move_arguments_need_files() {
    let result = MoveArguments::new(Vec::new(), "/tmp");
    assert_eq!(
        result.unwrap_err(),
        ArgumentsError::EmptyPayload {
            kind: OperationKind::Move
        }
    );
}

// ============================================================================
// Delete / Rename / CreateDirectory
// ============================================================================

#[test]
fn test_delete_on_card() {
    let fixture = Fixture::new();
    let victim = fixture.card.join("old/notes.txt");
    write_file(&victim, "x");
    let operation = DeleteOperation::new(fixture.env.clone());
    let args = DeleteArguments::new(vec![handle(&fixture.card.join("old"))]).unwrap();
    assert_eq!(args.target(), fixture.card.as_path());

    assert!(!operation.operate(OperationId::new(), &args));
    assert!(victim.exists());

    assert!(operation.operate_sandboxed(OperationId::new(), &args));
    assert!(!fixture.card.join("old").exists());
    assert_eq!(fixture.index.removed().len(), 2);
}

#[test]
fn test_rename_on_card() {
    let fixture = Fixture::new();
    let source = fixture.card.join("draft.txt");
    write_file(&source, "text");
    let operation = RenameOperation::new(fixture.env.clone());
    let args = RenameArguments::new(handle(&source), fixture.card.join("final.txt"));

    assert!(!operation.operate(OperationId::new(), &args));
    assert!(operation.operate_sandboxed(OperationId::new(), &args));

    assert!(!source.exists());
    assert_eq!(fs::read_to_string(fixture.card.join("final.txt")).unwrap(), "text");
}

#[test]
fn test_create_directory_on_card_twice() {
    let fixture = Fixture::new();
    let target = fixture.card.join("a/b/c");
    let operation = CreateDirectoryOperation::new(fixture.env.clone());
    let args = CreateDirectoryArguments::new(&target);

    assert!(!operation.operate(OperationId::new(), &args));
    assert!(operation.operate_sandboxed(OperationId::new(), &args));
    assert!(operation.operate_sandboxed(OperationId::new(), &args));
    // Once it exists, even the direct attempt sees it as done
    assert!(operation.operate(OperationId::new(), &args));

    assert!(target.is_dir());
    assert_eq!(fixture.index.added().len(), 1);
}

// ============================================================================
// Compress / Extract
// ============================================================================

#[test]
fn test_compress_onto_card_then_extract_at_home() {
    let fixture = Fixture::new();
    let docs = fixture.home.join("docs");
    write_file(&docs.join("a.txt"), "alpha");
    write_file(&docs.join("deep/b.txt"), "beta");
    let archive = fixture.card.join("docs.zip");

    let compress = CompressOperation::new(fixture.env.clone());
    let args = CompressArguments::new(vec![handle(&docs)], &archive).unwrap();
    let id = OperationId::new();
    assert!(!compress.operate(id, &args));
    assert!(compress.operate_sandboxed(id, &args));
    compress.on_result(id, true, &args);
    assert!(
        fixture
            .index
            .added()
            .contains(&(archive.to_string_lossy().to_string(), false))
    );

    let out = fixture.home.join("out");
    let extract = ExtractOperation::new(fixture.env.clone());
    let args = ExtractArguments::new(vec![handle(&archive)], &out).unwrap();
    let id = OperationId::new();
    assert!(extract.operate(id, &args));
    extract.on_result(id, true, &args);

    assert_eq!(fs::read_to_string(out.join("docs/a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(out.join("docs/deep/b.txt")).unwrap(), "beta");
    assert!(
        fixture
            .index
            .added()
            .contains(&(out.to_string_lossy().to_string(), true))
    );
}

#[test]
fn test_extract_onto_card() {
    let fixture = Fixture::new();
    let source = fixture.home.join("readme.md");
    write_file(&source, "# hi");
    let archive = fixture.home.join("readme.zip");
    let compress = CompressOperation::new(fixture.env.clone());
    let args = CompressArguments::new(vec![handle(&source)], &archive).unwrap();
    assert!(compress.operate(OperationId::new(), &args));

    let extract = ExtractOperation::new(fixture.env.clone());
    let args = ExtractArguments::new(vec![handle(&archive)], fixture.card.join("unpacked")).unwrap();
    assert!(!extract.operate(OperationId::new(), &args));
    assert!(extract.operate_sandboxed(OperationId::new(), &args));

    assert_eq!(fs::read_to_string(fixture.card.join("unpacked/readme.md")).unwrap(), "# hi");
}

#[test]
fn test_failed_compress_removes_partial_archive() {
    let fixture = Fixture::new();
    let archive = fixture.home.join("broken.zip");
    let ghost = FileHandle::from_parts(fixture.home.join("ghost"), true, None);
    let operation = CompressOperation::new(fixture.env.clone());
    let args = CompressArguments::new(vec![ghost], &archive).unwrap();
    let id = OperationId::new();

    assert!(!operation.operate(id, &args));
    assert!(archive.exists());

    operation.on_result(id, false, &args);
    assert!(!archive.exists());
    assert!(fixture.index.added().is_empty());
}

#[test]
fn test_failed_compress_removes_partial_archive_on_card() {
    let fixture = Fixture::new();
    let archive = fixture.card.join("broken.zip");
    write_file(&archive, "partial");
    let source = fixture.home.join("a.txt");
    write_file(&source, "a");
    let operation = CompressOperation::new(fixture.env.clone());
    let args = CompressArguments::new(vec![handle(&source)], &archive).unwrap();

    // The direct volume can't delete on the card, the sandboxed one can
    operation.on_result(OperationId::new(), false, &args);
    assert!(!archive.exists());
}

#[test]
fn test_failed_extract_keeps_destination() {
    let fixture = Fixture::new();
    let bad = fixture.home.join("bad.zip");
    write_file(&bad, "not a zip");
    let out = fixture.home.join("out");
    fs::create_dir(&out).unwrap();
    write_file(&out.join("keep.txt"), "mine");
    let operation = ExtractOperation::new(fixture.env.clone());
    let args = ExtractArguments::new(vec![handle(&bad)], &out).unwrap();
    let id = OperationId::new();

    assert!(!operation.operate(id, &args));
    operation.on_result(id, false, &args);

    assert!(out.join("keep.txt").exists());
    assert!(fixture.index.added().is_empty());
}

// ============================================================================
// Lifecycle forwarding
// ============================================================================

#[test]
fn test_hooks_forward_lifecycle_events() {
    let fixture = Fixture::new();
    let target = fixture.home.join("new");
    let operation = CreateDirectoryOperation::new(fixture.env.clone());
    let args = CreateDirectoryArguments::new(&target);
    let id = OperationId::new();

    operation.on_start_operation(id, &args);
    operation.on_requesting_access(id);
    operation.on_access_denied(id);
    operation.on_result(id, true, &args);

    let kind = OperationKind::CreateDirectory;
    assert_eq!(
        fixture.observer.events(),
        vec![
            OperationEvent::Started {
                operation_id: id,
                operation_type: kind
            },
            OperationEvent::RequestingAccess {
                operation_id: id,
                operation_type: kind
            },
            OperationEvent::AccessDenied {
                operation_id: id,
                operation_type: kind
            },
            OperationEvent::Finished {
                operation_id: id,
                operation_type: kind,
                success: true
            },
        ]
    );
}

#[test]
fn test_every_operation_reports_its_kind() {
    let env = Fixture::new().env;
    assert_eq!(CopyOperation::new(env.clone()).kind(), OperationKind::Copy);
    assert_eq!(MoveOperation::new(env.clone()).kind(), OperationKind::Move);
    assert_eq!(DeleteOperation::new(env.clone()).kind(), OperationKind::Delete);
    assert_eq!(RenameOperation::new(env.clone()).kind(), OperationKind::Rename);
    assert_eq!(CreateDirectoryOperation::new(env.clone()).kind(), OperationKind::CreateDirectory);
    assert_eq!(CompressOperation::new(env.clone()).kind(), OperationKind::Compress);
    assert_eq!(ExtractOperation::new(env).kind(), OperationKind::Extract);
}
