//! Test doubles shared by the test modules.

#![allow(dead_code, reason = "Shared by several test modules, not each uses everything")]

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::access::{AccessGrant, AccessGrantStore, AccessListener, AccessOutcome, ConsentFlow, GrantToken};
use super::events::{IndexInvalidation, OperationEvent, OperationObserver, ProgressReporter, ProgressUpdate};
use super::volume::{DirectVolume, FileSink, Volume, VolumeError};

// ============================================================================
// Recorders
// ============================================================================

#[derive(Default)]
pub struct RecordingIndex {
    pub removed: Mutex<Vec<String>>,
    pub added: Mutex<Vec<(String, bool)>>,
}

impl RecordingIndex {
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn added(&self) -> Vec<(String, bool)> {
        self.added.lock().unwrap().clone()
    }
}

impl IndexInvalidation for RecordingIndex {
    fn paths_removed(&self, paths: &[String]) {
        self.removed.lock().unwrap().extend_from_slice(paths);
    }

    fn path_added(&self, path: &str, is_directory: bool) {
        self.added.lock().unwrap().push((path.to_string(), is_directory));
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub updates: Mutex<Vec<ProgressUpdate>>,
}

impl RecordingProgress {
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, update: &ProgressUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<OperationEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<OperationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl OperationObserver for RecordingObserver {
    fn on_event(&self, event: OperationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ============================================================================
// Consent
// ============================================================================

/// Answers consent requests from a script. A `Granted` answer first persists a grant for
/// `grant_root` (when set), like a real consent flow would.
pub struct ScriptedConsent {
    answers: Mutex<VecDeque<AccessOutcome>>,
    grants: Arc<dyn AccessGrantStore>,
    grant_root: Option<PathBuf>,
    pub requests: AtomicUsize,
}

impl ScriptedConsent {
    pub fn new(answers: Vec<AccessOutcome>, grants: Arc<dyn AccessGrantStore>, grant_root: Option<PathBuf>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            grants,
            grant_root,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl ConsentFlow for ScriptedConsent {
    fn request(&self, _path: &Path, listener: AccessListener) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.lock().unwrap().pop_front().unwrap_or(AccessOutcome::Denied);
        if answer == AccessOutcome::Granted
            && let Some(root) = &self.grant_root
        {
            self.grants
                .persist(AccessGrant::new(root.clone(), GrantToken::new("test-token")))
                .unwrap();
        }
        listener.resolve(answer);
    }
}

/// Answers from a spawned task after a short delay.
pub struct DelayedConsent {
    pub answer: AccessOutcome,
    pub grants: Arc<dyn AccessGrantStore>,
    pub grant_root: PathBuf,
}

impl ConsentFlow for DelayedConsent {
    fn request(&self, _path: &Path, listener: AccessListener) {
        let answer = self.answer;
        let grants = Arc::clone(&self.grants);
        let root = self.grant_root.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if answer == AccessOutcome::Granted {
                grants.persist(AccessGrant::new(root, GrantToken::new("late-token"))).unwrap();
            }
            listener.resolve(answer);
        });
    }
}

/// Drops the listener without answering.
pub struct SilentConsent;

impl ConsentFlow for SilentConsent {
    fn request(&self, _path: &Path, listener: AccessListener) {
        drop(listener);
    }
}

// ============================================================================
// Volumes
// ============================================================================

/// Direct volume that can't rename and fails the n-th file it creates (1-based).
pub struct FlakyVolume {
    inner: DirectVolume,
    fail_on_create: usize,
    creates: AtomicUsize,
}

impl FlakyVolume {
    pub fn new(fail_on_create: usize) -> Self {
        Self {
            inner: DirectVolume::default(),
            fail_on_create,
            creates: AtomicUsize::new(0),
        }
    }
}

impl Volume for FlakyVolume {
    fn name(&self) -> &str {
        "flaky"
    }

    fn create_directory_all(&self, path: &Path) -> Result<(), VolumeError> {
        self.inner.create_directory_all(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn FileSink>, VolumeError> {
        let count = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if count == self.fail_on_create {
            return Err(VolumeError::IoError(format!("injected failure for {}", path.display())));
        }
        self.inner.create_file(path)
    }

    fn delete_recursive(&self, path: &Path) -> Result<(), VolumeError> {
        self.inner.delete_recursive(path)
    }
}

/// Volume that refuses to delete one specific path.
pub struct UndeletableVolume {
    pub inner: DirectVolume,
    pub protected: PathBuf,
}

impl Volume for UndeletableVolume {
    fn name(&self) -> &str {
        "undeletable"
    }

    fn create_directory_all(&self, path: &Path) -> Result<(), VolumeError> {
        self.inner.create_directory_all(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn FileSink>, VolumeError> {
        self.inner.create_file(path)
    }

    fn delete_recursive(&self, path: &Path) -> Result<(), VolumeError> {
        if path == self.protected {
            return Err(VolumeError::PermissionDenied(path.display().to_string()));
        }
        self.inner.delete_recursive(path)
    }
}

/// Volume that refuses to create one specific directory.
pub struct DirectoryRefusingVolume {
    pub inner: DirectVolume,
    pub refused: PathBuf,
}

impl Volume for DirectoryRefusingVolume {
    fn name(&self) -> &str {
        "directory-refusing"
    }

    fn create_directory_all(&self, path: &Path) -> Result<(), VolumeError> {
        if path == self.refused {
            return Err(VolumeError::IoError(format!("injected failure for {}", path.display())));
        }
        self.inner.create_directory_all(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn FileSink>, VolumeError> {
        self.inner.create_file(path)
    }

    fn delete_recursive(&self, path: &Path) -> Result<(), VolumeError> {
        self.inner.delete_recursive(path)
    }
}

/// Volume whose files get created but reject every write.
pub struct BrokenSinkVolume {
    pub inner: DirectVolume,
}

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("injected write failure"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for BrokenSink {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

impl Volume for BrokenSinkVolume {
    fn name(&self) -> &str {
        "broken-sink"
    }

    fn create_directory_all(&self, path: &Path) -> Result<(), VolumeError> {
        self.inner.create_directory_all(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn FileSink>, VolumeError> {
        drop(self.inner.create_file(path)?);
        Ok(Box::new(BrokenSink))
    }

    fn delete_recursive(&self, path: &Path) -> Result<(), VolumeError> {
        self.inner.delete_recursive(path)
    }
}

// ============================================================================
// File helpers
// ============================================================================

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Sets the mtime to a whole number of seconds since the epoch.
pub fn set_mtime(path: &Path, seconds: u64) {
    filetime::set_file_mtime(path, filetime::FileTime::from_unix_time(seconds as i64, 0)).unwrap();
}

pub fn mtime_seconds(path: &Path) -> u64 {
    fs::metadata(path)
        .unwrap()
        .modified()
        .unwrap()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn modified(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}
