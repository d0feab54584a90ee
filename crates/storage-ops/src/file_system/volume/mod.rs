//! Volume trait for abstracting how mutations reach storage.
//!
//! Tree operations and the archive codec never touch `std::fs` for writes directly. They go
//! through a `Volume`, so the same traversal code runs against raw paths ([`DirectVolume`])
//! and against a granted document tree ([`SandboxedVolume`]). Reads always use raw paths.

mod direct;
mod sandboxed;

pub use direct::DirectVolume;
pub use sandboxed::SandboxedVolume;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Seek, Write};
use std::path::Path;
use std::time::SystemTime;

/// Error type for volume operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum VolumeError {
    /// Path not found
    NotFound(String),
    /// Permission denied (raw-path write refused, or read-only grant)
    PermissionDenied(String),
    /// Path already exists
    AlreadyExists(String),
    /// Operation not supported by this volume
    NotSupported,
    /// No grant covers the path, or a segment of the granted tree couldn't be found or created
    ScopeInsufficient(String),
    /// Generic I/O error
    IoError(String),
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Path not found: {}", path),
            Self::PermissionDenied(path) => write!(f, "Permission denied: {}", path),
            Self::AlreadyExists(path) => write!(f, "Already exists: {}", path),
            Self::NotSupported => write!(f, "Operation not supported"),
            Self::ScopeInsufficient(path) => write!(f, "Not covered by an access grant: {}", path),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for VolumeError {}

impl From<std::io::Error> for VolumeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

/// Writable, seekable output handed out by [`Volume::create_file`].
///
/// Seek is needed by the zip writer. Callers must `flush()` before dropping, since errors
/// during an implicit flush on drop are lost.
pub trait FileSink: Write + Seek + Send {}

impl<T: Write + Seek + Send> FileSink for T {}

/// Mutating file system operations.
///
/// All paths are absolute.
pub trait Volume: Send + Sync {
    /// Short name used in logs ("direct", "sandboxed").
    fn name(&self) -> &str;

    /// Checks if a path exists, without following symlinks.
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    /// Checks if a path is an existing directory.
    fn is_directory(&self, path: &Path) -> bool {
        fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }

    // ========================================
    // Required: All volumes must implement
    // ========================================

    /// Creates a directory and any missing ancestors. Succeeds if it already exists.
    fn create_directory_all(&self, path: &Path) -> Result<(), VolumeError>;

    /// Creates (or truncates) a file and returns a writer for its contents.
    fn create_file(&self, path: &Path) -> Result<Box<dyn FileSink>, VolumeError>;

    /// Deletes a file, or a directory with everything in it.
    fn delete_recursive(&self, path: &Path) -> Result<(), VolumeError>;

    // ========================================
    // Optional: Default to NotSupported
    // ========================================

    /// Renames/moves a file or directory. Never replaces an existing destination.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), VolumeError> {
        let _ = (from, to);
        Err(VolumeError::NotSupported)
    }

    /// Creates a symlink at `link` that points to `target`. The target is stored as given.
    fn create_symlink(&self, target: &Path, link: &Path) -> Result<(), VolumeError> {
        let _ = (target, link);
        Err(VolumeError::NotSupported)
    }

    /// Sets the modification time of a file or directory.
    fn set_modified(&self, path: &Path, modified: SystemTime) -> Result<(), VolumeError> {
        let _ = (path, modified);
        Err(VolumeError::NotSupported)
    }
}
