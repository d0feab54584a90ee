//! Type definitions shared by all operations.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

// ============================================================================
// Operation identity
// ============================================================================

/// Kind of storage operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Copy,
    Move,
    Delete,
    Rename,
    CreateDirectory,
    Compress,
    Extract,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Copy => "Copy",
            Self::Move => "Move",
            Self::Delete => "Delete",
            Self::Rename => "Rename",
            Self::CreateDirectory => "CreateDirectory",
            Self::Compress => "Compress",
            Self::Extract => "Extract",
        };
        f.write_str(name)
    }
}

/// Correlates progress and lifecycle events of one logical request, across all its retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// File handles
// ============================================================================

/// An absolute path plus the metadata captured when the operation was set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    path: PathBuf,
    name: String,
    is_directory: bool,
    modified: Option<SystemTime>,
}

impl FileHandle {
    /// Captures a handle for an existing file or directory. Relative paths are made absolute.
    ///
    /// A symlink is captured as itself, so a link to a directory is not a directory.
    pub fn capture(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let metadata = fs::symlink_metadata(&path)?;
        Ok(Self::from_parts(path, metadata.is_dir(), metadata.modified().ok()))
    }

    /// Builds a handle from already known metadata.
    pub fn from_parts(path: impl Into<PathBuf>, is_directory: bool, modified: Option<SystemTime>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            is_directory,
            modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name (last path segment).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Progress of one attempt. Created fresh for every attempt, so a retry starts from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    pub completed: usize,
    pub total: usize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self { completed: 0, total }
    }

    pub fn advance(&mut self) {
        self.completed += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}
