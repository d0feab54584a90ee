//! Arguments for each operation kind.

use std::path::{Path, PathBuf};

use super::OperationArguments;
use crate::file_system::types::{FileHandle, OperationKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentsError {
    /// A list payload was empty
    EmptyPayload { kind: OperationKind },
}

impl std::fmt::Display for ArgumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPayload { kind } => write!(f, "{} needs at least one file", kind),
        }
    }
}

impl std::error::Error for ArgumentsError {}

fn non_empty(files: Vec<FileHandle>, kind: OperationKind) -> Result<Vec<FileHandle>, ArgumentsError> {
    if files.is_empty() {
        return Err(ArgumentsError::EmptyPayload { kind });
    }
    Ok(files)
}

// ============================================================================
// Copy / Move
// ============================================================================

/// Files to copy into the `target` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyArguments {
    files: Vec<FileHandle>,
    target: PathBuf,
}

impl CopyArguments {
    pub fn new(files: Vec<FileHandle>, target: impl Into<PathBuf>) -> Result<Self, ArgumentsError> {
        Ok(Self {
            files: non_empty(files, OperationKind::Copy)?,
            target: target.into(),
        })
    }

    pub fn files(&self) -> &[FileHandle] {
        &self.files
    }
}

impl OperationArguments for CopyArguments {
    fn target(&self) -> &Path {
        &self.target
    }
}

/// Files to move into the `target` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveArguments {
    files: Vec<FileHandle>,
    target: PathBuf,
}

impl MoveArguments {
    pub fn new(files: Vec<FileHandle>, target: impl Into<PathBuf>) -> Result<Self, ArgumentsError> {
        Ok(Self {
            files: non_empty(files, OperationKind::Move)?,
            target: target.into(),
        })
    }

    pub fn files(&self) -> &[FileHandle] {
        &self.files
    }
}

impl OperationArguments for MoveArguments {
    fn target(&self) -> &Path {
        &self.target
    }
}

// ============================================================================
// Delete / Rename / CreateDirectory
// ============================================================================

/// Files to delete. The target is the directory holding the first victim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteArguments {
    victims: Vec<FileHandle>,
    target: PathBuf,
}

impl DeleteArguments {
    pub fn new(victims: Vec<FileHandle>) -> Result<Self, ArgumentsError> {
        let victims = non_empty(victims, OperationKind::Delete)?;
        let first = victims[0].path();
        let target = first.parent().unwrap_or(first).to_path_buf();
        Ok(Self { victims, target })
    }

    pub fn victims(&self) -> &[FileHandle] {
        &self.victims
    }
}

impl OperationArguments for DeleteArguments {
    fn target(&self) -> &Path {
        &self.target
    }
}

/// Renames `file` to the `target` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameArguments {
    file: FileHandle,
    target: PathBuf,
}

impl RenameArguments {
    pub fn new(file: FileHandle, target: impl Into<PathBuf>) -> Self {
        Self {
            file,
            target: target.into(),
        }
    }

    pub fn file(&self) -> &FileHandle {
        &self.file
    }
}

impl OperationArguments for RenameArguments {
    fn target(&self) -> &Path {
        &self.target
    }
}

/// Directory to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDirectoryArguments {
    target: PathBuf,
}

impl CreateDirectoryArguments {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self { target: target.into() }
    }
}

impl OperationArguments for CreateDirectoryArguments {
    fn target(&self) -> &Path {
        &self.target
    }
}

// ============================================================================
// Compress / Extract
// ============================================================================

/// Files to pack into the archive at `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressArguments {
    files: Vec<FileHandle>,
    target: PathBuf,
}

impl CompressArguments {
    pub fn new(files: Vec<FileHandle>, target: impl Into<PathBuf>) -> Result<Self, ArgumentsError> {
        Ok(Self {
            files: non_empty(files, OperationKind::Compress)?,
            target: target.into(),
        })
    }

    pub fn files(&self) -> &[FileHandle] {
        &self.files
    }
}

impl OperationArguments for CompressArguments {
    fn target(&self) -> &Path {
        &self.target
    }
}

/// Archives to unpack into the `target` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractArguments {
    archives: Vec<FileHandle>,
    target: PathBuf,
}

impl ExtractArguments {
    pub fn new(archives: Vec<FileHandle>, target: impl Into<PathBuf>) -> Result<Self, ArgumentsError> {
        Ok(Self {
            archives: non_empty(archives, OperationKind::Extract)?,
            target: target.into(),
        })
    }

    pub fn archives(&self) -> &[FileHandle] {
        &self.archives
    }
}

impl OperationArguments for ExtractArguments {
    fn target(&self) -> &Path {
        &self.target
    }
}
