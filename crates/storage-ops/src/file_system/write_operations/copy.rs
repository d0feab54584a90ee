//! Recursive copy.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::helpers::{sorted_children, stream};
use crate::file_system::events::{IndexInvalidation, ProgressReporter, ProgressUpdate};
use crate::file_system::paths::{count_files_under, unique_destination};
use crate::file_system::types::{FileHandle, OperationId, OperationKind, ProgressState};
use crate::file_system::volume::{Volume, VolumeError};

/// Result of a copy: how many files were copied out of how many were found up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CopyOutcome {
    pub copied: usize,
    pub total: usize,
    /// Set when any entry failed, including directories that couldn't be created or listed
    pub failed: bool,
    /// Final destination of each top-level source, in source order
    pub destinations: Vec<PathBuf>,
}

impl CopyOutcome {
    pub fn succeeded(&self) -> bool {
        !self.failed && self.copied == self.total
    }
}

pub(crate) struct Copier<'a> {
    volume: &'a dyn Volume,
    progress: &'a dyn ProgressReporter,
    index: &'a dyn IndexInvalidation,
    operation_id: OperationId,
    kind: OperationKind,
    buffer_size: usize,
}

impl<'a> Copier<'a> {
    pub fn new(
        volume: &'a dyn Volume,
        progress: &'a dyn ProgressReporter,
        index: &'a dyn IndexInvalidation,
        operation_id: OperationId,
        kind: OperationKind,
        buffer_size: usize,
    ) -> Self {
        Self {
            volume,
            progress,
            index,
            operation_id,
            kind,
            buffer_size,
        }
    }

    /// Copies every source into `destination_dir` under a collision-free name.
    ///
    /// Keeps going after a failed entry. Symlinks are recreated, not followed.
    pub fn copy(&self, sources: &[FileHandle], destination_dir: &Path) -> CopyOutcome {
        let mut progress = ProgressState::new(count_files_under(sources));
        let context_name = destination_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| destination_dir.display().to_string());
        log::debug!(
            "Copy: {} sources ({} files) into {} via {} volume",
            sources.len(),
            progress.total,
            destination_dir.display(),
            self.volume.name()
        );

        let mut failed = false;
        let mut destinations = Vec::with_capacity(sources.len());
        for source in sources {
            let destination = unique_destination(destination_dir, source.name());
            if source.is_directory() && destination_dir.starts_with(source.path()) {
                log::warn!(
                    "Copy: can't copy {} into its own subtree {}",
                    source.path().display(),
                    destination_dir.display()
                );
                failed = true;
                continue;
            }
            if !self.copy_entry(source.path(), &destination, &mut progress, &context_name) {
                failed = true;
            }
            if self.volume.exists(&destination) {
                self.index
                    .path_added(&destination.to_string_lossy(), self.volume.is_directory(&destination));
            }
            destinations.push(destination);
        }

        if failed || !progress.is_complete() {
            log::warn!("Copy: copied {} of {} files", progress.completed, progress.total);
        }
        CopyOutcome {
            copied: progress.completed,
            total: progress.total,
            failed,
            destinations,
        }
    }

    /// Returns whether the entry and everything below it was copied.
    fn copy_entry(&self, source: &Path, destination: &Path, progress: &mut ProgressState, context_name: &str) -> bool {
        let file_type = match fs::symlink_metadata(source) {
            Ok(metadata) => metadata.file_type(),
            Err(e) => {
                log::warn!("Copy: can't read {}: {}", source.display(), e);
                return false;
            }
        };
        if file_type.is_dir() {
            self.copy_directory(source, destination, progress, context_name)
        } else if file_type.is_symlink() {
            let result = fs::read_link(source)
                .map_err(VolumeError::from)
                .and_then(|target| self.volume.create_symlink(&target, destination));
            self.finish_file(result.map(|()| 0), source, destination, progress, context_name)
        } else {
            let result = self.stream_file(source, destination);
            self.finish_file(result, source, destination, progress, context_name)
        }
    }

    fn copy_directory(
        &self,
        source: &Path,
        destination: &Path,
        progress: &mut ProgressState,
        context_name: &str,
    ) -> bool {
        if let Err(e) = self.volume.create_directory_all(destination) {
            log::warn!("Copy: couldn't create directory {}: {}", destination.display(), e);
            return false;
        }
        let children = match sorted_children(source) {
            Ok(children) => children,
            Err(e) => {
                log::warn!("Copy: couldn't list {}: {}", source.display(), e);
                return false;
            }
        };
        let mut copied_all = true;
        for child in children {
            let Some(name) = child.file_name() else { continue };
            if !self.copy_entry(&child, &destination.join(name), progress, context_name) {
                copied_all = false;
            }
        }
        copied_all
    }

    fn finish_file(
        &self,
        result: Result<u64, VolumeError>,
        source: &Path,
        destination: &Path,
        progress: &mut ProgressState,
        context_name: &str,
    ) -> bool {
        let copied = match result {
            Ok(bytes) => {
                progress.advance();
                log::debug!("Copy: {} -> {} ({} bytes)", source.display(), destination.display(), bytes);
                true
            }
            Err(e) => {
                log::warn!(
                    "Copy: failed to copy {} to {}: {}",
                    source.display(),
                    destination.display(),
                    e
                );
                false
            }
        };
        self.progress.report(&ProgressUpdate {
            operation_id: self.operation_id,
            operation_type: self.kind,
            completed: progress.completed,
            total: progress.total,
            current_item: source.file_name().map(|n| n.to_string_lossy().to_string()),
            context_name: Some(context_name.to_string()),
        });
        copied
    }

    /// Streams one file. A destination this call created is removed again if streaming fails.
    fn stream_file(&self, source: &Path, destination: &Path) -> Result<u64, VolumeError> {
        let mut input = fs::File::open(source)?;
        let mut output = self.volume.create_file(destination)?;
        let result = stream(&mut input, &mut output, self.buffer_size).and_then(|bytes| {
            output.flush()?;
            Ok(bytes)
        });
        drop(output);
        if result.is_err()
            && let Err(e) = self.volume.delete_recursive(destination)
        {
            log::debug!("Copy: couldn't remove partial {}: {}", destination.display(), e);
        }
        Ok(result?)
    }
}
