//! Move: rename when the volume can, copy-then-delete when it can't.

use std::path::{Path, PathBuf};
use std::slice;

use super::copy::Copier;
use super::helpers::delete_with_fallback;
use crate::file_system::events::{IndexInvalidation, NoIndex, NoProgress, ProgressReporter, ProgressUpdate};
use crate::file_system::paths::paths_under;
use crate::file_system::types::{FileHandle, OperationId, OperationKind};
use crate::file_system::volume::{Volume, VolumeError};

pub(crate) struct Mover<'a> {
    volume: &'a dyn Volume,
    /// Volumes tried in order when deleting a source after a copy fallback
    cleanup: &'a [&'a dyn Volume],
    progress: &'a dyn ProgressReporter,
    index: &'a dyn IndexInvalidation,
    operation_id: OperationId,
    buffer_size: usize,
}

impl<'a> Mover<'a> {
    pub fn new(
        volume: &'a dyn Volume,
        cleanup: &'a [&'a dyn Volume],
        progress: &'a dyn ProgressReporter,
        index: &'a dyn IndexInvalidation,
        operation_id: OperationId,
        buffer_size: usize,
    ) -> Self {
        Self {
            volume,
            cleanup,
            progress,
            index,
            operation_id,
            buffer_size,
        }
    }

    /// Moves every source into `destination_dir`. Returns whether all of them moved.
    pub fn move_all(&self, sources: &[FileHandle], destination_dir: &Path) -> bool {
        let context_name = destination_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| destination_dir.display().to_string());

        let mut all_succeeded = true;
        for (index, source) in sources.iter().enumerate() {
            // Collected first: after the move these paths no longer exist
            let removed_paths = paths_under(source.path());
            match self.move_single(source, destination_dir) {
                Some(final_path) => {
                    log::debug!("Move: {} -> {}", source.path().display(), final_path.display());
                    self.index.paths_removed(&removed_paths);
                    self.index
                        .path_added(&final_path.to_string_lossy(), source.is_directory());
                }
                None => all_succeeded = false,
            }
            self.progress.report(&ProgressUpdate {
                operation_id: self.operation_id,
                operation_type: OperationKind::Move,
                completed: index + 1,
                total: sources.len(),
                current_item: Some(source.name().to_string()),
                context_name: Some(context_name.clone()),
            });
        }
        all_succeeded
    }

    fn move_single(&self, source: &FileHandle, destination_dir: &Path) -> Option<PathBuf> {
        let destination = destination_dir.join(source.name());
        match self.volume.rename(source.path(), &destination) {
            Ok(()) => Some(destination),
            Err(VolumeError::NotSupported) => self.copy_then_delete(source, destination_dir),
            Err(e) => {
                log::warn!(
                    "Move: couldn't move {} to {}: {}",
                    source.path().display(),
                    destination.display(),
                    e
                );
                None
            }
        }
    }

    /// The source is deleted only when its whole tree was copied.
    fn copy_then_delete(&self, source: &FileHandle, destination_dir: &Path) -> Option<PathBuf> {
        let copier = Copier::new(
            self.volume,
            &NoProgress,
            &NoIndex,
            self.operation_id,
            OperationKind::Move,
            self.buffer_size,
        );
        let outcome = copier.copy(slice::from_ref(source), destination_dir);
        if !outcome.succeeded() {
            log::warn!(
                "Move: copy of {} incomplete ({}/{} files), keeping the source",
                source.path().display(),
                outcome.copied,
                outcome.total
            );
            return None;
        }
        if !delete_with_fallback(self.cleanup, source.path()) {
            log::warn!("Move: copied {} but couldn't delete it", source.path().display());
            return None;
        }
        outcome.destinations.into_iter().next()
    }
}
