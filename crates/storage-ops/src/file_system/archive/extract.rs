//! Extract: zip archives onto storage.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use zip::ZipArchive;

use super::timestamps::{entry_modified, extended_mod_time};
use super::{ArchiveError, format_error, io_error};
use crate::file_system::events::{ProgressReporter, ProgressUpdate};
use crate::file_system::types::{FileHandle, OperationId, OperationKind, ProgressState};
use crate::file_system::volume::Volume;
use crate::file_system::write_operations::stream;

pub(crate) struct Extractor<'a> {
    volume: &'a dyn Volume,
    progress: &'a dyn ProgressReporter,
    operation_id: OperationId,
    buffer_size: usize,
}

impl<'a> Extractor<'a> {
    pub fn new(
        volume: &'a dyn Volume,
        progress: &'a dyn ProgressReporter,
        operation_id: OperationId,
        buffer_size: usize,
    ) -> Self {
        Self {
            volume,
            progress,
            operation_id,
            buffer_size,
        }
    }

    /// Extracts every archive into `destination_dir`, entries in declaration order.
    ///
    /// Stops at the first entry that can't be materialized. Returns the number of entries
    /// extracted. Directory times are restored once everything is written, since writing into
    /// a directory bumps its mtime.
    pub fn extract(&self, archives: &[FileHandle], destination_dir: &Path) -> Result<usize, ArchiveError> {
        let mut opened = Vec::with_capacity(archives.len());
        for handle in archives {
            let file = fs::File::open(handle.path()).map_err(io_error(handle.path()))?;
            let archive = ZipArchive::new(file).map_err(format_error(handle.path()))?;
            opened.push((handle, archive));
        }
        let mut progress = ProgressState::new(opened.iter().map(|(_, archive)| archive.len()).sum());
        log::debug!(
            "Extract: {} archives ({} entries) into {} via {} volume",
            archives.len(),
            progress.total,
            destination_dir.display(),
            self.volume.name()
        );

        let mut directory_times: Vec<(PathBuf, SystemTime)> = Vec::new();
        for (handle, archive) in opened.iter_mut() {
            for index in 0..archive.len() {
                let mut entry = archive.by_index(index).map_err(format_error(handle.path()))?;
                let name = entry.name().to_string();
                let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
                    return Err(ArchiveError::UnsafeEntry { name });
                };
                let is_directory = entry.is_dir();
                let modified = entry_modified(extended_mod_time(entry.extra_data_fields()), entry.last_modified());
                let destination = destination_dir.join(relative);

                self.extract_entry(&mut entry, &destination, is_directory, modified)?;
                if is_directory && let Some(modified) = modified {
                    directory_times.push((destination.clone(), modified));
                }
                progress.advance();

                self.progress.report(&ProgressUpdate {
                    operation_id: self.operation_id,
                    operation_type: OperationKind::Extract,
                    completed: progress.completed,
                    total: progress.total,
                    current_item: destination.file_name().map(|n| n.to_string_lossy().to_string()),
                    context_name: Some(handle.name().to_string()),
                });
            }
        }

        for (path, modified) in directory_times {
            if let Err(e) = self.volume.set_modified(&path, modified) {
                log::debug!("Extract: couldn't set mtime of {}: {}", path.display(), e);
            }
        }
        Ok(progress.completed)
    }

    fn extract_entry(
        &self,
        entry: &mut dyn Read,
        destination: &Path,
        is_directory: bool,
        modified: Option<SystemTime>,
    ) -> Result<(), ArchiveError> {
        if is_directory {
            self.volume.create_directory_all(destination)?;
            return Ok(());
        }
        if let Some(parent) = destination.parent()
            && !self.volume.is_directory(parent)
        {
            self.volume.create_directory_all(parent)?;
        }

        let mut output = self.volume.create_file(destination)?;
        stream(entry, &mut output, self.buffer_size).map_err(io_error(destination))?;
        output.flush().map_err(io_error(destination))?;
        // Closed before touching the mtime, otherwise the close would bump it again
        drop(output);

        if let Some(modified) = modified
            && let Err(e) = self.volume.set_modified(destination, modified)
        {
            log::debug!("Extract: couldn't set mtime of {}: {}", destination.display(), e);
        }
        log::debug!("Extract: wrote {}", destination.display());
        Ok(())
    }
}
