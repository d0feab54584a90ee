//! Compress: file trees into one zip archive.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;
use zip::write::FullFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::timestamps::{EXTENDED_TIMESTAMP_ID, extended_timestamp_field, to_dos_time};
use super::{ArchiveError, format_error, io_error};
use crate::config::ArchiveCompression;
use crate::file_system::events::{ProgressReporter, ProgressUpdate};
use crate::file_system::paths::count_files_under_excluding;
use crate::file_system::types::{FileHandle, OperationId, OperationKind, ProgressState};
use crate::file_system::volume::{FileSink, Volume};
use crate::file_system::write_operations::{sorted_children, stream};

pub(crate) struct Compressor<'a> {
    volume: &'a dyn Volume,
    progress: &'a dyn ProgressReporter,
    operation_id: OperationId,
    buffer_size: usize,
    compression: ArchiveCompression,
}

impl<'a> Compressor<'a> {
    pub fn new(
        volume: &'a dyn Volume,
        progress: &'a dyn ProgressReporter,
        operation_id: OperationId,
        buffer_size: usize,
        compression: ArchiveCompression,
    ) -> Self {
        Self {
            volume,
            progress,
            operation_id,
            buffer_size,
            compression,
        }
    }

    /// Writes every source tree into a new archive at `archive_path`. Returns the number of
    /// files added. Any error aborts the whole archive; the caller removes the partial file.
    ///
    /// The archive itself is left out when it lands inside a source tree.
    pub fn compress(&self, sources: &[FileHandle], archive_path: &Path) -> Result<usize, ArchiveError> {
        let own_path = std::path::absolute(archive_path).unwrap_or_else(|_| archive_path.to_path_buf());
        let mut progress = ProgressState::new(count_files_under_excluding(sources, &own_path));
        let archive_name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        log::debug!(
            "Compress: {} sources ({} files) into {} via {} volume",
            sources.len(),
            progress.total,
            archive_path.display(),
            self.volume.name()
        );

        let sink = self.volume.create_file(archive_path)?;
        let mut writer = ZipWriter::new(sink);
        for source in sources {
            self.add_tree(&mut writer, source.path(), "", &mut progress, &archive_name, &own_path)?;
        }
        let mut sink = writer.finish().map_err(format_error(archive_path))?;
        sink.flush().map_err(io_error(archive_path))?;
        Ok(progress.completed)
    }

    fn add_tree(
        &self,
        writer: &mut ZipWriter<Box<dyn FileSink>>,
        path: &Path,
        parent_entry: &str,
        progress: &mut ProgressState,
        archive_name: &str,
        archive_path: &Path,
    ) -> Result<(), ArchiveError> {
        if path == archive_path {
            return Ok(());
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let entry_name = if parent_entry.is_empty() {
            name
        } else {
            format!("{}/{}", parent_entry, name)
        };
        let metadata = fs::symlink_metadata(path).map_err(io_error(path))?;
        let options = self.entry_options(metadata.modified().ok(), &entry_name);

        if metadata.is_dir() {
            let mut children = sorted_children(path).map_err(io_error(path))?;
            children.retain(|child| child != archive_path);
            if children.is_empty() {
                writer
                    .add_directory(format!("{}/", entry_name), options)
                    .map_err(format_error(archive_path))?;
            }
            for child in children {
                self.add_tree(writer, &child, &entry_name, progress, archive_name, archive_path)?;
            }
            return Ok(());
        }

        // Zip64 headers are only written when asked for
        let options = if metadata.len() >= u64::from(u32::MAX) {
            options.large_file(true)
        } else {
            options
        };
        writer
            .start_file(entry_name.clone(), options)
            .map_err(format_error(archive_path))?;
        let mut input = fs::File::open(path).map_err(io_error(path))?;
        stream(&mut input, writer, self.buffer_size).map_err(io_error(path))?;
        progress.advance();
        log::debug!("Compress: added {}", entry_name);

        self.progress.report(&ProgressUpdate {
            operation_id: self.operation_id,
            operation_type: OperationKind::Compress,
            completed: progress.completed,
            total: progress.total,
            current_item: path.file_name().map(|n| n.to_string_lossy().to_string()),
            context_name: Some(archive_name.to_string()),
        });
        Ok(())
    }

    /// DOS time always, plus the extended timestamp when the writer accepts it.
    fn entry_options(&self, modified: Option<SystemTime>, entry_name: &str) -> FullFileOptions<'static> {
        let method = match self.compression {
            ArchiveCompression::Stored => CompressionMethod::Stored,
            ArchiveCompression::Deflated => CompressionMethod::Deflated,
        };
        let mut options = FullFileOptions::default().compression_method(method);
        if let Some(modified) = modified {
            options = options.last_modified_time(to_dos_time(modified));
            if let Some(field) = extended_timestamp_field(modified)
                && let Err(e) = options.add_extra_data(EXTENDED_TIMESTAMP_ID, field, false)
            {
                log::debug!("Compress: no extended timestamp for {}: {}", entry_name, e);
            }
        }
        options
    }
}
