//! Archive codec: zip compress and extract.
//!
//! Entry names are relative paths with forward slashes. A directory that has children
//! contributes only its children; an empty one becomes a `name/` entry so it survives the
//! round trip. Modification times are stored twice: as the DOS timestamp every zip reader
//! understands, and in the extended-timestamp extra field for whole-second precision.

mod compress;
mod extract;
mod timestamps;

pub(crate) use compress::Compressor;
pub(crate) use extract::Extractor;

use std::fs;
use std::path::Path;
use std::time::SystemTime;
use zip::ZipArchive;

use crate::file_system::volume::VolumeError;

/// Metadata of one entry in a zip container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash separated, never containing `..`; directories end with `/`
    pub relative_path: String,
    pub is_directory: bool,
    pub modified: Option<SystemTime>,
    /// Uncompressed size in bytes (zero for directories)
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// The volume refused to create, write or delete something
    Volume(VolumeError),
    Io { path: String, message: String },
    /// The container is corrupt or couldn't be written
    Format { path: String, message: String },
    /// Entry name that would land outside the destination
    UnsafeEntry { name: String },
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Volume(e) => write!(f, "{}", e),
            Self::Io { path, message } => write!(f, "I/O error at {}: {}", path, message),
            Self::Format { path, message } => write!(f, "Zip error in {}: {}", path, message),
            Self::UnsafeEntry { name } => write!(f, "Entry escapes the destination: {}", name),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<VolumeError> for ArchiveError {
    fn from(err: VolumeError) -> Self {
        Self::Volume(err)
    }
}

pub(crate) fn io_error(path: &Path) -> impl Fn(std::io::Error) -> ArchiveError + '_ {
    move |e| ArchiveError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

pub(crate) fn format_error(path: &Path) -> impl Fn(zip::result::ZipError) -> ArchiveError + '_ {
    move |e| ArchiveError::Format {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Lists the entries of a zip archive in declaration order.
pub fn list_entries(archive_path: &Path) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let file = fs::File::open(archive_path).map_err(io_error(archive_path))?;
    let mut archive = ZipArchive::new(file).map_err(format_error(archive_path))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(format_error(archive_path))?;
        if entry.enclosed_name().is_none() {
            return Err(ArchiveError::UnsafeEntry {
                name: entry.name().to_string(),
            });
        }
        entries.push(ArchiveEntry {
            relative_path: entry.name().to_string(),
            is_directory: entry.is_dir(),
            modified: timestamps::entry_modified(
                timestamps::extended_mod_time(entry.extra_data_fields()),
                entry.last_modified(),
            ),
            size: entry.size(),
        });
    }
    Ok(entries)
}
