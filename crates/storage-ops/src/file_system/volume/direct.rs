//! Raw-path volume.

use super::{FileSink, Volume, VolumeError};
use filetime::FileTime;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A volume that mutates storage through plain paths.
///
/// Paths under `restricted_roots` (removable media that only accept writes through a
/// capability grant) are refused with `PermissionDenied`, like the platform refuses them.
pub struct DirectVolume {
    restricted_roots: Vec<PathBuf>,
}

impl DirectVolume {
    pub fn new(restricted_roots: Vec<PathBuf>) -> Self {
        Self { restricted_roots }
    }

    fn check_writable(&self, path: &Path) -> Result<(), VolumeError> {
        if self.restricted_roots.iter().any(|root| path.starts_with(root)) {
            return Err(VolumeError::PermissionDenied(path.display().to_string()));
        }
        Ok(())
    }
}

impl Default for DirectVolume {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Volume for DirectVolume {
    fn name(&self) -> &str {
        "direct"
    }

    fn create_directory_all(&self, path: &Path) -> Result<(), VolumeError> {
        self.check_writable(path)?;
        if self.is_directory(path) {
            return Ok(());
        }
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn FileSink>, VolumeError> {
        self.check_writable(path)?;
        let file = fs::File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn delete_recursive(&self, path: &Path) -> Result<(), VolumeError> {
        self.check_writable(path)?;
        let metadata = fs::symlink_metadata(path)?;
        if metadata.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), VolumeError> {
        self.check_writable(from)?;
        self.check_writable(to)?;
        if self.exists(to) {
            return Err(VolumeError::AlreadyExists(to.display().to_string()));
        }
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            // Across file systems a rename can't be atomic; callers fall back to copy+delete
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => Err(VolumeError::NotSupported),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(unix)]
    fn create_symlink(&self, target: &Path, link: &Path) -> Result<(), VolumeError> {
        self.check_writable(link)?;
        std::os::unix::fs::symlink(target, link)?;
        Ok(())
    }

    fn set_modified(&self, path: &Path, modified: SystemTime) -> Result<(), VolumeError> {
        self.check_writable(path)?;
        filetime::set_file_mtime(path, FileTime::from_system_time(modified))?;
        Ok(())
    }
}
