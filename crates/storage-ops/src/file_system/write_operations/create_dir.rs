//! Directory creation.

use std::path::Path;

use crate::file_system::events::IndexInvalidation;
use crate::file_system::volume::Volume;

/// Creates `target` and any missing ancestors. Succeeds if it's already a directory.
pub(crate) fn create_directory(volume: &dyn Volume, index: &dyn IndexInvalidation, target: &Path) -> bool {
    if volume.is_directory(target) {
        return true;
    }
    match volume.create_directory_all(target) {
        Ok(()) => {
            index.path_added(&target.to_string_lossy(), true);
            true
        }
        Err(e) => {
            log::warn!("CreateDirectory: couldn't create {}: {}", target.display(), e);
            false
        }
    }
}
