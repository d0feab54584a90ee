//! Rename.

use std::path::Path;

use crate::file_system::events::IndexInvalidation;
use crate::file_system::paths::paths_under;
use crate::file_system::types::FileHandle;
use crate::file_system::volume::Volume;

/// Renames `source` to `destination`. An existing destination counts as done and is left
/// untouched, as is the source.
pub(crate) fn rename_entry(
    volume: &dyn Volume,
    index: &dyn IndexInvalidation,
    source: &FileHandle,
    destination: &Path,
) -> bool {
    if volume.exists(destination) {
        log::info!("Rename: {} already exists, nothing to do", destination.display());
        return true;
    }

    let removed_paths = if source.is_directory() {
        paths_under(source.path())
    } else {
        vec![source.path().to_string_lossy().to_string()]
    };
    match volume.rename(source.path(), destination) {
        Ok(()) => {
            index.paths_removed(&removed_paths);
            index.path_added(&destination.to_string_lossy(), source.is_directory());
            true
        }
        Err(e) => {
            log::warn!(
                "Rename: couldn't rename {} to {}: {}",
                source.path().display(),
                destination.display(),
                e
            );
            false
        }
    }
}
