//! Delete.

use crate::file_system::events::IndexInvalidation;
use crate::file_system::paths::paths_under;
use crate::file_system::types::FileHandle;
use crate::file_system::volume::Volume;

/// Deletes every victim (directories recursively). Returns whether all deletions succeeded.
///
/// Victims are independent: one failing doesn't stop the others.
pub(crate) fn delete_entries(volume: &dyn Volume, index: &dyn IndexInvalidation, victims: &[FileHandle]) -> bool {
    let mut all_succeeded = true;
    for victim in victims {
        let removed_paths = if victim.is_directory() {
            paths_under(victim.path())
        } else {
            vec![victim.path().to_string_lossy().to_string()]
        };
        match volume.delete_recursive(victim.path()) {
            Ok(()) => {
                log::debug!("Delete: removed {} ({} paths)", victim.path().display(), removed_paths.len());
                index.paths_removed(&removed_paths);
            }
            Err(e) => {
                log::warn!("Delete: couldn't delete {}: {}", victim.path().display(), e);
                all_succeeded = false;
            }
        }
    }
    all_succeeded
}
