//! Path set utilities: enumerating and counting the paths of file trees.
//!
//! Used for index-invalidation bookkeeping (the paths a delete or move will remove must be
//! collected before the tree disappears) and for progress pre-counts.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::types::FileHandle;

/// Returns `path` itself and every path below it, parents before children.
///
/// Symlinks are listed but not followed, not even when `path` is one. Entries that can't be
/// read are skipped.
pub fn paths_under(path: &Path) -> Vec<String> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .follow_root_links(false)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => paths.push(entry.path().to_string_lossy().to_string()),
            Err(e) => log::debug!("paths_under: skipping unreadable entry under {}: {}", path.display(), e),
        }
    }
    paths
}

/// Counts the non-directory entries at or below `path`. A plain file or a symlink counts as one.
pub fn count_files_in(path: &Path) -> usize {
    count_files(path, None)
}

/// Counts the files under every handle.
pub fn count_files_under(handles: &[FileHandle]) -> usize {
    handles.iter().map(|handle| count_files(handle.path(), None)).sum()
}

/// Like [`count_files_under`], leaving out `excluded` (and everything below it).
pub(crate) fn count_files_under_excluding(handles: &[FileHandle], excluded: &Path) -> usize {
    handles.iter().map(|handle| count_files(handle.path(), Some(excluded))).sum()
}

fn count_files(path: &Path, excluded: Option<&Path>) -> usize {
    let mut count = 0;
    let walker = WalkDir::new(path)
        .follow_links(false)
        .follow_root_links(false)
        .into_iter()
        .filter_entry(|entry| excluded != Some(entry.path()));
    for entry in walker {
        match entry {
            Ok(entry) if !entry.file_type().is_dir() => count += 1,
            Ok(_) => {}
            Err(e) => log::debug!("count_files: skipping unreadable entry under {}: {}", path.display(), e),
        }
    }
    count
}

/// Returns `dir/name`, or the first free `name (n)` variant if that's taken.
///
/// The counter goes before the extension: `photo.jpg` becomes `photo (1).jpg`.
pub fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !path_exists(&candidate) {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    let extension = as_path.extension().map(|s| s.to_string_lossy().to_string());

    let mut counter = 1;
    loop {
        let new_name = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, counter, ext),
            None => format!("{} ({})", stem, counter),
        };
        let new_path = dir.join(new_name);
        if !path_exists(&new_path) {
            return new_path;
        }
        counter += 1;
    }
}

/// Existence check that doesn't follow symlinks, so dangling links count as taken.
pub(crate) fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
