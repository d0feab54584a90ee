//! Volume that reaches storage through a granted document tree.
//!
//! A path is never used directly. It's resolved from the root of the grant that covers it,
//! one segment at a time, the way a document-tree capability is walked: each segment must be
//! found among the children of the previous one, or created when the operation creates
//! things. Anything outside every grant is out of scope.

use super::{FileSink, Volume, VolumeError};
use crate::file_system::access::AccessGrantStore;
use filetime::FileTime;
use std::ffi::OsStr;
use std::fs;
use std::io::BufWriter;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// How to treat segments missing from the granted tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolve {
    /// Every segment must already exist
    Existing,
    /// Missing segments become directories
    CreateDirectory,
    /// Missing intermediate segments become directories, a missing last segment an empty file
    CreateFile,
}

/// A path resolved through a grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocumentHandle {
    pub path: PathBuf,
    /// Whether the handle is the grant root itself
    pub is_root: bool,
}

pub struct SandboxedVolume {
    grants: Arc<dyn AccessGrantStore>,
}

impl SandboxedVolume {
    pub fn new(grants: Arc<dyn AccessGrantStore>) -> Self {
        Self { grants }
    }

    /// Walks the covering grant's tree down to `path`.
    pub(crate) fn resolve(&self, path: &Path, mode: Resolve) -> Result<DocumentHandle, VolumeError> {
        let out_of_scope = || VolumeError::ScopeInsufficient(path.display().to_string());

        let grant = self.grants.find(path).ok_or_else(out_of_scope)?;
        if !grant.writable {
            return Err(VolumeError::PermissionDenied(path.display().to_string()));
        }
        if !grant.root.is_dir() {
            log::warn!("Sandboxed: grant root {} is gone", grant.root.display());
            return Err(out_of_scope());
        }

        let relative = path.strip_prefix(&grant.root).map_err(|_| out_of_scope())?;
        let segments = relative
            .components()
            .map(|component| match component {
                Component::Normal(segment) => Ok(segment),
                _ => Err(out_of_scope()),
            })
            .collect::<Result<Vec<&OsStr>, VolumeError>>()?;

        let mut current = grant.root.clone();
        for (index, segment) in segments.iter().enumerate() {
            let is_last = index + 1 == segments.len();
            match find_child(&current, segment)? {
                Some(child) => {
                    if !is_last && !child.is_dir() {
                        return Err(out_of_scope());
                    }
                    current = child;
                }
                None => {
                    let child = current.join(segment);
                    let created = match mode {
                        Resolve::Existing => return Err(VolumeError::NotFound(path.display().to_string())),
                        Resolve::CreateFile if is_last => fs::OpenOptions::new()
                            .write(true)
                            .create_new(true)
                            .open(&child)
                            .map(|_| ()),
                        Resolve::CreateFile | Resolve::CreateDirectory => fs::create_dir(&child),
                    };
                    if let Err(e) = created {
                        log::debug!("Sandboxed: couldn't create segment {}: {}", child.display(), e);
                        return Err(out_of_scope());
                    }
                    current = child;
                }
            }
        }

        log::debug!(
            "Sandboxed: resolved {} through grant {} ({} segments)",
            path.display(),
            grant.token,
            segments.len()
        );
        Ok(DocumentHandle {
            path: current,
            is_root: segments.is_empty(),
        })
    }
}

/// Finds a child by exact name among the entries of `dir`.
fn find_child(dir: &Path, name: &OsStr) -> Result<Option<PathBuf>, VolumeError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        log::debug!("Sandboxed: couldn't list {}: {}", dir.display(), e);
        VolumeError::ScopeInsufficient(dir.display().to_string())
    })?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_name() == name)
        .map(|entry| entry.path()))
}

impl Volume for SandboxedVolume {
    fn name(&self) -> &str {
        "sandboxed"
    }

    fn create_directory_all(&self, path: &Path) -> Result<(), VolumeError> {
        let handle = self.resolve(path, Resolve::CreateDirectory)?;
        if !handle.path.is_dir() {
            return Err(VolumeError::AlreadyExists(path.display().to_string()));
        }
        Ok(())
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn FileSink>, VolumeError> {
        let handle = self.resolve(path, Resolve::CreateFile)?;
        if handle.path.is_dir() {
            return Err(VolumeError::AlreadyExists(path.display().to_string()));
        }
        let file = fs::OpenOptions::new().write(true).truncate(true).open(&handle.path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn delete_recursive(&self, path: &Path) -> Result<(), VolumeError> {
        let handle = self.resolve(path, Resolve::Existing)?;
        if handle.is_root {
            return Err(VolumeError::PermissionDenied(path.display().to_string()));
        }
        let metadata = fs::symlink_metadata(&handle.path)?;
        if metadata.is_dir() {
            fs::remove_dir_all(&handle.path)?;
        } else {
            fs::remove_file(&handle.path)?;
        }
        Ok(())
    }

    /// Renames within one directory. Document trees can't move entries between parents.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), VolumeError> {
        if from.parent() != to.parent() {
            return Err(VolumeError::NotSupported);
        }
        let Some(new_name) = to.file_name() else {
            return Err(VolumeError::NotSupported);
        };
        let handle = self.resolve(from, Resolve::Existing)?;
        if handle.is_root {
            return Err(VolumeError::PermissionDenied(from.display().to_string()));
        }
        if self.exists(to) {
            return Err(VolumeError::AlreadyExists(to.display().to_string()));
        }
        fs::rename(&handle.path, handle.path.with_file_name(new_name))?;
        Ok(())
    }

    fn set_modified(&self, path: &Path, modified: SystemTime) -> Result<(), VolumeError> {
        let handle = self.resolve(path, Resolve::Existing)?;
        filetime::set_file_mtime(&handle.path, FileTime::from_system_time(modified))?;
        Ok(())
    }
}
