//! Write probe on raw paths.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::file_system::paths::path_exists;

/// Decides write access by actually writing: a marker file is created and removed again.
#[derive(Debug, Clone)]
pub struct DirectAccess {
    probe_file_prefix: String,
    restricted_roots: Vec<PathBuf>,
}

impl DirectAccess {
    pub fn new(probe_file_prefix: impl Into<String>, restricted_roots: Vec<PathBuf>) -> Self {
        Self {
            probe_file_prefix: probe_file_prefix.into(),
            restricted_roots,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.probe_file_prefix.clone(), config.sandboxed_roots.clone())
    }

    /// Probes the directory `path` names, or its nearest existing ancestor.
    pub fn has_write_access(&self, path: &Path) -> bool {
        let Some(directory) = nearest_existing_directory(path) else {
            log::debug!("Access: no existing ancestor of {}", path.display());
            return false;
        };
        if self.restricted_roots.iter().any(|root| directory.starts_with(root)) {
            return false;
        }
        self.probe(directory)
    }

    fn probe(&self, directory: &Path) -> bool {
        let marker = self.free_marker_path(directory);
        match fs::OpenOptions::new().write(true).create_new(true).open(&marker) {
            Ok(file) => {
                drop(file);
                if let Err(e) = fs::remove_file(&marker) {
                    log::warn!("Access: couldn't remove probe file {}: {}", marker.display(), e);
                }
                true
            }
            Err(e) => {
                log::debug!("Access: {} is not writable: {}", directory.display(), e);
                false
            }
        }
    }

    /// First `<prefix><n>` that doesn't exist yet.
    fn free_marker_path(&self, directory: &Path) -> PathBuf {
        let mut index = 0u32;
        loop {
            let candidate = directory.join(format!("{}{}", self.probe_file_prefix, index));
            if !path_exists(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }
}

fn nearest_existing_directory(path: &Path) -> Option<&Path> {
    path.ancestors().find(|ancestor| !ancestor.as_os_str().is_empty() && ancestor.is_dir())
}
