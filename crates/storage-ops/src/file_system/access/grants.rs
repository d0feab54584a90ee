//! Persisted capability grants.
//!
//! A grant maps the root of a document tree the user picked to the token that authorizes
//! writes below it. Grants are created by the consent flow and outlive operations; the
//! engine only reads them. Only one grant per root is kept.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::ignore_poison::IgnorePoison;

/// Opaque capability token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantToken(String);

impl GrantToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GrantToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    /// Root of the granted tree
    pub root: PathBuf,
    pub token: GrantToken,
    pub writable: bool,
    /// When the grant was obtained (Unix timestamp in seconds)
    pub granted_at: i64,
}

impl AccessGrant {
    /// A writable grant obtained now.
    pub fn new(root: impl Into<PathBuf>, token: GrantToken) -> Self {
        Self {
            root: root.into(),
            token,
            writable: true,
            granted_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Whether `path` is the grant root or below it.
    pub fn covers(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantStoreError {
    Io { path: String, message: String },
    Parse { path: String, message: String },
}

impl std::fmt::Display for GrantStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "Grant store I/O error at {}: {}", path, message),
            Self::Parse { path, message } => write!(f, "Couldn't parse grant store {}: {}", path, message),
        }
    }
}

impl std::error::Error for GrantStoreError {}

/// Storage for capability grants. Queried by the sandboxed strategy, written by the consent flow.
pub trait AccessGrantStore: Send + Sync {
    /// All persisted grants.
    fn grants(&self) -> Vec<AccessGrant>;

    /// Stores a grant, replacing any existing grant for the same root.
    fn persist(&self, grant: AccessGrant) -> Result<(), GrantStoreError>;

    /// Removes the grant for `root`. Returns whether one existed.
    fn revoke(&self, root: &Path) -> Result<bool, GrantStoreError>;

    /// The grant whose root is the closest ancestor of (or equal to) `path`.
    fn find(&self, path: &Path) -> Option<AccessGrant> {
        self.grants()
            .into_iter()
            .filter(|grant| grant.covers(path))
            .max_by_key(|grant| grant.root.components().count())
    }
}

fn upsert(grants: &mut Vec<AccessGrant>, grant: AccessGrant) {
    match grants.iter_mut().find(|existing| existing.root == grant.root) {
        Some(existing) => *existing = grant,
        None => grants.push(grant),
    }
}

fn remove(grants: &mut Vec<AccessGrant>, root: &Path) -> bool {
    let before = grants.len();
    grants.retain(|grant| grant.root != root);
    grants.len() != before
}

// ============================================================================
// In-memory store
// ============================================================================

/// Grant store that lives for the process only.
#[derive(Default)]
pub struct MemoryGrantStore {
    grants: RwLock<Vec<AccessGrant>>,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccessGrantStore for MemoryGrantStore {
    fn grants(&self) -> Vec<AccessGrant> {
        self.grants.read_ignore_poison().clone()
    }

    fn persist(&self, grant: AccessGrant) -> Result<(), GrantStoreError> {
        upsert(&mut self.grants.write_ignore_poison(), grant);
        Ok(())
    }

    fn revoke(&self, root: &Path) -> Result<bool, GrantStoreError> {
        Ok(remove(&mut self.grants.write_ignore_poison(), root))
    }
}

// ============================================================================
// JSON file store
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct GrantFile {
    #[serde(default)]
    grants: Vec<AccessGrant>,
}

/// Grant store persisted as a JSON file.
pub struct JsonGrantStore {
    path: PathBuf,
    grants: RwLock<Vec<AccessGrant>>,
}

impl JsonGrantStore {
    /// Opens the store, loading existing grants. A missing file means no grants yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GrantStoreError> {
        let path = path.into();
        let grants = match fs::read_to_string(&path) {
            Ok(contents) => {
                let file: GrantFile = serde_json::from_str(&contents).map_err(|e| GrantStoreError::Parse {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                file.grants
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(GrantStoreError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        };
        log::debug!("Grant store: loaded {} grants from {}", grants.len(), path.display());
        Ok(Self {
            path,
            grants: RwLock::new(grants),
        })
    }

    /// Writes through a temp file so a crash never leaves a truncated store.
    fn save(&self, grants: &[AccessGrant]) -> Result<(), GrantStoreError> {
        let io_error = |e: std::io::Error| GrantStoreError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };
        let file = GrantFile {
            grants: grants.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| GrantStoreError::Parse {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(io_error)?;
        fs::rename(&temp_path, &self.path).map_err(io_error)?;
        Ok(())
    }
}

impl AccessGrantStore for JsonGrantStore {
    fn grants(&self) -> Vec<AccessGrant> {
        self.grants.read_ignore_poison().clone()
    }

    fn persist(&self, grant: AccessGrant) -> Result<(), GrantStoreError> {
        log::info!("Grant store: persisting grant for {}", grant.root.display());
        let mut grants = self.grants.write_ignore_poison();
        let mut updated = grants.clone();
        upsert(&mut updated, grant);
        // Memory only changes once the file does
        self.save(&updated)?;
        *grants = updated;
        Ok(())
    }

    fn revoke(&self, root: &Path) -> Result<bool, GrantStoreError> {
        let mut grants = self.grants.write_ignore_poison();
        let mut updated = grants.clone();
        if !remove(&mut updated, root) {
            return Ok(false);
        }
        self.save(&updated)?;
        *grants = updated;
        log::info!("Grant store: revoked grant for {}", root.display());
        Ok(true)
    }
}
