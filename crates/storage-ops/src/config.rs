//! Engine configuration loaded from a JSON file.
//!
//! Every field is optional in the file; missing fields take the defaults below. Keys are
//! camelCase so the same file can be shared with a frontend settings store.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the JSON config file read by [`load_config_from_env`].
pub const CONFIG_ENV_VAR: &str = "STORAGE_OPS_CONFIG";

/// Compression used for archive entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveCompression {
    Stored,
    #[default]
    Deflated,
}

/// Tunables for the storage engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Buffer size for streaming file contents during copy and move
    #[serde(default = "default_copy_buffer_size")]
    pub copy_buffer_size: usize,
    /// Buffer size for streaming entries during compress and extract
    #[serde(default = "default_archive_buffer_size")]
    pub archive_buffer_size: usize,
    #[serde(default)]
    pub compression: ArchiveCompression,
    /// How many times one invocation may ask the consent flow for a grant
    #[serde(default = "default_max_access_requests")]
    pub max_access_requests: u32,
    /// Storage roots that refuse raw-path writes (removable media). Writes below them
    /// only succeed through a capability grant.
    #[serde(default)]
    pub sandboxed_roots: Vec<PathBuf>,
    /// JSON file backing the persisted grant store
    #[serde(default)]
    pub grant_store_path: Option<PathBuf>,
    /// Name prefix of the marker files created by the write probe
    #[serde(default = "default_probe_file_prefix")]
    pub probe_file_prefix: String,
}

fn default_copy_buffer_size() -> usize {
    32 * 1024
}

fn default_archive_buffer_size() -> usize {
    16 * 1024
}

fn default_max_access_requests() -> u32 {
    3
}

fn default_probe_file_prefix() -> String {
    "WriteAccessCheck".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            copy_buffer_size: default_copy_buffer_size(),
            archive_buffer_size: default_archive_buffer_size(),
            compression: ArchiveCompression::default(),
            max_access_requests: default_max_access_requests(),
            sandboxed_roots: Vec::new(),
            grant_store_path: None,
            probe_file_prefix: default_probe_file_prefix(),
        }
    }
}

impl EngineConfig {
    /// Checks values serde can't reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.copy_buffer_size == 0 {
            return Err(ConfigError::Invalid {
                field: "copyBufferSize".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.archive_buffer_size == 0 {
            return Err(ConfigError::Invalid {
                field: "archiveBufferSize".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.probe_file_prefix.is_empty() || self.probe_file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                field: "probeFilePrefix".to_string(),
                reason: "must be a non-empty file name".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, message: String },
    Parse { path: String, message: String },
    Invalid { field: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "Couldn't read config {}: {}", path, message),
            Self::Parse { path, message } => write!(f, "Couldn't parse config {}: {}", path, message),
            Self::Invalid { field, reason } => write!(f, "Invalid config value for {}: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Reads and validates a config file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let config = parse_config(&contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    config.validate()?;
    log::debug!("Config: loaded {}", path.display());
    Ok(config)
}

/// Reads the config file named by `STORAGE_OPS_CONFIG`, or returns defaults when it's unset.
pub fn load_config_from_env() -> Result<EngineConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => load_config(Path::new(&path)),
        _ => Ok(EngineConfig::default()),
    }
}

pub(crate) fn parse_config(contents: &str) -> Result<EngineConfig, serde_json::Error> {
    serde_json::from_str(contents)
}
