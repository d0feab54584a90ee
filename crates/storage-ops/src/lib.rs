//! Storage mutation engine for a file manager.
//!
//! Copy, move, delete, rename, create-directory, compress and extract run against the
//! file system directly first. When a write is refused and the storage needs a user-granted
//! capability (a document tree grant on removable media), the [`OperationRunner`] asks the
//! consent flow for one and retries through the sandboxed volume.

// Deny unused code to catch dead code early
#![deny(unused)]
// Warn on unused dependencies to catch platform-specific cfg mismatches
#![warn(unused_crate_dependencies)]
// Warn on redundant path prefixes (e.g., std::path::Path when Path is imported)
#![warn(unused_qualifications)]
// Use log::* macros instead of println!/eprintln! for proper log level control
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod engine;
pub mod file_system;
mod ignore_poison;
pub mod logging;


pub use config::{ArchiveCompression, ConfigError, EngineConfig, load_config, load_config_from_env};
pub use engine::StorageEngine;
pub use file_system::access::{
    AccessGrant, AccessGrantStore, AccessListener, AccessOutcome, AccessStrategy, ConsentFlow, DirectAccess,
    GrantStoreError, GrantToken, JsonGrantStore, MemoryGrantStore, SandboxedAccess,
};
pub use file_system::archive::{ArchiveEntry, ArchiveError, list_entries};
pub use file_system::events::{
    ChannelObserver, IndexInvalidation, LoggingObserver, NoIndex, OperationEvent, OperationObserver, ProgressReporter,
    ProgressUpdate,
};
pub use file_system::operation::{
    ArgumentsError, CompressArguments, CompressOperation, CopyArguments, CopyOperation, CreateDirectoryArguments,
    CreateDirectoryOperation, DeleteArguments, DeleteOperation, ExtractArguments, ExtractOperation, FileOperation,
    MoveArguments, MoveOperation, OperationArguments, OperationEnv, OperationRunner, RenameArguments, RenameOperation,
    RunOutcome, RunReport,
};
pub use file_system::paths::{count_files_in, count_files_under, paths_under, unique_destination};
pub use file_system::types::{FileHandle, OperationId, OperationKind, ProgressState};
pub use file_system::volume::{DirectVolume, FileSink, SandboxedVolume, Volume, VolumeError};
