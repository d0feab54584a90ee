//! File system module - volumes, access strategies, tree operations and archives.
//!
//! Everything that touches storage lives here. The `operation` submodule wires the tree
//! operations and the archive codec into the retry/fallback runner.

pub mod access;
pub mod archive;
pub mod events;
pub mod operation;
pub mod paths;
pub mod types;
pub mod volume;
pub(crate) mod write_operations;

#[cfg(test)]
pub(crate) mod test_support;
