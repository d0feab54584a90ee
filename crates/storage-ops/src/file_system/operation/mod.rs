//! Operations and the runner that drives them.
//!
//! A [`FileOperation`] knows how to do its work against the direct volume (`operate`) and
//! against the sandboxed one (`operate_sandboxed`), and how to report its lifecycle. The
//! [`OperationRunner`] decides which of those to call, when to ask for access, and makes sure
//! exactly one terminal hook fires per request.

mod arguments;
mod compress;
mod copy;
mod create_directory;
mod delete;
mod env;
mod extract;
mod move_op;
mod rename;
mod runner;

pub use arguments::{
    ArgumentsError, CompressArguments, CopyArguments, CreateDirectoryArguments, DeleteArguments, ExtractArguments,
    MoveArguments, RenameArguments,
};
pub use compress::CompressOperation;
pub use copy::CopyOperation;
pub use create_directory::CreateDirectoryOperation;
pub use delete::DeleteOperation;
pub use env::OperationEnv;
pub use extract::ExtractOperation;
pub use move_op::MoveOperation;
pub use rename::RenameOperation;
pub use runner::{OperationRunner, RunOutcome, RunReport};

use std::path::Path;

use super::types::{OperationId, OperationKind};

/// Arguments of an operation. Immutable for the duration of a request.
pub trait OperationArguments: Send + Sync + 'static {
    /// Path whose write access decides whether the operation can run (destination
    /// directory, archive path, rename target...).
    fn target(&self) -> &Path;
}

/// A storage operation the runner can drive.
///
/// `operate` and `operate_sandboxed` run on a blocking worker. The hooks run wherever the
/// runner is awaited; implementations forward them to their observers.
pub trait FileOperation: Send + Sync + 'static {
    type Arguments: OperationArguments;

    fn kind(&self) -> OperationKind;

    /// Does the work through raw paths.
    fn operate(&self, id: OperationId, args: &Self::Arguments) -> bool;

    /// Does the work through the granted document tree.
    fn operate_sandboxed(&self, id: OperationId, args: &Self::Arguments) -> bool;

    /// Called at the start of every attempt, so possibly more than once per request.
    fn on_start_operation(&self, id: OperationId, args: &Self::Arguments);

    fn on_result(&self, id: OperationId, success: bool, args: &Self::Arguments);

    fn on_access_denied(&self, id: OperationId);

    fn on_requesting_access(&self, id: OperationId);

    /// Whether a failure may be caused by missing write access.
    fn needs_write_access(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod operations_test;
