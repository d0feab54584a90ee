//! Rename operation.

use super::{FileOperation, OperationArguments, OperationEnv, RenameArguments};
use crate::file_system::types::{OperationId, OperationKind};
use crate::file_system::write_operations::rename_entry;

pub struct RenameOperation {
    env: OperationEnv,
}

impl RenameOperation {
    pub fn new(env: OperationEnv) -> Self {
        Self { env }
    }
}

impl FileOperation for RenameOperation {
    type Arguments = RenameArguments;

    fn kind(&self) -> OperationKind {
        OperationKind::Rename
    }

    fn operate(&self, _id: OperationId, args: &RenameArguments) -> bool {
        rename_entry(self.env.direct.as_ref(), self.env.index.as_ref(), args.file(), args.target())
    }

    fn operate_sandboxed(&self, _id: OperationId, args: &RenameArguments) -> bool {
        rename_entry(self.env.sandboxed.as_ref(), self.env.index.as_ref(), args.file(), args.target())
    }

    fn on_start_operation(&self, id: OperationId, _args: &RenameArguments) {
        self.env.started(id, self.kind());
    }

    fn on_result(&self, id: OperationId, success: bool, _args: &RenameArguments) {
        self.env.finished(id, self.kind(), success);
    }

    fn on_access_denied(&self, id: OperationId) {
        self.env.access_denied(id, self.kind());
    }

    fn on_requesting_access(&self, id: OperationId) {
        self.env.requesting_access(id, self.kind());
    }
}
