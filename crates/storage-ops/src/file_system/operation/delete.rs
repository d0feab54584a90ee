//! Delete operation.

use super::{DeleteArguments, FileOperation, OperationEnv};
use crate::file_system::types::{OperationId, OperationKind};
use crate::file_system::write_operations::delete_entries;

pub struct DeleteOperation {
    env: OperationEnv,
}

impl DeleteOperation {
    pub fn new(env: OperationEnv) -> Self {
        Self { env }
    }
}

impl FileOperation for DeleteOperation {
    type Arguments = DeleteArguments;

    fn kind(&self) -> OperationKind {
        OperationKind::Delete
    }

    fn operate(&self, _id: OperationId, args: &DeleteArguments) -> bool {
        delete_entries(self.env.direct.as_ref(), self.env.index.as_ref(), args.victims())
    }

    fn operate_sandboxed(&self, _id: OperationId, args: &DeleteArguments) -> bool {
        delete_entries(self.env.sandboxed.as_ref(), self.env.index.as_ref(), args.victims())
    }

    fn on_start_operation(&self, id: OperationId, _args: &DeleteArguments) {
        self.env.started(id, self.kind());
    }

    fn on_result(&self, id: OperationId, success: bool, _args: &DeleteArguments) {
        self.env.finished(id, self.kind(), success);
    }

    fn on_access_denied(&self, id: OperationId) {
        self.env.access_denied(id, self.kind());
    }

    fn on_requesting_access(&self, id: OperationId) {
        self.env.requesting_access(id, self.kind());
    }
}
