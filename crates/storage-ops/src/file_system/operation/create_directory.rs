//! Create-directory operation.

use super::{CreateDirectoryArguments, FileOperation, OperationArguments, OperationEnv};
use crate::file_system::types::{OperationId, OperationKind};
use crate::file_system::write_operations::create_directory;

pub struct CreateDirectoryOperation {
    env: OperationEnv,
}

impl CreateDirectoryOperation {
    pub fn new(env: OperationEnv) -> Self {
        Self { env }
    }
}

impl FileOperation for CreateDirectoryOperation {
    type Arguments = CreateDirectoryArguments;

    fn kind(&self) -> OperationKind {
        OperationKind::CreateDirectory
    }

    fn operate(&self, _id: OperationId, args: &CreateDirectoryArguments) -> bool {
        create_directory(self.env.direct.as_ref(), self.env.index.as_ref(), args.target())
    }

    fn operate_sandboxed(&self, _id: OperationId, args: &CreateDirectoryArguments) -> bool {
        create_directory(self.env.sandboxed.as_ref(), self.env.index.as_ref(), args.target())
    }

    fn on_start_operation(&self, id: OperationId, _args: &CreateDirectoryArguments) {
        self.env.started(id, self.kind());
    }

    fn on_result(&self, id: OperationId, success: bool, _args: &CreateDirectoryArguments) {
        self.env.finished(id, self.kind(), success);
    }

    fn on_access_denied(&self, id: OperationId) {
        self.env.access_denied(id, self.kind());
    }

    fn on_requesting_access(&self, id: OperationId) {
        self.env.requesting_access(id, self.kind());
    }
}
