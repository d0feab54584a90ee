//! Copy operation.

use super::{CopyArguments, FileOperation, OperationArguments, OperationEnv};
use crate::file_system::types::{OperationId, OperationKind};
use crate::file_system::volume::Volume;
use crate::file_system::write_operations::Copier;

pub struct CopyOperation {
    env: OperationEnv,
}

impl CopyOperation {
    pub fn new(env: OperationEnv) -> Self {
        Self { env }
    }

    fn copy_with(&self, volume: &dyn Volume, id: OperationId, args: &CopyArguments) -> bool {
        Copier::new(
            volume,
            self.env.progress.as_ref(),
            self.env.index.as_ref(),
            id,
            OperationKind::Copy,
            self.env.config.copy_buffer_size,
        )
        .copy(args.files(), args.target())
        .succeeded()
    }
}

impl FileOperation for CopyOperation {
    type Arguments = CopyArguments;

    fn kind(&self) -> OperationKind {
        OperationKind::Copy
    }

    fn operate(&self, id: OperationId, args: &CopyArguments) -> bool {
        self.copy_with(self.env.direct.as_ref(), id, args)
    }

    fn operate_sandboxed(&self, id: OperationId, args: &CopyArguments) -> bool {
        self.copy_with(self.env.sandboxed.as_ref(), id, args)
    }

    fn on_start_operation(&self, id: OperationId, _args: &CopyArguments) {
        self.env.started(id, self.kind());
    }

    fn on_result(&self, id: OperationId, success: bool, _args: &CopyArguments) {
        self.env.finished(id, self.kind(), success);
    }

    fn on_access_denied(&self, id: OperationId) {
        self.env.access_denied(id, self.kind());
    }

    fn on_requesting_access(&self, id: OperationId) {
        self.env.requesting_access(id, self.kind());
    }
}
