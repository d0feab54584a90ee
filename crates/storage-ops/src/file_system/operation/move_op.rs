//! Move operation.

use super::{FileOperation, MoveArguments, OperationArguments, OperationEnv};
use crate::file_system::types::{OperationId, OperationKind};
use crate::file_system::volume::Volume;
use crate::file_system::write_operations::Mover;

pub struct MoveOperation {
    env: OperationEnv,
}

impl MoveOperation {
    pub fn new(env: OperationEnv) -> Self {
        Self { env }
    }

    fn move_with(&self, volume: &dyn Volume, cleanup: &[&dyn Volume], id: OperationId, args: &MoveArguments) -> bool {
        Mover::new(
            volume,
            cleanup,
            self.env.progress.as_ref(),
            self.env.index.as_ref(),
            id,
            self.env.config.copy_buffer_size,
        )
        .move_all(args.files(), args.target())
    }
}

impl FileOperation for MoveOperation {
    type Arguments = MoveArguments;

    fn kind(&self) -> OperationKind {
        OperationKind::Move
    }

    fn operate(&self, id: OperationId, args: &MoveArguments) -> bool {
        let direct = self.env.direct.as_ref();
        self.move_with(direct, &[direct], id, args)
    }

    /// Sources outside the granted tree can still be deleted directly after the copy fallback.
    fn operate_sandboxed(&self, id: OperationId, args: &MoveArguments) -> bool {
        let direct = self.env.direct.as_ref();
        let sandboxed = self.env.sandboxed.as_ref();
        self.move_with(sandboxed, &[direct, sandboxed], id, args)
    }

    fn on_start_operation(&self, id: OperationId, _args: &MoveArguments) {
        self.env.started(id, self.kind());
    }

    fn on_result(&self, id: OperationId, success: bool, _args: &MoveArguments) {
        self.env.finished(id, self.kind(), success);
    }

    fn on_access_denied(&self, id: OperationId) {
        self.env.access_denied(id, self.kind());
    }

    fn on_requesting_access(&self, id: OperationId) {
        self.env.requesting_access(id, self.kind());
    }
}
