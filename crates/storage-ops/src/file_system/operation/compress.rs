//! Compress operation.

use super::{CompressArguments, FileOperation, OperationArguments, OperationEnv};
use crate::file_system::archive::Compressor;
use crate::file_system::types::{OperationId, OperationKind};
use crate::file_system::volume::Volume;
use crate::file_system::write_operations::delete_with_fallback;

pub struct CompressOperation {
    env: OperationEnv,
}

impl CompressOperation {
    pub fn new(env: OperationEnv) -> Self {
        Self { env }
    }

    fn compress_with(&self, volume: &dyn Volume, id: OperationId, args: &CompressArguments) -> bool {
        let compressor = Compressor::new(
            volume,
            self.env.progress.as_ref(),
            id,
            self.env.config.archive_buffer_size,
            self.env.config.compression,
        );
        match compressor.compress(args.files(), args.target()) {
            Ok(files) => {
                log::info!("Compress: wrote {} files to {}", files, args.target().display());
                true
            }
            Err(e) => {
                log::warn!("Compress: {} failed: {}", args.target().display(), e);
                false
            }
        }
    }
}

impl FileOperation for CompressOperation {
    type Arguments = CompressArguments;

    fn kind(&self) -> OperationKind {
        OperationKind::Compress
    }

    fn operate(&self, id: OperationId, args: &CompressArguments) -> bool {
        self.compress_with(self.env.direct.as_ref(), id, args)
    }

    fn operate_sandboxed(&self, id: OperationId, args: &CompressArguments) -> bool {
        self.compress_with(self.env.sandboxed.as_ref(), id, args)
    }

    fn on_start_operation(&self, id: OperationId, _args: &CompressArguments) {
        self.env.started(id, self.kind());
    }

    /// A failed compress leaves no partial archive behind.
    fn on_result(&self, id: OperationId, success: bool, args: &CompressArguments) {
        let archive = args.target();
        if success {
            self.env.index.path_added(&archive.to_string_lossy(), false);
        } else if self.env.direct.exists(archive) {
            let volumes = [self.env.direct.as_ref(), self.env.sandboxed.as_ref()];
            if !delete_with_fallback(&volumes, archive) {
                log::warn!("Compress: couldn't remove partial archive {}", archive.display());
            }
        }
        self.env.finished(id, self.kind(), success);
    }

    fn on_access_denied(&self, id: OperationId) {
        self.env.access_denied(id, self.kind());
    }

    fn on_requesting_access(&self, id: OperationId) {
        self.env.requesting_access(id, self.kind());
    }
}
