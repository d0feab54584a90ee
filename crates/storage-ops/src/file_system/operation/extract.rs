//! Extract operation.

use super::{ExtractArguments, FileOperation, OperationArguments, OperationEnv};
use crate::file_system::archive::Extractor;
use crate::file_system::types::{OperationId, OperationKind};
use crate::file_system::volume::Volume;

pub struct ExtractOperation {
    env: OperationEnv,
}

impl ExtractOperation {
    pub fn new(env: OperationEnv) -> Self {
        Self { env }
    }

    fn extract_with(&self, volume: &dyn Volume, id: OperationId, args: &ExtractArguments) -> bool {
        let extractor = Extractor::new(volume, self.env.progress.as_ref(), id, self.env.config.archive_buffer_size);
        match extractor.extract(args.archives(), args.target()) {
            Ok(entries) => {
                log::info!("Extract: wrote {} entries to {}", entries, args.target().display());
                true
            }
            Err(e) => {
                log::warn!("Extract: into {} failed: {}", args.target().display(), e);
                false
            }
        }
    }
}

impl FileOperation for ExtractOperation {
    type Arguments = ExtractArguments;

    fn kind(&self) -> OperationKind {
        OperationKind::Extract
    }

    fn operate(&self, id: OperationId, args: &ExtractArguments) -> bool {
        self.extract_with(self.env.direct.as_ref(), id, args)
    }

    fn operate_sandboxed(&self, id: OperationId, args: &ExtractArguments) -> bool {
        self.extract_with(self.env.sandboxed.as_ref(), id, args)
    }

    fn on_start_operation(&self, id: OperationId, _args: &ExtractArguments) {
        self.env.started(id, self.kind());
    }

    /// The destination directory is kept on failure: it may have existed before.
    fn on_result(&self, id: OperationId, success: bool, args: &ExtractArguments) {
        if success {
            self.env.index.path_added(&args.target().to_string_lossy(), true);
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
