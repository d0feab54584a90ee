//! Shared environment of the concrete operations: volumes, collaborators and config.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::file_system::access::AccessGrantStore;
use crate::file_system::events::{
    IndexInvalidation, LoggingObserver, NoIndex, OperationEvent, OperationObserver, ProgressReporter,
};
use crate::file_system::types::{OperationId, OperationKind};
use crate::file_system::volume::{DirectVolume, SandboxedVolume, Volume};
use crate::file_system::write_operations::spawn_async_sync;

/// Everything an operation needs besides its arguments. Cheap to clone.
#[derive(Clone)]
pub struct OperationEnv {
    pub direct: Arc<dyn Volume>,
    pub sandboxed: Arc<dyn Volume>,
    pub progress: Arc<dyn ProgressReporter>,
    pub index: Arc<dyn IndexInvalidation>,
    pub observer: Arc<dyn OperationObserver>,
    pub config: Arc<EngineConfig>,
}

impl OperationEnv {
    /// Direct and sandboxed volumes built from the config; events and progress go to the log.
    pub fn new(config: EngineConfig, grants: Arc<dyn AccessGrantStore>) -> Self {
        Self {
            direct: Arc::new(DirectVolume::new(config.sandboxed_roots.clone())),
            sandboxed: Arc::new(SandboxedVolume::new(grants)),
            progress: Arc::new(LoggingObserver),
            index: Arc::new(NoIndex),
            observer: Arc::new(LoggingObserver),
            config: Arc::new(config),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_index(mut self, index: Arc<dyn IndexInvalidation>) -> Self {
        self.index = index;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn OperationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_volumes(mut self, direct: Arc<dyn Volume>, sandboxed: Arc<dyn Volume>) -> Self {
        self.direct = direct;
        self.sandboxed = sandboxed;
        self
    }

    // ========================================
    // Lifecycle forwarding
    // ========================================

    pub(crate) fn started(&self, operation_id: OperationId, operation_type: OperationKind) {
        self.observer.on_event(OperationEvent::Started {
            operation_id,
            operation_type,
        });
    }

    pub(crate) fn requesting_access(&self, operation_id: OperationId, operation_type: OperationKind) {
        self.observer.on_event(OperationEvent::RequestingAccess {
            operation_id,
            operation_type,
        });
    }

    pub(crate) fn access_denied(&self, operation_id: OperationId, operation_type: OperationKind) {
        self.observer.on_event(OperationEvent::AccessDenied {
            operation_id,
            operation_type,
        });
    }

    pub(crate) fn finished(&self, operation_id: OperationId, operation_type: OperationKind, success: bool) {
        if success {
            spawn_async_sync();
        }
        self.observer.on_event(OperationEvent::Finished {
            operation_id,
            operation_type,
            success,
        });
    }
}
