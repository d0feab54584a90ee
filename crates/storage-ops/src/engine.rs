//! Engine facade: builds the access strategy, volumes and runner from a config and exposes
//! one async method per operation kind.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::file_system::access::{
    AccessGrantStore, AccessStrategy, ConsentFlow, DirectAccess, GrantStoreError, JsonGrantStore, MemoryGrantStore,
    SandboxedAccess,
};
use crate::file_system::events::{IndexInvalidation, OperationObserver, ProgressReporter};
use crate::file_system::operation::{
    CompressArguments, CompressOperation, CopyArguments, CopyOperation, CreateDirectoryArguments,
    CreateDirectoryOperation, DeleteArguments, DeleteOperation, ExtractArguments, ExtractOperation, FileOperation,
    MoveArguments, MoveOperation, OperationEnv, OperationRunner, RenameArguments, RenameOperation, RunReport,
};

pub struct StorageEngine {
    env: OperationEnv,
    runner: Arc<OperationRunner>,
}

impl StorageEngine {
    /// The sandboxed strategy is used when the config names storage roots that need grants.
    pub fn new(config: EngineConfig, grants: Arc<dyn AccessGrantStore>, consent: Arc<dyn ConsentFlow>) -> Self {
        let probe = DirectAccess::from_config(&config);
        let strategy = if config.sandboxed_roots.is_empty() {
            AccessStrategy::Direct(probe)
        } else {
            AccessStrategy::Sandboxed(SandboxedAccess::new(
                Arc::clone(&grants),
                consent,
                probe,
                config.sandboxed_roots.clone(),
            ))
        };
        log::info!(
            "StorageEngine: {} access strategy, {} sandboxed roots",
            if strategy.is_sandboxed() { "sandboxed" } else { "direct" },
            config.sandboxed_roots.len()
        );
        let runner = Arc::new(OperationRunner::new(Arc::new(strategy), config.max_access_requests));
        Self {
            env: OperationEnv::new(config, grants),
            runner,
        }
    }

    /// Like [`new`](Self::new), with grants kept in the config's grant store file (or in
    /// memory when it names none).
    pub fn from_config(config: EngineConfig, consent: Arc<dyn ConsentFlow>) -> Result<Self, GrantStoreError> {
        let grants: Arc<dyn AccessGrantStore> = match &config.grant_store_path {
            Some(path) => Arc::new(JsonGrantStore::open(path)?),
            None => Arc::new(MemoryGrantStore::new()),
        };
        Ok(Self::new(config, grants, consent))
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.env = self.env.with_progress(progress);
        self
    }

    pub fn with_index(mut self, index: Arc<dyn IndexInvalidation>) -> Self {
        self.env = self.env.with_index(index);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn OperationObserver>) -> Self {
        self.env = self.env.with_observer(observer);
        self
    }

    pub fn env(&self) -> &OperationEnv {
        &self.env
    }

    pub fn runner(&self) -> &Arc<OperationRunner> {
        &self.runner
    }

    async fn run<O: FileOperation>(&self, operation: O, args: O::Arguments) -> RunReport {
        self.runner.invoke(Arc::new(operation), Arc::new(args)).await
    }

    pub async fn copy(&self, args: CopyArguments) -> RunReport {
        self.run(CopyOperation::new(self.env.clone()), args).await
    }

    pub async fn move_files(&self, args: MoveArguments) -> RunReport {
        self.run(MoveOperation::new(self.env.clone()), args).await
    }

    pub async fn delete(&self, args: DeleteArguments) -> RunReport {
        self.run(DeleteOperation::new(self.env.clone()), args).await
    }

    pub async fn rename(&self, args: RenameArguments) -> RunReport {
        self.run(RenameOperation::new(self.env.clone()), args).await
    }

    pub async fn create_directory(&self, args: CreateDirectoryArguments) -> RunReport {
        self.run(CreateDirectoryOperation::new(self.env.clone()), args).await
    }

    pub async fn compress(&self, args: CompressArguments) -> RunReport {
        self.run(CompressOperation::new(self.env.clone()), args).await
    }

    pub async fn extract(&self, args: ExtractArguments) -> RunReport {
        self.run(ExtractOperation::new(self.env.clone()), args).await
    }
}
