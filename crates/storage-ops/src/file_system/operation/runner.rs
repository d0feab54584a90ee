//! Retry/fallback state machine.
//!
//! ```text
//! Start -> DirectAttempt -> success or access not needed      -> Result
//!                        -> failed, access needed             -> AccessCheck
//! AccessCheck            -> has access, sandboxed strategy    -> SandboxedAttempt -> Result
//!                        -> has access, direct strategy       -> Result(false)
//!                        -> no access                         -> RequestAccess
//! RequestAccess          -> granted or error                  -> Start
//!                        -> denied                            -> AccessDenied
//! ```
//!
//! Restarts loop instead of recursing. Consent requests are counted per request and capped,
//! so a consent flow that keeps failing ends in `Result(false)` instead of prompting forever.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{FileOperation, OperationArguments};
use crate::file_system::access::{AccessOutcome, AccessStrategy};
use crate::file_system::types::OperationId;

/// Terminal outcome of a request. Exactly one per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunOutcome {
    /// `on_result` was delivered
    Finished { success: bool },
    /// `on_access_denied` was delivered
    AccessDenied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub operation_id: OperationId,
    pub outcome: RunOutcome,
    /// How many times the operation was started (1 + restarts)
    pub attempts: u32,
}

/// Bookkeeping for one request across its restarts.
#[derive(Debug, Default)]
struct AttemptState {
    attempts: u32,
    access_requests: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Direct,
    Sandboxed,
}

pub struct OperationRunner {
    access: Arc<AccessStrategy>,
    max_access_requests: u32,
}

impl OperationRunner {
    pub fn new(access: Arc<AccessStrategy>, max_access_requests: u32) -> Self {
        Self {
            access,
            max_access_requests,
        }
    }

    pub fn access(&self) -> &AccessStrategy {
        &self.access
    }

    /// Runs `operation` to its terminal outcome.
    pub async fn invoke<O: FileOperation>(&self, operation: Arc<O>, args: Arc<O::Arguments>) -> RunReport {
        let id = OperationId::new();
        let kind = operation.kind();
        let target = args.target().to_path_buf();
        let mut state = AttemptState::default();

        loop {
            state.attempts += 1;
            log::debug!("OperationRunner: {} attempt {} (id={})", kind, state.attempts, id);
            operation.on_start_operation(id, &args);

            let success = run_attempt(&operation, &args, id, Attempt::Direct).await;
            if success || !operation.needs_write_access() {
                return finish(operation.as_ref(), &args, id, success, &state);
            }

            if self.check_access(target.clone()).await {
                let success = if self.access.is_sandboxed() {
                    log::info!("OperationRunner: {} retrying through the granted tree (id={})", kind, id);
                    run_attempt(&operation, &args, id, Attempt::Sandboxed).await
                } else {
                    // Writable, so the failure wasn't about permissions
                    false
                };
                return finish(operation.as_ref(), &args, id, success, &state);
            }

            if state.access_requests >= self.max_access_requests {
                log::warn!(
                    "OperationRunner: {} still has no write access to {} after {} requests, giving up (id={})",
                    kind,
                    target.display(),
                    state.access_requests,
                    id
                );
                return finish(operation.as_ref(), &args, id, false, &state);
            }
            state.access_requests += 1;
            operation.on_requesting_access(id);

            match self.access.request_write_access(&target).await {
                AccessOutcome::Granted => {
                    log::info!("OperationRunner: {} access granted, restarting (id={})", kind, id);
                }
                AccessOutcome::Error => {
                    log::warn!("OperationRunner: {} consent flow failed, restarting (id={})", kind, id);
                }
                AccessOutcome::Denied => {
                    log::info!("OperationRunner: {} access denied (id={})", kind, id);
                    operation.on_access_denied(id);
                    return RunReport {
                        operation_id: id,
                        outcome: RunOutcome::AccessDenied,
                        attempts: state.attempts,
                    };
                }
            }
        }
    }

    /// Runs `operation` on the tokio runtime.
    pub fn spawn<O: FileOperation>(
        self: &Arc<Self>,
        operation: Arc<O>,
        args: Arc<O::Arguments>,
    ) -> JoinHandle<RunReport> {
        let runner = Arc::clone(self);
        tokio::spawn(async move { runner.invoke(operation, args).await })
    }

    /// The write probe touches storage, so it runs on the blocking pool too.
    async fn check_access(&self, target: PathBuf) -> bool {
        let access = Arc::clone(&self.access);
        match tokio::task::spawn_blocking(move || access.has_write_access(&target)).await {
            Ok(has_access) => has_access,
            Err(e) => {
                log::error!("OperationRunner: access check panicked: {}", e);
                false
            }
        }
    }
}

fn finish<O: FileOperation>(
    operation: &O,
    args: &O::Arguments,
    id: OperationId,
    success: bool,
    state: &AttemptState,
) -> RunReport {
    operation.on_result(id, success, args);
    RunReport {
        operation_id: id,
        outcome: RunOutcome::Finished { success },
        attempts: state.attempts,
    }
}

async fn run_attempt<O: FileOperation>(
    operation: &Arc<O>,
    args: &Arc<O::Arguments>,
    id: OperationId,
    attempt: Attempt,
) -> bool {
    let operation = Arc::clone(operation);
    let args = Arc::clone(args);
    let result = tokio::task::spawn_blocking(move || match attempt {
        Attempt::Direct => operation.operate(id, &args),
        Attempt::Sandboxed => operation.operate_sandboxed(id, &args),
    })
    .await;
    match result {
        Ok(success) => success,
        Err(e) => {
            log::error!("OperationRunner: {:?} attempt panicked: {}", attempt, e);
            false
        }
    }
}
