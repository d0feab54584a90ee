//! Access strategies: how the engine learns whether it may write a path, and how it asks
//! for permission when it may not.
//!
//! There are exactly two strategies. [`DirectAccess`] probes raw paths and has no way to
//! obtain more access. [`SandboxedAccess`] also consults persisted capability grants and can
//! ask the user for a new one through a [`ConsentFlow`].

mod direct;
mod grants;
mod sandboxed;

pub use direct::DirectAccess;
pub use grants::{AccessGrant, AccessGrantStore, GrantStoreError, GrantToken, JsonGrantStore, MemoryGrantStore};
pub use sandboxed::SandboxedAccess;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::oneshot;

/// Answer to a write-access request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    Granted,
    Denied,
    /// The consent flow failed or its answer doesn't cover the requested path
    Error,
}

/// One-shot answer channel handed to a [`ConsentFlow`].
///
/// Every answering method consumes the listener, so a request resolves at most once.
#[derive(Debug)]
pub struct AccessListener {
    sender: oneshot::Sender<AccessOutcome>,
}

impl AccessListener {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<AccessOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    pub fn granted(self) {
        self.resolve(AccessOutcome::Granted);
    }

    pub fn denied(self) {
        self.resolve(AccessOutcome::Denied);
    }

    pub fn error(self) {
        self.resolve(AccessOutcome::Error);
    }

    pub fn resolve(self, outcome: AccessOutcome) {
        if self.sender.send(outcome).is_err() {
            log::debug!("Access request answered with {:?} after it was abandoned", outcome);
        }
    }
}

/// User-facing flow that obtains a capability grant.
///
/// Implementations persist the grant they obtain in the grant store before answering
/// `granted`. The answer may come later and from any thread.
pub trait ConsentFlow: Send + Sync {
    fn request(&self, path: &Path, listener: AccessListener);
}

/// The access strategy in effect for a device.
pub enum AccessStrategy {
    Direct(DirectAccess),
    Sandboxed(SandboxedAccess),
}

impl AccessStrategy {
    /// Whether the engine may write `path` right now.
    pub fn has_write_access(&self, path: &Path) -> bool {
        match self {
            Self::Direct(direct) => direct.has_write_access(path),
            Self::Sandboxed(sandboxed) => sandboxed.has_write_access(path),
        }
    }

    /// Asks for write access to `path`, suspending until the answer arrives.
    pub async fn request_write_access(&self, path: &Path) -> AccessOutcome {
        match self {
            Self::Direct(_) => {
                log::info!(
                    "Access: no way to obtain access to {} without a document tree grant",
                    path.display()
                );
                AccessOutcome::Denied
            }
            Self::Sandboxed(sandboxed) => sandboxed.request_write_access(path).await,
        }
    }

    /// Whether failed attempts can be retried through the sandboxed volume.
    pub fn is_sandboxed(&self) -> bool {
        matches!(self, Self::Sandboxed(_))
    }
}

#[cfg(test)]
mod access_test;
