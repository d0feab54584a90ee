//! Collaborators the engine reports to: progress, index invalidation and lifecycle events.
//!
//! None of these return anything the engine consumes. Implementations decide where the
//! reports go; [`ChannelObserver`] forwards them to whichever task owns the receiver, which
//! is how callers get them delivered on their own context.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::types::{OperationId, OperationKind};

// ============================================================================
// Progress
// ============================================================================

/// Progress report sent after each item of a copy, move, compress or extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub operation_id: OperationId,
    pub operation_type: OperationKind,
    pub completed: usize,
    pub total: usize,
    /// Item being processed (file name only, not full path)
    pub current_item: Option<String>,
    /// Where the item is going or coming from (destination directory, archive name)
    pub context_name: Option<String>,
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

/// Discards progress. Used for the nested copy of a move fallback.
pub(crate) struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _update: &ProgressUpdate) {}
}

// ============================================================================
// Index invalidation
// ============================================================================

/// Keeps an external content index in step with storage. Paths are the final,
/// post-operation paths.
pub trait IndexInvalidation: Send + Sync {
    fn paths_removed(&self, paths: &[String]);
    fn path_added(&self, path: &str, is_directory: bool);
}

/// For callers without a content index.
pub struct NoIndex;

impl IndexInvalidation for NoIndex {
    fn paths_removed(&self, _paths: &[String]) {}
    fn path_added(&self, _path: &str, _is_directory: bool) {}
}

// ============================================================================
// Lifecycle events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationEvent {
    #[serde(rename_all = "camelCase")]
    Started {
        operation_id: OperationId,
        operation_type: OperationKind,
    },
    Progress(ProgressUpdate),
    #[serde(rename_all = "camelCase")]
    RequestingAccess {
        operation_id: OperationId,
        operation_type: OperationKind,
    },
    #[serde(rename_all = "camelCase")]
    AccessDenied {
        operation_id: OperationId,
        operation_type: OperationKind,
    },
    #[serde(rename_all = "camelCase")]
    Finished {
        operation_id: OperationId,
        operation_type: OperationKind,
        success: bool,
    },
}

/// Receives the lifecycle events of operations.
pub trait OperationObserver: Send + Sync {
    fn on_event(&self, event: OperationEvent);
}

/// Logs events and progress.
pub struct LoggingObserver;

impl OperationObserver for LoggingObserver {
    fn on_event(&self, event: OperationEvent) {
        match event {
            OperationEvent::Started {
                operation_id,
                operation_type,
            } => log::info!("{}: started (id={})", operation_type, operation_id),
            OperationEvent::Progress(update) => log::debug!(
                "{}: {}/{} {}",
                update.operation_type,
                update.completed,
                update.total,
                update.current_item.unwrap_or_default()
            ),
            OperationEvent::RequestingAccess {
                operation_id,
                operation_type,
            } => log::info!("{}: requesting write access (id={})", operation_type, operation_id),
            OperationEvent::AccessDenied {
                operation_id,
                operation_type,
            } => log::info!("{}: write access denied (id={})", operation_type, operation_id),
            OperationEvent::Finished {
                operation_id,
                operation_type,
                success,
            } => log::info!("{}: finished, success={} (id={})", operation_type, success, operation_id),
        }
    }
}

impl ProgressReporter for LoggingObserver {
    fn report(&self, update: &ProgressUpdate) {
        self.on_event(OperationEvent::Progress(update.clone()));
    }
}

/// Re-delivers events over an unbounded channel to the task that owns the receiver.
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<OperationEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OperationEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl OperationObserver for ChannelObserver {
    fn on_event(&self, event: OperationEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("Event receiver is gone, dropping event");
        }
    }
}

impl ProgressReporter for ChannelObserver {
    fn report(&self, update: &ProgressUpdate) {
        self.on_event(OperationEvent::Progress(update.clone()));
    }
}
