//! Grant-based access on storage that refuses raw-path writes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{AccessGrantStore, AccessListener, AccessOutcome, ConsentFlow, DirectAccess};

pub struct SandboxedAccess {
    grants: Arc<dyn AccessGrantStore>,
    consent: Arc<dyn ConsentFlow>,
    probe: DirectAccess,
    storage_roots: Vec<PathBuf>,
}

impl SandboxedAccess {
    pub fn new(
        grants: Arc<dyn AccessGrantStore>,
        consent: Arc<dyn ConsentFlow>,
        probe: DirectAccess,
        storage_roots: Vec<PathBuf>,
    ) -> Self {
        Self {
            grants,
            consent,
            probe,
            storage_roots,
        }
    }

    /// A covering grant, or a passing raw write probe.
    pub fn has_write_access(&self, path: &Path) -> bool {
        self.permission_granted(path) || self.probe.has_write_access(path)
    }

    /// Whether a writable grant covers the storage root of `path` (or `path` itself), and the
    /// granted tree is still there.
    fn permission_granted(&self, path: &Path) -> bool {
        let storage_root = self.storage_root_of(path);
        self.grants.grants().iter().any(|grant| {
            let covers = storage_root.is_some_and(|root| grant.covers(root)) || grant.covers(path);
            covers && grant.writable && grant.root.is_dir()
        })
    }

    /// Longest configured storage root containing `path`.
    fn storage_root_of(&self, path: &Path) -> Option<&Path> {
        self.storage_roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }

    /// Runs the consent flow and reconciles the user's answer with the grants that now exist.
    ///
    /// A user who confirms but picked a tree that doesn't cover `path` gets `Error`, so the
    /// runner asks again.
    pub async fn request_write_access(&self, path: &Path) -> AccessOutcome {
        let (listener, answer) = AccessListener::channel();
        log::info!("Access: requesting a grant for {}", path.display());
        self.consent.request(path, listener);

        let raw = match answer.await {
            Ok(outcome) => outcome,
            Err(_) => {
                log::warn!("Access: consent flow dropped the request for {} unanswered", path.display());
                AccessOutcome::Denied
            }
        };

        if self.has_write_access(path) {
            return AccessOutcome::Granted;
        }
        match raw {
            AccessOutcome::Denied => AccessOutcome::Denied,
            AccessOutcome::Granted => {
                log::warn!("Access: granted tree doesn't cover {}", path.display());
                AccessOutcome::Error
            }
            AccessOutcome::Error => AccessOutcome::Error,
        }
    }
}
