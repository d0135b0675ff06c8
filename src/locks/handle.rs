//! The lock handle and its release path.

use crate::journal::{Journal, JournalAction, JournalEvent};
use std::fs::{self, File};
use std::os::fd::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

/// Descriptor and path of a held lock. They only ever move together.
#[derive(Debug)]
struct Held {
    file: File,
    path: PathBuf,
}

/// An acquired advisory lock.
///
/// Dropping the handle releases the lock. If a release step fails, a warning
/// is logged but no panic occurs.
#[derive(Debug)]
pub struct LockHandle {
    /// `None` once released.
    held: Option<Held>,

    journal: Option<Journal>,
}

impl LockHandle {
    pub(super) fn new(file: File, path: PathBuf, journal: Option<Journal>) -> Self {
        Self {
            held: Some(Held { file, path }),
            journal,
        }
    }

    /// Path backing the lock, or `None` after release.
    pub fn path(&self) -> Option<&Path> {
        self.held.as_ref().map(|h| h.path.as_path())
    }

    /// Raw descriptor of the lock file, or `None` after release.
    ///
    /// The descriptor stays owned by the handle.
    pub fn raw_fd(&self) -> Option<RawFd> {
        self.held.as_ref().map(|h| h.file.as_raw_fd())
    }

    pub fn is_locked(&self) -> bool {
        self.held.is_some()
    }

    /// Release the lock: unlock, close, and delete the lock file.
    ///
    /// Calling this on a released handle does nothing. Failures of the
    /// individual steps are logged and otherwise ignored.
    pub fn unlock(&mut self) {
        let Some(Held { file, path }) = self.held.take() else {
            return;
        };

        if let Err(e) = file.unlock() {
            log::warn!("lock: failed to unlock '{}': {}", path.display(), e);
        }
        drop(file);

        let removed = match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("lock: failed to remove '{}': {}", path.display(), e);
                false
            }
        };

        log::debug!("lock: released '{}'", path.display());

        if let Some(journal) = &self.journal {
            journal.record(
                JournalEvent::new(JournalAction::LockReleased)
                    .with_path(&path)
                    .with_details(serde_json::json!({ "removed": removed })),
            );
        }
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        self.unlock();
    }
}
