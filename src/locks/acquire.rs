//! Lock acquisition and its failure-path cleanup.

use super::handle::LockHandle;
use crate::error::{Result, StdError};
use crate::journal::{Journal, JournalAction, JournalEvent};
use crate::perms::Mode;
use serde_json::json;
use std::collections::TryReserveError;
use std::fs::{self, File, OpenOptions, TryLockError};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Options for [`acquire_with`].
#[derive(Debug, Clone)]
pub struct LockOptions {
    /// Permission bits for a newly created lock file (before umask).
    pub mode: Mode,

    /// Journal receiving lock events, if any.
    pub journal: Option<Journal>,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            mode: Mode::RW_R_R,
            journal: None,
        }
    }
}

/// Acquire an exclusive, non-blocking lock on `path` with default options.
///
/// # Returns
///
/// * `Ok(LockHandle)` - the lock is held until the handle is unlocked or dropped
/// * `Err(StdError::AlreadyLocked)` - another holder has the lock
/// * `Err(StdError::Os)` - opening or locking the file failed
/// * `Err(StdError::Allocation)` - the handle could not be built
pub fn acquire<P: AsRef<Path>>(path: P) -> Result<LockHandle> {
    acquire_with(path, &LockOptions::default())
}

/// Acquire an exclusive, non-blocking lock on `path`.
pub fn acquire_with<P: AsRef<Path>>(path: P, options: &LockOptions) -> Result<LockHandle> {
    acquire_using(path.as_ref(), options, |file| file.try_lock(), reserve_exact)
}

/// Reserve room for `len` more bytes of path, failing instead of aborting.
pub(super) fn reserve_exact(
    buf: &mut PathBuf,
    len: usize,
) -> std::result::Result<(), TryReserveError> {
    buf.try_reserve_exact(len)
}

/// Acquisition with the lock primitive and the path reservation supplied by
/// the caller.
pub(super) fn acquire_using<F, R>(
    path: &Path,
    options: &LockOptions,
    try_lock: F,
    reserve: R,
) -> Result<LockHandle>
where
    F: FnOnce(&File) -> std::result::Result<(), TryLockError>,
    R: FnOnce(&mut PathBuf, usize) -> std::result::Result<(), TryReserveError>,
{
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(options.mode.bits())
        .open(path)
        .map_err(|e| {
            let err = StdError::os(format!("failed to open lock file '{}'", path.display()), e);
            journal_failure(options, path, &err);
            err
        })?;

    match try_lock(&file) {
        Ok(()) => {}
        Err(TryLockError::WouldBlock) => {
            // The file belongs to the current holder; only close our descriptor.
            drop(file);
            log::debug!("lock: '{}' is held elsewhere", path.display());
            if let Some(journal) = &options.journal {
                journal.record(JournalEvent::new(JournalAction::LockContended).with_path(path));
            }
            return Err(StdError::AlreadyLocked {
                path: path.to_path_buf(),
            });
        }
        Err(TryLockError::Error(e)) => {
            drop(file);
            remove_quietly(path);
            let err = StdError::os(format!("failed to lock '{}'", path.display()), e);
            journal_failure(options, path, &err);
            return Err(err);
        }
    }

    let mut owned = PathBuf::new();
    if let Err(e) = reserve(&mut owned, path.as_os_str().len()) {
        if let Err(e) = file.unlock() {
            log::warn!("lock: failed to unlock '{}': {}", path.display(), e);
        }
        drop(file);
        remove_quietly(path);
        let err = StdError::Allocation(format!("lock path '{}': {}", path.display(), e));
        journal_failure(options, path, &err);
        return Err(err);
    }
    owned.push(path);

    log::debug!("lock: acquired '{}'", owned.display());
    if let Some(journal) = &options.journal {
        journal.record(
            JournalEvent::new(JournalAction::LockAcquired)
                .with_path(&owned)
                .with_details(json!({ "mode": options.mode.to_string() })),
        );
    }

    Ok(LockHandle::new(file, owned, options.journal.clone()))
}

/// Best-effort unlink of a lock file this call created or truncated.
fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("lock: failed to remove '{}': {}", path.display(), e);
    }
}

fn journal_failure(options: &LockOptions, path: &Path, err: &StdError) {
    if let Some(journal) = &options.journal {
        journal.record(
            JournalEvent::new(JournalAction::LockFailed)
                .with_path(path)
                .with_details(json!({ "error": err.to_string(), "errno": err.errno() })),
        );
    }
}
