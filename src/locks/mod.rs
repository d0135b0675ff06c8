//! Advisory file locks for posixstd.
//!
//! A lock is an exclusive, non-blocking `flock` on a file at a caller-chosen
//! path. Cooperating processes (or threads) that agree on the path get mutual
//! exclusion; anything that ignores the lock is not constrained.
//!
//! # Acquisition
//!
//! The path is opened with create + truncate, then locked with
//! `LOCK_EX | LOCK_NB`. Contention fails immediately with
//! [`StdError::AlreadyLocked`](crate::error::StdError::AlreadyLocked) and leaves
//! the file alone, since it belongs to the current holder. Any other failure
//! closes the descriptor and deletes the file before returning.
//!
//! # Release
//!
//! [`LockHandle`] owns the descriptor and the path together. Releasing unlocks,
//! closes, and unlinks the file, then leaves the handle in a terminal released
//! state. Release runs at most once, whether triggered by
//! [`LockHandle::unlock`] or by `Drop`.

mod acquire;
mod handle;


// Re-export public API
pub use acquire::{LockOptions, acquire, acquire_with};
pub use handle::LockHandle;
