//! posixstd: POSIX helpers for a scripting host.
//!
//! Exposes advisory file locks, process/user identity, POSIX clocks, sleeping,
//! plural-category classification and permission changes. The Rust API lives
//! in the per-concern modules; [`binding::Module`] presents the same
//! operations as a host-style function table over dynamically typed values.
//!
//! ```no_run
//! use posixstd::locks;
//!
//! let mut handle = locks::acquire("/tmp/nightly-report.lock")?;
//! // ... exclusive work ...
//! handle.unlock();
//! # Ok::<(), posixstd::error::StdError>(())
//! ```

pub mod binding;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod journal;
pub mod locks;
pub mod numeric;
pub mod perms;

pub use error::{ErrorKind, Result, StdError};
pub use locks::{LockHandle, LockOptions};
