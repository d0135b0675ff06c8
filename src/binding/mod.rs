//! Host binding for posixstd.
//!
//! The embedding host sees this crate as a module table of named functions
//! plus a method table for lock handles. Arguments arrive as dynamically typed
//! [`Value`]s, are checked and converted the way the host's own libraries do,
//! and failures come back as a [`HostError`] carrying a message and, when the
//! OS reported one, the error code.
//!
//! Lock handles are shared host references. Dropping the last reference
//! releases the lock, mirroring a finalizer; `unlock` releases it early and
//! leaves the handle inert.

mod args;
mod failure;
mod module;
mod value;

#[cfg(test)]
mod tests;

// Re-export public API
pub use failure::{HostError, HostResult};
pub use module::Module;
pub use value::{LockRef, Value};
