//! Error types for posixstd.
//!
//! Uses thiserror for derive macros. Every OS failure keeps the `io::Error`
//! captured at the call site, so the raw error code travels with the error
//! instead of being looked up later from a process-wide `errno`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for posixstd operations.
#[derive(Error, Debug)]
pub enum StdError {
    /// An OS call failed for a reason other than expected lock contention.
    #[error("{context}: {source}")]
    Os {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The lock is held by someone else.
    #[error("already locked (by another process?): {}", .path.display())]
    AlreadyLocked { path: PathBuf },

    /// Memory could not be reserved while building a handle.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// An argument was outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The configuration could not be read, parsed or validated.
    #[error("config error: {0}")]
    Config(String),
}

/// Coarse classification of a [`StdError`], for callers that branch on the
/// failure rather than on its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Os,
    AlreadyLocked,
    Allocation,
    InvalidArgument,
    Config,
}

impl StdError {
    /// Wrap an `io::Error` with a short description of the failing call.
    pub fn os(context: impl Into<String>, source: io::Error) -> Self {
        StdError::Os {
            context: context.into(),
            source,
        }
    }

    /// Capture `errno` right after a failed libc call.
    pub(crate) fn last_os(context: impl Into<String>) -> Self {
        Self::os(context, io::Error::last_os_error())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StdError::Os { .. } => ErrorKind::Os,
            StdError::AlreadyLocked { .. } => ErrorKind::AlreadyLocked,
            StdError::Allocation(_) => ErrorKind::Allocation,
            StdError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StdError::Config(_) => ErrorKind::Config,
        }
    }

    /// The raw OS error code, when the failure came from the OS.
    pub fn errno(&self) -> Option<i32> {
        match self {
            StdError::Os { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    pub fn is_already_locked(&self) -> bool {
        self.kind() == ErrorKind::AlreadyLocked
    }
}

/// Result type alias for posixstd operations.
pub type Result<T> = std::result::Result<T, StdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_error_keeps_raw_code() {
        let err = StdError::os("open '/x'", io::Error::from_raw_os_error(libc::EACCES));
        assert_eq!(err.kind(), ErrorKind::Os);
        assert_eq!(err.errno(), Some(libc::EACCES));
        assert!(err.to_string().starts_with("open '/x': "));
    }

    #[test]
    fn test_already_locked_is_distinguished() {
        let err = StdError::AlreadyLocked {
            path: PathBuf::from("/tmp/app.lock"),
        };
        assert!(err.is_already_locked());
        assert_eq!(err.errno(), None);
        assert_eq!(
            err.to_string(),
            "already locked (by another process?): /tmp/app.lock"
        );
    }

    #[test]
    fn test_non_os_errors_have_no_code() {
        let err = StdError::Allocation("lock path".to_string());
        assert_eq!(err.kind(), ErrorKind::Allocation);
        assert_eq!(err.errno(), None);

        let err = StdError::InvalidArgument("mode 8 is not octal".to_string());
        assert_eq!(err.to_string(), "invalid argument: mode 8 is not octal");
    }
}
