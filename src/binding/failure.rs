//! Failures as the host sees them.

use crate::error::StdError;
use thiserror::Error;

/// A host-level failure: a message plus the OS error code when there is one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
    pub code: Option<i32>,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// `bad argument #pos to 'fname' (detail)`, positions are 1-based.
    pub fn bad_argument(pos: usize, fname: &str, detail: impl std::fmt::Display) -> Self {
        Self::new(format!("bad argument #{} to '{}' ({})", pos, fname, detail))
    }
}

impl From<StdError> for HostError {
    fn from(err: StdError) -> Self {
        Self {
            code: err.errno(),
            message: err.to_string(),
        }
    }
}

/// Result of a host call: the returned values, in order.
pub type HostResult = std::result::Result<Vec<super::Value>, HostError>;
