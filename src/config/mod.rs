//! Configuration model for posixstd.
//!
//! This module defines the Config struct read from a YAML file. It supports
//! forward-compatible parsing (unknown fields are ignored), defaults for every
//! field, and validation of the values that feed OS calls.

mod model;
mod operations;


// Re-export public API
pub use model::{Config, DEFAULT_LOCK_FILE_MODE};
