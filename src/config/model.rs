//! Config struct definition and default implementation.

use crate::clock::ClockSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lock file creation mode, written the way scripts write it (octal digits).
pub const DEFAULT_LOCK_FILE_MODE: i64 = 644;

/// Configuration for the host module.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Permission mode for newly created lock files, as octal digits (`644`).
    #[serde(default = "default_lock_file_mode")]
    pub lock_file_mode: i64,

    /// NDJSON journal of lock events; disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_path: Option<PathBuf>,

    // =========================================================================
    // Time settings
    // =========================================================================
    /// Duration used by `sleep()` when called without an argument.
    #[serde(default)]
    pub default_sleep_seconds: f64,

    /// Clock read by `microtime()`.
    #[serde(default)]
    pub clock: ClockSource,
}

fn default_lock_file_mode() -> i64 {
    DEFAULT_LOCK_FILE_MODE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_file_mode: default_lock_file_mode(),
            journal_path: None,
            default_sleep_seconds: 0.0,
            clock: ClockSource::default(),
        }
    }
}
