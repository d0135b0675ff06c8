//! Config loading, validation, and derived values.

use super::model::Config;
use crate::error::{Result, StdError};
use crate::journal::Journal;
use crate::locks::LockOptions;
use crate::perms::Mode;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            StdError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path`, falling back to defaults when the file does
    /// not exist. Any other read or parse failure is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("config: '{}' not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| StdError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StdError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `lock_file_mode` must be octal digits no larger than `7777`
    /// - `default_sleep_seconds` must be finite and non-negative
    /// - `clock` must exist on this platform
    pub fn validate(&self) -> Result<()> {
        if let Err(e) = Mode::from_octal_digits(self.lock_file_mode) {
            return Err(StdError::Config(format!(
                "config validation failed: lock_file_mode: {}",
                e
            )));
        }

        if !self.default_sleep_seconds.is_finite() || self.default_sleep_seconds < 0.0 {
            return Err(StdError::Config(format!(
                "config validation failed: default_sleep_seconds must be a non-negative number (found {})",
                self.default_sleep_seconds
            )));
        }

        if self.clock.clock_id().is_none() {
            return Err(StdError::Config(format!(
                "config validation failed: clock '{}' is not available on this platform",
                self.clock
            )));
        }

        Ok(())
    }

    /// The decoded lock file mode.
    pub fn lock_mode(&self) -> Result<Mode> {
        Mode::from_octal_digits(self.lock_file_mode)
    }

    /// The configured journal, if any.
    pub fn journal(&self) -> Option<Journal> {
        self.journal_path.as_ref().map(Journal::new)
    }

    /// Lock options derived from this config.
    pub fn lock_options(&self) -> Result<LockOptions> {
        Ok(LockOptions {
            mode: self.lock_mode()?,
            journal: self.journal(),
        })
    }
}
