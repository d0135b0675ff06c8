//! Append-only journal of lock and permission events.
//!
//! When a journal path is configured, every lock acquisition attempt, every
//! release and every permission change is appended as one JSON object per line
//! (NDJSON). The journal is an audit trail only: a failed write is logged and
//! never changes the outcome of the operation being recorded.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: `lock_acquired`, `lock_contended`, `lock_failed`,
//!   `lock_released` or `chmod`
//! - `actor`: `user@HOST`
//! - `pid`: process ID of the writer
//! - `path`: the file the event concerns, when there is one
//! - `details`: freeform object

use crate::error::{Result, StdError};
use crate::identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Actions that can be journaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalAction {
    /// Lock taken.
    LockAcquired,
    /// Lock refused because another holder has it.
    LockContended,
    /// Lock attempt failed for any other reason.
    LockFailed,
    /// Lock released, explicitly or on drop.
    LockReleased,
    /// Permission bits changed.
    Chmod,
}

impl std::fmt::Display for JournalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalAction::LockAcquired => write!(f, "lock_acquired"),
            JournalAction::LockContended => write!(f, "lock_contended"),
            JournalAction::LockFailed => write!(f, "lock_failed"),
            JournalAction::LockReleased => write!(f, "lock_released"),
            JournalAction::Chmod => write!(f, "chmod"),
        }
    }
}

/// A single journal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEvent {
    /// When the event occurred.
    pub ts: DateTime<Utc>,

    pub action: JournalAction,

    /// Who performed the action (`user@HOST`).
    pub actor: String,

    pub pid: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Action-specific details.
    pub details: Value,
}

impl JournalEvent {
    /// Create an event stamped with the current time, actor and pid.
    pub fn new(action: JournalAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: identity::actor_string(),
            pid: identity::get_pid(),
            path: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            StdError::InvalidArgument(format!("failed to serialize journal event: {}", e))
        })
    }
}

/// Handle to an NDJSON journal file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event as one line, creating the file and its parent
    /// directory if needed.
    pub fn append(&self, event: &JournalEvent) -> Result<()> {
        let line = event.to_ndjson_line()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StdError::os(
                    format!("failed to create journal directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                StdError::os(
                    format!("failed to open journal '{}'", self.path.display()),
                    e,
                )
            })?;

        writeln!(file, "{}", line).map_err(|e| {
            StdError::os(
                format!("failed to write journal '{}'", self.path.display()),
                e,
            )
        })
    }

    /// Append and log instead of failing. Used on paths where the journal
    /// must not affect the result.
    pub fn record(&self, event: JournalEvent) {
        if let Err(e) = self.append(&event) {
            log::warn!("journal: dropped {} event: {}", event.action, e);
        }
    }

    /// Read every event back, oldest first.
    pub fn read_all(&self) -> Result<Vec<JournalEvent>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StdError::os(
                    format!("failed to read journal '{}'", self.path.display()),
                    e,
                ));
            }
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    StdError::InvalidArgument(format!(
                        "malformed journal line in '{}': {}",
                        self.path.display(),
                        e
                    ))
                })
            })
            .collect()
    }
}
