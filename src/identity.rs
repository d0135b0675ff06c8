//! Process and user identity queries.

use crate::error::{Result, StdError};

/// Process ID of the caller.
pub fn get_pid() -> u32 {
    std::process::id()
}

/// Real user ID of the calling process.
pub fn get_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

/// Real group ID of the calling process.
pub fn get_gid() -> u32 {
    // SAFETY: getgid has no preconditions and cannot fail.
    unsafe { libc::getgid() }
}

/// Host name of the machine, lossily converted to UTF-8.
pub fn get_hostname() -> Result<String> {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .map_err(|e| StdError::os("gethostname", e))
}

/// Owner string used in journal records (`user@HOST`).
pub(crate) fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = get_hostname().unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
