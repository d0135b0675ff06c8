//! Wall-clock reads and thread sleeping.
//!
//! `microtime` reads a POSIX clock with `clock_gettime` and returns seconds as
//! a float with the nanosecond field folded into the fraction. `sleep` wraps
//! `nanosleep` directly rather than `std::thread::sleep`, because a signal
//! interruption must surface as an error instead of being silently resumed.

use crate::error::{Result, StdError};
use serde::{Deserialize, Serialize};
use std::ptr;

/// POSIX clock to read in [`microtime_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClockSource {
    /// `CLOCK_REALTIME`, seconds since the Unix epoch.
    #[default]
    Realtime,
    /// `CLOCK_REALTIME_COARSE` (Linux only).
    RealtimeCoarse,
    /// `CLOCK_MONOTONIC`.
    Monotonic,
    /// `CLOCK_MONOTONIC_COARSE` (Linux only).
    MonotonicCoarse,
    /// `CLOCK_MONOTONIC_RAW`.
    MonotonicRaw,
    /// `CLOCK_BOOTTIME` (Linux only).
    Boottime,
    /// `CLOCK_PROCESS_CPUTIME_ID`.
    ProcessCputime,
    /// `CLOCK_THREAD_CPUTIME_ID`.
    ThreadCputime,
}

impl ClockSource {
    /// Parse a clock source from its config name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "realtime" => Some(Self::Realtime),
            "realtime_coarse" => Some(Self::RealtimeCoarse),
            "monotonic" => Some(Self::Monotonic),
            "monotonic_coarse" => Some(Self::MonotonicCoarse),
            "monotonic_raw" => Some(Self::MonotonicRaw),
            "boottime" => Some(Self::Boottime),
            "process_cputime" => Some(Self::ProcessCputime),
            "thread_cputime" => Some(Self::ThreadCputime),
            _ => None,
        }
    }

    /// The libc clock id, or `None` when this platform lacks the clock.
    pub fn clock_id(self) -> Option<libc::clockid_t> {
        match self {
            ClockSource::Realtime => Some(libc::CLOCK_REALTIME),
            ClockSource::Monotonic => Some(libc::CLOCK_MONOTONIC),
            ClockSource::MonotonicRaw => Some(libc::CLOCK_MONOTONIC_RAW),
            ClockSource::ProcessCputime => Some(libc::CLOCK_PROCESS_CPUTIME_ID),
            ClockSource::ThreadCputime => Some(libc::CLOCK_THREAD_CPUTIME_ID),
            #[cfg(any(target_os = "linux", target_os = "android"))]
            ClockSource::RealtimeCoarse => Some(libc::CLOCK_REALTIME_COARSE),
            #[cfg(any(target_os = "linux", target_os = "android"))]
            ClockSource::MonotonicCoarse => Some(libc::CLOCK_MONOTONIC_COARSE),
            #[cfg(any(target_os = "linux", target_os = "android"))]
            ClockSource::Boottime => Some(libc::CLOCK_BOOTTIME),
            #[cfg(not(any(target_os = "linux", target_os = "android")))]
            _ => None,
        }
    }
}

impl std::fmt::Display for ClockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClockSource::Realtime => "realtime",
            ClockSource::RealtimeCoarse => "realtime_coarse",
            ClockSource::Monotonic => "monotonic",
            ClockSource::MonotonicCoarse => "monotonic_coarse",
            ClockSource::MonotonicRaw => "monotonic_raw",
            ClockSource::Boottime => "boottime",
            ClockSource::ProcessCputime => "process_cputime",
            ClockSource::ThreadCputime => "thread_cputime",
        };
        write!(f, "{}", name)
    }
}

/// Seconds since the Unix epoch from `CLOCK_REALTIME`.
pub fn microtime() -> Result<f64> {
    microtime_with(ClockSource::Realtime)
}

/// Read `clock` and return its value in seconds.
pub fn microtime_with(clock: ClockSource) -> Result<f64> {
    let id = clock.clock_id().ok_or_else(|| {
        StdError::InvalidArgument(format!("clock '{}' is not available on this platform", clock))
    })?;

    let mut t = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `t` is a valid, writable timespec for the duration of the call.
    if unsafe { libc::clock_gettime(id, &mut t) } == -1 {
        return Err(StdError::last_os(format!("clock_gettime({})", clock)));
    }

    Ok(t.tv_sec as f64 + t.tv_nsec as f64 * 1e-9)
}

/// Suspend the calling thread for `seconds` (fractional).
///
/// Fails with the OS error if the sleep is interrupted by a signal; the
/// remaining time is not retried.
pub fn sleep(seconds: f64) -> Result<()> {
    let t = to_timespec(seconds)?;

    // SAFETY: `t` is a valid timespec; the remainder pointer may be null.
    if unsafe { libc::nanosleep(&t, ptr::null_mut()) } == -1 {
        return Err(StdError::last_os(format!("nanosleep({})", seconds)));
    }

    Ok(())
}

/// Split fractional seconds into whole seconds and a nanosecond remainder.
fn to_timespec(seconds: f64) -> Result<libc::timespec> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(StdError::InvalidArgument(format!(
            "sleep duration must be a finite, non-negative number of seconds (got {})",
            seconds
        )));
    }

    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9) as libc::c_long;

    Ok(libc::timespec {
        tv_sec: whole as libc::time_t,
        tv_nsec: nanos.min(999_999_999),
    })
}
