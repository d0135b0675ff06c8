//! Permission-bit changes by path and by descriptor.
//!
//! Modes arrive the way a script author writes them: the decimal number `755`
//! meaning octal `0755`. [`Mode::decode`] applies [`oct2dec`] as-is and
//! leaves the bits for the OS to judge; [`Mode::from_octal_digits`] also
//! rejects values that would not be a permission mode.

use crate::error::{Result, StdError};
use crate::numeric::oct2dec;
use std::fs;
use std::os::fd::RawFd;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Highest mode accepted: setuid, setgid, sticky and rwx for all.
pub const MAX_MODE: u32 = 0o7777;

/// A decoded permission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode(u32);

impl Mode {
    /// `rw-r--r--`, the default for lock files.
    pub const RW_R_R: Mode = Mode(0o644);

    /// Decode a decimal-written octal literal, e.g. `644` -> `0o644`.
    ///
    /// Digits 8 and 9, negative numbers and anything above `7777` are
    /// rejected.
    pub fn from_octal_digits(digits: i64) -> Result<Self> {
        if digits < 0 {
            return Err(StdError::InvalidArgument(format!(
                "mode {} must not be negative",
                digits
            )));
        }

        let mut rest = digits;
        while rest != 0 {
            if rest % 10 > 7 {
                return Err(StdError::InvalidArgument(format!(
                    "mode {} contains a non-octal digit",
                    digits
                )));
            }
            rest /= 10;
        }

        let mode = oct2dec(digits);
        if mode > MAX_MODE as i64 {
            return Err(StdError::InvalidArgument(format!(
                "mode {} exceeds {:o}",
                digits, MAX_MODE
            )));
        }

        Ok(Mode(mode as u32))
    }

    /// Decode digit-wise with no validation, truncating the result to
    /// `mode_t` the way a C caller would. `8` becomes `0o10`.
    pub fn decode(digits: i64) -> Self {
        Mode(oct2dec(digits) as libc::mode_t as u32)
    }

    /// Wrap an already-decoded mode.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits > MAX_MODE {
            return Err(StdError::InvalidArgument(format!(
                "mode {:o} exceeds {:o}",
                bits, MAX_MODE
            )));
        }
        Ok(Mode(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

/// Change the permission bits of the file at `path`.
pub fn chmod<P: AsRef<Path>>(path: P, mode: Mode) -> Result<()> {
    let path = path.as_ref();
    fs::set_permissions(path, fs::Permissions::from_mode(mode.bits())).map_err(|e| {
        StdError::os(format!("chmod '{}' to {}", path.display(), mode), e)
    })
}

/// Change the permission bits of the file open as `fd`.
///
/// The descriptor is borrowed only for the duration of the call; ownership
/// stays with the caller.
pub fn fchmod(fd: RawFd, mode: Mode) -> Result<()> {
    // SAFETY: fchmod does not take ownership of `fd` and reports EBADF for
    // descriptors that are not open.
    if unsafe { libc::fchmod(fd, mode.bits() as libc::mode_t) } == -1 {
        return Err(StdError::last_os(format!("fchmod fd {} to {}", fd, mode)));
    }
    Ok(())
}
