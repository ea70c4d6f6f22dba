//! Pinning the calling thread to one CPU core.

#![allow(unsafe_code)]

use std::error::Error;
use std::fmt;

/// Why the worker could not be pinned. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AffinityError {
    /// Thread affinity is not implemented for this platform.
    Unsupported,
    /// The core index does not fit in a CPU set.
    CoreOutOfRange {
        /// The requested core.
        core: usize,
    },
    /// The OS refused the affinity mask.
    Os {
        /// The raw `errno`.
        errno: i32,
    },
}

impl fmt::Display for AffinityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "thread pinning is not supported on this platform"),
            Self::CoreOutOfRange { core } => write!(f, "core {core} is out of range"),
            Self::Os { errno } => write!(f, "sched_setaffinity failed with errno {errno}"),
        }
    }
}

impl Error for AffinityError {}

/// Restrict the calling thread to `core`.
#[cfg(target_os = "linux")]
pub fn pin_current_thread(core: usize) -> Result<(), AffinityError> {
    if core >= libc::CPU_SETSIZE as usize {
        return Err(AffinityError::CoreOutOfRange { core });
    }
    // SAFETY: cpu_set_t is a plain bitmask for which all-zeroes is the
    // empty set; `core` is below CPU_SETSIZE; pid 0 means the calling
    // thread and the size argument matches the set passed.
    let rc = unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(core, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
    };
    if rc == 0 {
        Ok(())
    } else {
        let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        Err(AffinityError::Os { errno })
    }
}

/// Restrict the calling thread to `core`.
#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(_core: usize) -> Result<(), AffinityError> {
    Err(AffinityError::Unsupported)
}
