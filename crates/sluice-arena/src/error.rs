//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The region has no room for the request plus its alignment padding.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Padding needed to reach the requested alignment.
        padding: usize,
        /// Bytes left in the region before the request.
        remaining: usize,
        /// Total region size in bytes.
        capacity: usize,
    },
    /// Alignment was zero or not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// A handle issued in an earlier epoch (before a reset).
    StaleHandle {
        /// The epoch encoded in the handle.
        handle_epoch: u32,
        /// The arena's current epoch.
        current_epoch: u32,
    },
    /// A handle that does not lie inside this epoch's allocations,
    /// typically one issued by a different arena.
    InvalidSpan {
        /// Start offset of the span.
        offset: usize,
        /// Length of the span in bytes.
        len: usize,
        /// End of the allocated prefix of the region.
        cursor: usize,
    },
    /// An element index past the end of an array handle.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of elements in the array.
        len: usize,
    },
    /// Arena configuration is invalid.
    InvalidConfig {
        /// Which invariant was violated.
        reason: &'static str,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                padding,
                remaining,
                capacity,
            } => {
                write!(
                    f,
                    "arena out of memory: requested {requested} bytes (+{padding} padding), \
                     {remaining} of {capacity} bytes remaining"
                )
            }
            Self::InvalidAlignment { align } => {
                write!(f, "alignment {align} is not a non-zero power of two")
            }
            Self::StaleHandle {
                handle_epoch,
                current_epoch,
            } => {
                write!(
                    f,
                    "stale handle: epoch {handle_epoch}, arena is at epoch {current_epoch}"
                )
            }
            Self::InvalidSpan {
                offset,
                len,
                cursor,
            } => {
                write!(
                    f,
                    "span {offset}..{} lies outside the allocated prefix 0..{cursor}",
                    offset.saturating_add(*len)
                )
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for array of {len} elements")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}
