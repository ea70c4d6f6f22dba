//! Ring construction and push errors.

use std::error::Error;
use std::fmt;

/// Errors from [`channel`](crate::channel).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RingError {
    /// Capacity was zero or not a power of two.
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity { capacity } => {
                write!(f, "ring capacity {capacity} is not a non-zero power of two")
            }
        }
    }
}

impl Error for RingError {}

/// A rejected push. The item is handed back to the caller.
#[derive(PartialEq, Eq)]
pub enum PushError<T> {
    /// Every slot is occupied.
    Full(T),
}

impl<T> PushError<T> {
    /// Recover the item that was not enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) => item,
        }
    }
}

// No `T: Debug` bound: tasks carry reply channels that are not Debug.
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("ring is full"),
        }
    }
}

impl<T> Error for PushError<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_error_returns_item() {
        let err = PushError::Full(String::from("job"));
        assert_eq!(err.to_string(), "ring is full");
        assert_eq!(format!("{err:?}"), "Full(..)");
        assert_eq!(err.into_inner(), "job");
    }

    #[test]
    fn invalid_capacity_display() {
        let err = RingError::InvalidCapacity { capacity: 3 };
        assert!(err.to_string().contains('3'));
    }
}
