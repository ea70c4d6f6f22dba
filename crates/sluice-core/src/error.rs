//! Per-task failure and completion errors.

use std::error::Error;
use std::fmt;

use crate::id::EntityId;
use crate::task::TaskKind;

/// Why a handler rejected an individual task.
///
/// A task that fails still receives exactly one result; the worker moves
/// on to the next task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskError {
    /// The entity id does not fit the state table and the engine is
    /// configured to reject rather than alias.
    IdOutOfRange {
        /// The rejected id.
        id: EntityId,
        /// Number of slots in the state table.
        table_size: usize,
    },
    /// Integer arithmetic overflowed.
    Overflow {
        /// Kind of the task that overflowed.
        kind: TaskKind,
    },
    /// An input or computed value was NaN or infinite.
    NonFinite {
        /// Name of the offending value.
        field: &'static str,
    },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdOutOfRange { id, table_size } => {
                write!(f, "entity id {id} outside state table of {table_size} slots")
            }
            Self::Overflow { kind } => write!(f, "{kind} task overflowed i64"),
            Self::NonFinite { field } => write!(f, "{field} is not finite"),
        }
    }
}

impl Error for TaskError {}

/// Why a [`Completion`](crate::Completion) produced no output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionError {
    /// The task ran and its handler rejected it.
    Failed(TaskError),
    /// The task was dropped without a result, which happens only when the
    /// worker faults with the task still queued or in flight.
    Abandoned,
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "task failed: {e}"),
            Self::Abandoned => write!(f, "task abandoned before completion"),
        }
    }
}

impl Error for CompletionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Abandoned => None,
        }
    }
}

impl From<TaskError> for CompletionError {
    fn from(e: TaskError) -> Self {
        Self::Failed(e)
    }
}
