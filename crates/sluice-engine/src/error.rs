//! Engine lifecycle, submission, and worker fault errors.

use std::error::Error;
use std::fmt;

use sluice_arena::ArenaError;
use sluice_core::Task;

use crate::config::ConfigError;

/// Errors from building or starting an [`Engine`](crate::Engine).
#[derive(Debug)]
pub enum EngineError {
    /// Configuration failed validation.
    Config(ConfigError),
    /// `start()` was called on an engine that is already running.
    AlreadyStarted,
    /// `start()` was called on an engine that has shut down.
    ShutDown,
    /// The OS refused to spawn a thread.
    ThreadSpawnFailed {
        /// Which thread.
        thread: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid config: {e}"),
            Self::AlreadyStarted => write!(f, "engine already started"),
            Self::ShutDown => write!(f, "engine has shut down and cannot be restarted"),
            Self::ThreadSpawnFailed { thread, source } => {
                write!(f, "failed to spawn {thread} thread: {source}")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::ThreadSpawnFailed { source, .. } => Some(source),
            Self::AlreadyStarted | Self::ShutDown => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// A task the engine did not accept. The task is handed back.
pub enum SubmitError {
    /// The queue is full (back-pressure). Retry or reject upstream.
    QueueFull(Task),
    /// The engine has shut down or its worker faulted.
    Shutdown(Task),
}

impl SubmitError {
    /// Recover the rejected task.
    pub fn into_task(self) -> Task {
        match self {
            Self::QueueFull(task) | Self::Shutdown(task) => task,
        }
    }

    /// Whether this is back-pressure rather than a dead engine.
    pub fn is_full(&self) -> bool {
        matches!(self, Self::QueueFull(_))
    }
}

impl fmt::Debug for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull(task) => f.debug_tuple("QueueFull").field(&task.kind()).finish(),
            Self::Shutdown(task) => f.debug_tuple("Shutdown").field(&task.kind()).finish(),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull(task) => write!(f, "queue full, {} task rejected", task.kind()),
            Self::Shutdown(task) => write!(f, "engine shut down, {} task rejected", task.kind()),
        }
    }
}

impl Error for SubmitError {}

/// Why the worker stopped before shutdown asked it to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerFault {
    /// A handler could not get arena memory. Fatal: the arena never grows.
    Arena(ArenaError),
    /// The worker thread panicked.
    Panicked,
}

impl fmt::Display for WorkerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "worker stopped on arena error: {e}"),
            Self::Panicked => write!(f, "worker thread panicked"),
        }
    }
}

impl Error for WorkerFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Panicked => None,
        }
    }
}

impl From<ArenaError> for WorkerFault {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_error_returns_task() {
        let (task, _done) = Task::scale(4);
        let err = SubmitError::QueueFull(task);
        assert!(err.is_full());
        assert_eq!(err.to_string(), "queue full, scale task rejected");
        assert_eq!(format!("{err:?}"), "QueueFull(Scale)");
        assert!(matches!(err.into_task(), Task::Scale { value: 4, .. }));
    }

    #[test]
    fn fault_chains_arena_error() {
        let fault = WorkerFault::from(ArenaError::InvalidAlignment { align: 3 });
        assert!(fault.to_string().starts_with("worker stopped on arena error"));
        assert!(fault.source().is_some());
    }

    #[test]
    fn config_error_wrapped() {
        let err = EngineError::from(ConfigError::ResetEveryZero);
        assert_eq!(
            err.to_string(),
            "invalid config: reset_every must be at least 1"
        );
        assert!(err.source().is_some());
    }
}
