//! Task model for the sluice execution core.
//!
//! A [`Task`] is a closed sum type: one variant per kind of work, each
//! carrying its own input and the [`Reply`] half of a one-shot completion
//! channel. Submitters keep the matching [`Completion`] and block or poll
//! on it for the typed output.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod completion;
pub mod error;
pub mod id;
pub mod output;
pub mod task;

pub use completion::{Completion, Reply};
pub use error::{CompletionError, TaskError};
pub use id::EntityId;
pub use output::{AggregateOutput, ScaleOutput, VolumeOutput};
pub use task::{Order, Task, TaskKind};
