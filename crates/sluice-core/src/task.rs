//! The closed set of task kinds.

use std::fmt;

use sluice_log::LogBuffer;

use crate::completion::{self, Completion, Reply};
use crate::id::EntityId;
use crate::output::{AggregateOutput, ScaleOutput, VolumeOutput};

/// An order to accumulate into the state table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Order {
    /// Entity the order's volume is attributed to.
    pub id: EntityId,
    /// Unit price. Must be finite.
    pub price: f64,
    /// Number of units.
    pub quantity: i64,
}

/// Explicit task discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Doubles an integer through the arena.
    Scale,
    /// Prices an order, accumulates it, and logs it.
    Aggregate,
    /// Reads an entity's accumulated volume.
    Volume,
}

impl TaskKind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scale => "scale",
            Self::Aggregate => "aggregate",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work for the worker.
///
/// Ownership of the task, including any [`LogBuffer`], moves to the worker
/// on submission and comes back through the variant's [`Reply`].
#[derive(Debug)]
pub enum Task {
    /// Double `value`.
    Scale {
        /// Input value.
        value: i64,
        /// Where the doubled value goes.
        reply: Reply<ScaleOutput>,
    },
    /// Price and accumulate an order, optionally logging it.
    Aggregate {
        /// The order.
        order: Order,
        /// Caller-owned buffer the worker appends one record to.
        log: Option<LogBuffer>,
        /// Where the priced order goes.
        reply: Reply<AggregateOutput>,
    },
    /// Read an entity's accumulated volume.
    Volume {
        /// Entity to look up.
        id: EntityId,
        /// Where the volume goes.
        reply: Reply<VolumeOutput>,
    },
}

impl Task {
    /// Build a scale task and the completion that will receive its output.
    pub fn scale(value: i64) -> (Self, Completion<ScaleOutput>) {
        let (reply, done) = completion::pair();
        (Self::Scale { value, reply }, done)
    }

    /// Build an aggregate task and the completion that will receive its output.
    pub fn aggregate(order: Order, log: Option<LogBuffer>) -> (Self, Completion<AggregateOutput>) {
        let (reply, done) = completion::pair();
        (Self::Aggregate { order, log, reply }, done)
    }

    /// Build a volume query and the completion that will receive its output.
    pub fn volume(id: EntityId) -> (Self, Completion<VolumeOutput>) {
        let (reply, done) = completion::pair();
        (Self::Volume { id, reply }, done)
    }

    /// This task's discriminant.
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Scale { .. } => TaskKind::Scale,
            Self::Aggregate { .. } => TaskKind::Aggregate,
            Self::Volume { .. } => TaskKind::Volume,
        }
    }
}

const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<Task>();
    assert::<Completion<AggregateOutput>>();
};
