//! Task handlers, run on the worker thread.
//!
//! Each handler works only with memory it already owns: the arena for
//! scratch values, the state table for accumulated volume, and the
//! caller's log buffer. A handler error of the task's own making is
//! published to its submitter; an arena error propagates to the worker
//! and stops it.

use sluice_arena::{Arena, ArenaError};
use sluice_core::{
    AggregateOutput, EntityId, Order, Reply, ScaleOutput, Task, TaskError, TaskKind, VolumeOutput,
};
use sluice_log::LogBuffer;

use crate::clock::ClockReader;
use crate::state::StateTable;

/// State-table slot scale tasks accumulate into.
pub(crate) const SCALE_SLOT: usize = 0;

enum HandlerError {
    Task(TaskError),
    Arena(ArenaError),
}

impl From<TaskError> for HandlerError {
    fn from(e: TaskError) -> Self {
        Self::Task(e)
    }
}

impl From<ArenaError> for HandlerError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

/// What happened to a task that did not stop the worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Outcome {
    /// The submitter received a [`TaskError`].
    pub failed: bool,
    /// The task's log record did not fit its buffer.
    pub log_truncated: bool,
}

pub(crate) struct Executor {
    pub arena: Arena,
    pub table: StateTable,
    clock: ClockReader,
}

impl Executor {
    pub fn new(arena: Arena, table: StateTable, clock: ClockReader) -> Self {
        Self {
            arena,
            table,
            clock,
        }
    }

    /// Run one task and publish its result.
    ///
    /// On `Err` the task's reply has been dropped unpublished.
    pub fn run(&mut self, task: Task) -> Result<Outcome, ArenaError> {
        match task {
            Task::Scale { value, reply } => {
                let result = self.scale(value);
                finish(result, reply, false)
            }
            Task::Aggregate { order, log, reply } => {
                let result = self.aggregate(order, log);
                let truncated = matches!(
                    &result,
                    Ok(AggregateOutput { log: Some(buf), .. }) if buf.is_truncated()
                );
                finish(result, reply, truncated)
            }
            Task::Volume { id, reply } => {
                let result = self.volume(id);
                finish(result, reply, false)
            }
        }
    }

    fn scale(&mut self, value: i64) -> Result<ScaleOutput, HandlerError> {
        let doubled = value.checked_mul(2).ok_or(TaskError::Overflow {
            kind: TaskKind::Scale,
        })?;
        let cell = self.arena.alloc(doubled)?;
        let value = self.arena.get(cell)?;
        self.table.add_at(SCALE_SLOT, value as f64);
        Ok(ScaleOutput { value })
    }

    fn aggregate(
        &mut self,
        order: Order,
        mut log: Option<LogBuffer>,
    ) -> Result<AggregateOutput, HandlerError> {
        if !order.price.is_finite() {
            return Err(TaskError::NonFinite { field: "price" }.into());
        }
        let total = order.price * order.quantity as f64;
        if !total.is_finite() {
            return Err(TaskError::NonFinite { field: "total" }.into());
        }
        let slot = self.table.slot_for(order.id)?;
        let processed_at_ns = self.clock.now_ns();

        let cell = self.arena.alloc(total)?;
        let total = self.arena.get(cell)?;
        let volume = self.table.add_at(slot, total);

        if let Some(buf) = log.as_mut() {
            buf.logger()
                .int("ts", processed_at_ns)
                .str("type", "order")
                .uint("uid", slot as u64)
                .msg("processed");
        }

        Ok(AggregateOutput {
            total,
            processed_at_ns,
            slot,
            volume,
            log,
        })
    }

    fn volume(&self, id: EntityId) -> Result<VolumeOutput, HandlerError> {
        let (slot, volume) = self.table.get(id)?;
        Ok(VolumeOutput { slot, volume })
    }
}

fn finish<R>(
    result: Result<R, HandlerError>,
    reply: Reply<R>,
    log_truncated: bool,
) -> Result<Outcome, ArenaError> {
    match result {
        Ok(output) => {
            reply.publish(Ok(output));
            Ok(Outcome {
                failed: false,
                log_truncated,
            })
        }
        Err(HandlerError::Task(e)) => {
            reply.publish(Err(e));
            Ok(Outcome {
                failed: true,
                log_truncated: false,
            })
        }
        Err(HandlerError::Arena(e)) => Err(e),
    }
}
