//! The worker loop: poll, dispatch, reset, idle.
//!
//! [`Worker::run`] owns the consumer end of the ring, the executor, and
//! its own backoff. It returns its owned state through the `JoinHandle`
//! so shutdown can hand the arena back to the pool and report the final
//! state table.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use sluice_arena::{Arena, ArenaError};
use sluice_core::Task;
use sluice_ring::{Consumer, Producer};

use crate::affinity;
use crate::backoff::{IdleBackoff, IdlePhase};
use crate::config::IdleBackoffConfig;
use crate::error::WorkerFault;
use crate::executor::Executor;
use crate::metrics::{EngineStats, WorkerState};
use crate::state::StateTable;

/// The producer end, shared by every submitter and closed by whichever
/// side stops the engine first.
pub(crate) type Intake = Arc<Mutex<Option<Producer<Task>>>>;

pub(crate) fn lock_intake(intake: &Intake) -> MutexGuard<'_, Option<Producer<Task>>> {
    // The guarded value is an `Option<Producer>`; a panic while holding
    // the lock cannot leave it half-updated.
    intake.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything the worker owned, returned when it exits.
pub(crate) struct WorkerExit {
    pub arena: Arena,
    pub table: StateTable,
    pub processed: u64,
    pub drained: u64,
    pub resets: u64,
    pub fault: Option<WorkerFault>,
}

pub(crate) struct Worker {
    consumer: Consumer<Task>,
    executor: Executor,
    backoff: IdleBackoff,
    stats: Arc<EngineStats>,
    intake: Intake,
    reset_every: u32,
    pin_core: Option<usize>,
    in_batch: u32,
    processed: u64,
    resets: u64,
    warned_truncation: bool,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        consumer: Consumer<Task>,
        executor: Executor,
        idle: &IdleBackoffConfig,
        stats: Arc<EngineStats>,
        intake: Intake,
        reset_every: u32,
        pin_core: Option<usize>,
    ) -> Self {
        Self {
            consumer,
            executor,
            backoff: IdleBackoff::new(idle),
            stats,
            intake,
            reset_every,
            pin_core,
            in_batch: 0,
            processed: 0,
            resets: 0,
            warned_truncation: false,
        }
    }

    /// Thread entry point: pin, then loop until shutdown or a fault.
    pub fn run(self) -> WorkerExit {
        if let Some(core) = self.pin_core {
            match affinity::pin_current_thread(core) {
                Ok(()) => tracing::info!(core, "worker pinned"),
                Err(e) => tracing::warn!(core, error = %e, "worker pinning failed, running unpinned"),
            }
        }
        tracing::info!(
            queue_capacity = self.consumer.capacity(),
            arena_bytes = self.executor.arena.capacity(),
            "worker started"
        );
        let exit = self.run_loop();
        tracing::info!(
            processed = exit.processed,
            drained = exit.drained,
            faulted = exit.fault.is_some(),
            "worker exited"
        );
        exit
    }

    /// Process every queued task on the calling thread and exit. Used when
    /// the engine shuts down without ever starting.
    pub fn drain_inline(self) -> WorkerExit {
        tracing::debug!(queued = self.consumer.len(), "draining unstarted engine inline");
        self.run_loop()
    }

    fn run_loop(mut self) -> WorkerExit {
        let mut drained = 0;
        let mut fault = None;
        self.stats.set_state(WorkerState::Polling);

        loop {
            if self.stats.shutdown.load(Ordering::Acquire) {
                // The intake is closed before the flag is raised, so this
                // pass sees everything that will ever be queued.
                match self.drain() {
                    Ok(n) => drained = n,
                    Err((n, e)) => {
                        drained = n;
                        fault = Some(self.abandon(e));
                    }
                }
                break;
            }

            if let Some(task) = self.consumer.pop() {
                self.backoff.reset();
                if let Err(e) = self.dispatch(task) {
                    fault = Some(self.abandon(e));
                    break;
                }
                continue;
            }

            if self.in_batch > 0 {
                self.reset_arena();
            }
            self.idle();
        }

        self.stats.set_state(WorkerState::Stopped);
        WorkerExit {
            arena: self.executor.arena,
            table: self.executor.table,
            processed: self.processed,
            drained,
            resets: self.resets,
            fault,
        }
    }

    fn dispatch(&mut self, task: Task) -> Result<(), ArenaError> {
        self.stats.set_state(WorkerState::Dispatching);
        let outcome = self.executor.run(task)?;

        let w = &self.stats.worker;
        self.processed += 1;
        w.processed.fetch_add(1, Ordering::Relaxed);
        if outcome.failed {
            w.task_errors.fetch_add(1, Ordering::Relaxed);
        }
        if outcome.log_truncated {
            w.log_truncations.fetch_add(1, Ordering::Relaxed);
            if !self.warned_truncation {
                self.warned_truncation = true;
                tracing::warn!("log buffer too small for record, output truncated");
            }
        }

        self.in_batch += 1;
        if self.in_batch >= self.reset_every {
            self.reset_arena();
        }
        self.stats.set_state(WorkerState::Polling);
        Ok(())
    }

    fn drain(&mut self) -> Result<u64, (u64, ArenaError)> {
        let mut n = 0;
        while let Some(task) = self.consumer.pop() {
            self.dispatch(task).map_err(|e| (n, e))?;
            n += 1;
        }
        if self.in_batch > 0 {
            self.reset_arena();
        }
        Ok(n)
    }

    fn reset_arena(&mut self) {
        self.stats.set_state(WorkerState::Resetting);
        let w = &self.stats.worker;
        w.arena_high_water
            .fetch_max(self.executor.arena.high_water(), Ordering::Relaxed);
        self.executor.arena.reset();
        self.in_batch = 0;
        self.resets += 1;
        w.arena_resets.fetch_add(1, Ordering::Relaxed);
        self.stats.set_state(WorkerState::Polling);
    }

    /// Stop accepting work and drop every queued task so no submitter
    /// waits on a worker that will never run again.
    fn abandon(&mut self, error: ArenaError) -> WorkerFault {
        lock_intake(&self.intake).take();
        let mut abandoned = 0u64;
        while let Some(task) = self.consumer.pop() {
            drop(task);
            abandoned += 1;
        }
        tracing::error!(error = %error, abandoned, "arena exhausted, worker stopping");
        WorkerFault::Arena(error)
    }

    fn idle(&mut self) {
        let w = &self.stats.worker;
        match self.backoff.next_phase() {
            IdlePhase::Spin => {
                w.idle_spins.fetch_add(1, Ordering::Relaxed);
                std::hint::spin_loop();
            }
            IdlePhase::Yield => {
                w.idle_yields.fetch_add(1, Ordering::Relaxed);
                thread::yield_now();
            }
            IdlePhase::Sleep(duration) => {
                w.idle_sleeps.fetch_add(1, Ordering::Relaxed);
                w.parked.store(true, Ordering::SeqCst);
                // A push that raced the flag store is picked up here; a later
                // one unparks us.
                if self.consumer.is_empty() && !self.stats.shutdown.load(Ordering::Acquire) {
                    thread::park_timeout(duration);
                }
                w.parked.store(false, Ordering::SeqCst);
            }
        }
    }
}
