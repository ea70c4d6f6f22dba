//! Counters shared between the submission side and the worker.
//!
//! [`EngineStats`] is split into two cache-padded groups so submitters
//! bumping their counters never invalidate the line the worker writes, and
//! vice versa. All counters are `Relaxed`: they are diagnostics, not
//! synchronisation. [`EngineMetrics`] is a plain snapshot of them.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

/// Where the worker loop currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Built but not started.
    Idle = 0,
    /// Looking for the next task.
    Polling = 1,
    /// Running a handler.
    Dispatching = 2,
    /// Rewinding the arena.
    Resetting = 3,
    /// Exited, either at shutdown or after a fault.
    Stopped = 4,
}

impl WorkerState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Polling,
            2 => Self::Dispatching,
            3 => Self::Resetting,
            4 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

#[derive(Default)]
pub(crate) struct ProducerCounters {
    pub submitted: AtomicU64,
    pub rejected_full: AtomicU64,
    pub rejected_shutdown: AtomicU64,
}

#[derive(Default)]
pub(crate) struct WorkerCounters {
    pub state: AtomicU8,
    pub parked: AtomicBool,
    pub processed: AtomicU64,
    pub task_errors: AtomicU64,
    pub arena_resets: AtomicU64,
    pub arena_high_water: AtomicUsize,
    pub idle_spins: AtomicU64,
    pub idle_yields: AtomicU64,
    pub idle_sleeps: AtomicU64,
    pub log_truncations: AtomicU64,
}

/// Live counters, shared behind an `Arc`.
#[derive(Default)]
pub(crate) struct EngineStats {
    pub producer: CachePadded<ProducerCounters>,
    pub worker: CachePadded<WorkerCounters>,
    /// Set by shutdown; read by the worker between tasks.
    pub shutdown: CachePadded<AtomicBool>,
}

impl EngineStats {
    pub fn set_state(&self, state: WorkerState) {
        self.worker.state.store(state as u8, Ordering::Relaxed);
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.worker.state.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> EngineMetrics {
        let p = &self.producer;
        let w = &self.worker;
        EngineMetrics {
            state: self.state(),
            submitted: p.submitted.load(Ordering::Relaxed),
            rejected_full: p.rejected_full.load(Ordering::Relaxed),
            rejected_shutdown: p.rejected_shutdown.load(Ordering::Relaxed),
            processed: w.processed.load(Ordering::Relaxed),
            task_errors: w.task_errors.load(Ordering::Relaxed),
            arena_resets: w.arena_resets.load(Ordering::Relaxed),
            arena_high_water: w.arena_high_water.load(Ordering::Relaxed),
            idle_spins: w.idle_spins.load(Ordering::Relaxed),
            idle_yields: w.idle_yields.load(Ordering::Relaxed),
            idle_sleeps: w.idle_sleeps.load(Ordering::Relaxed),
            log_truncations: w.log_truncations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the engine's counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineMetrics {
    /// Worker loop state at the time of the snapshot.
    pub state: WorkerState,
    /// Tasks accepted into the queue.
    pub submitted: u64,
    /// Submissions rejected because the queue was full.
    pub rejected_full: u64,
    /// Submissions rejected after shutdown or a worker fault.
    pub rejected_shutdown: u64,
    /// Tasks that received a result, successful or not.
    pub processed: u64,
    /// Tasks whose handler returned a [`TaskError`](sluice_core::TaskError).
    pub task_errors: u64,
    /// Arena epochs completed.
    pub arena_resets: u64,
    /// Most arena bytes in use at once.
    pub arena_high_water: usize,
    /// Empty polls answered by spinning.
    pub idle_spins: u64,
    /// Empty polls answered by yielding.
    pub idle_yields: u64,
    /// Empty polls answered by parking.
    pub idle_sleeps: u64,
    /// Aggregate tasks whose log buffer was too small for the record.
    pub log_truncations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_zero_and_idle() {
        let stats = EngineStats::default();
        let m = stats.snapshot();
        assert_eq!(m.state, WorkerState::Idle);
        assert_eq!(m.submitted, 0);
        assert_eq!(m.processed, 0);
        assert_eq!(m.arena_high_water, 0);
    }

    #[test]
    fn state_round_trips_through_atomic() {
        let stats = EngineStats::default();
        for state in [
            WorkerState::Polling,
            WorkerState::Dispatching,
            WorkerState::Resetting,
            WorkerState::Stopped,
            WorkerState::Idle,
        ] {
            stats.set_state(state);
            assert_eq!(stats.state(), state);
        }
    }

    #[test]
    fn snapshot_reads_both_groups() {
        let stats = EngineStats::default();
        stats.producer.submitted.fetch_add(3, Ordering::Relaxed);
        stats.producer.rejected_full.fetch_add(1, Ordering::Relaxed);
        stats.worker.processed.fetch_add(2, Ordering::Relaxed);
        stats.worker.arena_high_water.store(640, Ordering::Relaxed);
        let m = stats.snapshot();
        assert_eq!(m.submitted, 3);
        assert_eq!(m.rejected_full, 1);
        assert_eq!(m.processed, 2);
        assert_eq!(m.arena_high_water, 640);
    }
}
