//! User-facing [`Engine`] and its shutdown sequence.
//!
//! An engine is built idle: the queue exists and accepts submissions, but
//! no worker thread runs until [`Engine::start`]. Any number of threads may
//! submit through `&Engine`; they are serialized onto the ring's single
//! producer by a mutex held for exactly one push.

use std::mem;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, Thread};
use std::time::Instant;

use sluice_arena::ArenaPool;
use sluice_core::{
    AggregateOutput, Completion, EntityId, Order, ScaleOutput, Task, VolumeOutput,
};
use sluice_log::LogBuffer;
use sluice_ring::PushError;

use crate::clock::{ClockCache, ClockReader};
use crate::config::{ConfigError, EngineConfig};
use crate::error::{EngineError, SubmitError, WorkerFault};
use crate::executor::Executor;
use crate::metrics::{EngineMetrics, EngineStats, WorkerState};
use crate::state::StateTable;
use crate::worker::{lock_intake, Intake, Worker, WorkerExit};

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`Engine::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Wall time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Tasks that received a result over the engine's life.
    pub tasks_processed: u64,
    /// Of those, tasks processed after shutdown was requested.
    pub drained_on_shutdown: u64,
    /// Arena epochs completed.
    pub arena_resets: u64,
    /// The worker's final state table. `None` if the worker panicked or
    /// this is a repeated shutdown.
    pub state_table: Option<StateTable>,
    /// Why the worker stopped early, if it did.
    pub fault: Option<WorkerFault>,
    /// Whether the worker finished normally (thread joined or inline drain).
    pub worker_joined: bool,
}

impl ShutdownReport {
    fn empty() -> Self {
        Self {
            total_ms: 0,
            tasks_processed: 0,
            drained_on_shutdown: 0,
            arena_resets: 0,
            state_table: None,
            fault: None,
            worker_joined: true,
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────

enum Lifecycle {
    Idle(Box<Worker>),
    Running(JoinHandle<WorkerExit>),
    Stopped,
}

/// The execution engine: a single worker fed through a bounded lock-free
/// queue.
pub struct Engine {
    intake: Intake,
    stats: Arc<EngineStats>,
    worker_thread: Option<Thread>,
    lifecycle: Lifecycle,
    clock: ClockCache,
    pool: ArenaPool,
    thread_name: String,
    finished: bool,
}

// Compile-time assertion: Engine is shared by reference across submitters.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Engine>();
};

impl Engine {
    /// Build an idle engine. Submissions are queued until [`start`](Self::start).
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let pool = ArenaPool::new(&config.arena).map_err(ConfigError::from)?;
        let table = StateTable::new(config.state_table_size, config.alias_policy).ok_or(
            ConfigError::StateTableSize {
                size: config.state_table_size,
            },
        )?;
        let (producer, consumer) =
            sluice_ring::channel(config.queue_capacity).map_err(ConfigError::from)?;
        let clock = ClockCache::start(config.clock_cadence).map_err(|source| {
            EngineError::ThreadSpawnFailed {
                thread: "clock",
                source,
            }
        })?;

        let stats = Arc::new(EngineStats::default());
        let intake: Intake = Arc::new(Mutex::new(Some(producer)));
        let executor = Executor::new(pool.acquire(), table, clock.reader());
        let worker = Worker::new(
            consumer,
            executor,
            &config.idle,
            Arc::clone(&stats),
            Arc::clone(&intake),
            config.reset_every,
            config.pin_core,
        );

        tracing::info!(
            queue_capacity = config.queue_capacity,
            arena_bytes = config.arena.region_bytes,
            state_table_size = config.state_table_size,
            "engine created"
        );

        Ok(Self {
            intake,
            stats,
            worker_thread: None,
            lifecycle: Lifecycle::Idle(Box::new(worker)),
            clock,
            pool,
            thread_name: config.thread_name,
            finished: false,
        })
    }

    /// Build and immediately start an engine.
    pub fn launch(config: EngineConfig) -> Result<Self, EngineError> {
        let mut engine = Self::new(config)?;
        engine.start()?;
        Ok(engine)
    }

    /// Spawn the worker thread.
    pub fn start(&mut self) -> Result<(), EngineError> {
        let worker = match mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Idle(worker) => worker,
            Lifecycle::Running(handle) => {
                self.lifecycle = Lifecycle::Running(handle);
                return Err(EngineError::AlreadyStarted);
            }
            Lifecycle::Stopped => return Err(EngineError::ShutDown),
        };

        let spawned = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => {
                self.worker_thread = Some(handle.thread().clone());
                self.lifecycle = Lifecycle::Running(handle);
                tracing::info!(thread = %self.thread_name, "engine started");
                Ok(())
            }
            Err(source) => {
                // The worker went down with the closure; queued tasks are
                // abandoned once the producer goes too.
                lock_intake(&self.intake).take();
                self.stats.set_state(WorkerState::Stopped);
                Err(EngineError::ThreadSpawnFailed {
                    thread: "worker",
                    source,
                })
            }
        }
    }

    /// Hand a task to the worker without blocking.
    ///
    /// On rejection the task comes back inside the error.
    pub fn submit(&self, task: Task) -> Result<(), SubmitError> {
        let producer = &self.stats.producer;
        let mut intake = lock_intake(&self.intake);
        let Some(tx) = intake.as_mut() else {
            drop(intake);
            producer.rejected_shutdown.fetch_add(1, Ordering::Relaxed);
            return Err(SubmitError::Shutdown(task));
        };
        match tx.push(task) {
            Ok(()) => {
                drop(intake);
                producer.submitted.fetch_add(1, Ordering::Relaxed);
                self.wake_worker();
                Ok(())
            }
            Err(PushError::Full(task)) => {
                drop(intake);
                producer.rejected_full.fetch_add(1, Ordering::Relaxed);
                Err(SubmitError::QueueFull(task))
            }
        }
    }

    /// Submit a scale task.
    pub fn scale(&self, value: i64) -> Result<Completion<ScaleOutput>, SubmitError> {
        let (task, done) = Task::scale(value);
        self.submit(task).map(|()| done)
    }

    /// Submit an aggregate task, optionally with a buffer to log into.
    pub fn aggregate(
        &self,
        order: Order,
        log: Option<LogBuffer>,
    ) -> Result<Completion<AggregateOutput>, SubmitError> {
        let (task, done) = Task::aggregate(order, log);
        self.submit(task).map(|()| done)
    }

    /// Submit a volume query.
    pub fn volume(&self, id: EntityId) -> Result<Completion<VolumeOutput>, SubmitError> {
        let (task, done) = Task::volume(id);
        self.submit(task).map(|()| done)
    }

    /// Snapshot of the engine's counters.
    pub fn metrics(&self) -> EngineMetrics {
        self.stats.snapshot()
    }

    /// Current worker loop state.
    pub fn worker_state(&self) -> WorkerState {
        self.stats.state()
    }

    /// Tasks currently queued, or 0 once the intake is closed.
    pub fn queue_len(&self) -> usize {
        lock_intake(&self.intake).as_ref().map_or(0, |tx| tx.len())
    }

    /// Whether submissions are still accepted.
    pub fn is_accepting(&self) -> bool {
        lock_intake(&self.intake).is_some()
    }

    /// A reader for the engine's cached clock.
    pub fn clock(&self) -> ClockReader {
        self.clock.reader()
    }

    fn wake_worker(&self) {
        if self.stats.worker.parked.load(Ordering::SeqCst) {
            if let Some(thread) = &self.worker_thread {
                thread.unpark();
            }
        }
    }

    /// Stop accepting work, process everything already accepted, and tear
    /// down.
    ///
    /// 1. Close the intake, then raise the shutdown flag.
    /// 2. Wake and join the worker, which drains the queue first. An engine
    ///    that was never started drains on the calling thread.
    /// 3. Return the arena to the pool, drain the pool, stop the clock.
    ///
    /// Idempotent: later calls return an empty report.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.finished {
            return ShutdownReport::empty();
        }
        self.finished = true;
        let start = Instant::now();

        lock_intake(&self.intake).take();
        self.stats.shutdown.store(true, Ordering::Release);

        let (exit, worker_joined, panicked) =
            match mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
                Lifecycle::Idle(worker) => (Some(worker.drain_inline()), true, false),
                Lifecycle::Running(handle) => {
                    handle.thread().unpark();
                    match handle.join() {
                        Ok(exit) => (Some(exit), true, false),
                        Err(_) => (None, false, true),
                    }
                }
                Lifecycle::Stopped => (None, false, false),
            };

        let mut report = ShutdownReport::empty();
        report.worker_joined = worker_joined;
        if panicked {
            tracing::error!("worker thread panicked");
            report.fault = Some(WorkerFault::Panicked);
            report.tasks_processed = self.stats.worker.processed.load(Ordering::Relaxed);
            report.arena_resets = self.stats.worker.arena_resets.load(Ordering::Relaxed);
        }
        if let Some(exit) = exit {
            self.pool.release(exit.arena);
            report.tasks_processed = exit.processed;
            report.drained_on_shutdown = exit.drained;
            report.arena_resets = exit.resets;
            report.state_table = Some(exit.table);
            report.fault = exit.fault;
        }

        self.pool.drain();
        self.clock.stop();
        self.stats.set_state(WorkerState::Stopped);
        self.worker_thread = None;

        report.total_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            total_ms = report.total_ms,
            processed = report.tasks_processed,
            drained = report.drained_on_shutdown,
            faulted = report.fault.is_some(),
            "engine shut down"
        );
        report
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_arena::ArenaConfig;
    use std::time::Duration;

    fn config() -> EngineConfig {
        EngineConfig {
            arena: ArenaConfig {
                region_bytes: 4096,
                pool_capacity: 1,
            },
            queue_capacity: 8,
            state_table_size: 16,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let bad = EngineConfig {
            queue_capacity: 3,
            ..config()
        };
        assert!(matches!(Engine::new(bad), Err(EngineError::Config(_))));
    }

    #[test]
    fn new_engine_is_idle_and_accepting() {
        let engine = Engine::new(config()).unwrap();
        assert_eq!(engine.worker_state(), WorkerState::Idle);
        assert!(engine.is_accepting());
        assert_eq!(engine.queue_len(), 0);
    }

    #[test]
    fn start_twice_is_error() {
        let mut engine = Engine::launch(config()).unwrap();
        assert!(matches!(engine.start(), Err(EngineError::AlreadyStarted)));
    }

    #[test]
    fn start_after_shutdown_is_error() {
        let mut engine = Engine::new(config()).unwrap();
        engine.shutdown();
        let err = engine.start().unwrap_err();
        assert!(matches!(err, EngineError::ShutDown));
        assert_eq!(err.to_string(), "engine has shut down and cannot be restarted");
    }

    #[test]
    fn nul_thread_name_fails_before_spawn() {
        let bad = EngineConfig {
            thread_name: "sluice\0worker".into(),
            ..config()
        };
        assert!(matches!(
            Engine::launch(bad),
            Err(EngineError::Config(ConfigError::ThreadNameContainsNul))
        ));
    }

    #[test]
    fn submit_and_wait_round_trip() {
        let engine = Engine::launch(config()).unwrap();
        let done = engine.scale(50).unwrap();
        assert_eq!(done.wait(), Ok(ScaleOutput { value: 100 }));
        assert_eq!(engine.metrics().submitted, 1);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut engine = Engine::launch(config()).unwrap();
        engine.scale(1).unwrap().wait().unwrap();
        let first = engine.shutdown();
        assert!(first.worker_joined);
        assert_eq!(first.tasks_processed, 1);
        assert!(first.state_table.is_some());
        let second = engine.shutdown();
        assert_eq!(second.tasks_processed, 0);
        assert!(second.state_table.is_none());
        assert!(!engine.is_accepting());
    }

    #[test]
    fn idle_shutdown_drains_inline() {
        let mut engine = Engine::new(config()).unwrap();
        let done = engine.scale(4).unwrap();
        assert_eq!(engine.queue_len(), 1);
        let report = engine.shutdown();
        assert_eq!(report.drained_on_shutdown, 1);
        assert_eq!(done.wait(), Ok(ScaleOutput { value: 8 }));
    }

    #[test]
    fn submit_after_shutdown_returns_task() {
        let mut engine = Engine::launch(config()).unwrap();
        engine.shutdown();
        let err = engine.scale(1).unwrap_err();
        assert!(matches!(err, SubmitError::Shutdown(Task::Scale { value: 1, .. })));
        assert_eq!(engine.metrics().rejected_shutdown, 1);
        assert_eq!(engine.worker_state(), WorkerState::Stopped);
    }

    #[test]
    fn clock_reader_tracks_wall_time() {
        let engine = Engine::new(config()).unwrap();
        let reader = engine.clock();
        let first = reader.now_ns();
        assert!(first > 0);
        thread::sleep(Duration::from_millis(5));
        assert!(reader.now_ns() >= first);
    }
}
