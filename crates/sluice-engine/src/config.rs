//! Engine configuration, validation, and error types.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use sluice_arena::{ArenaConfig, ArenaError};
use sluice_ring::RingError;

use crate::state::AliasPolicy;

// ── IdleBackoffConfig ─────────────────────────────────────────────

/// Shape of the worker's idle escalation when the queue is empty.
///
/// The worker spins `spin_limit` times, then yields `yield_limit` times,
/// then parks for `sleep` per empty poll until a task arrives. Submitters
/// unpark a parked worker, so `sleep` bounds the cost of a missed wakeup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdleBackoffConfig {
    /// Empty polls answered with `spin_loop`. Default: 64.
    pub spin_limit: u32,
    /// Empty polls answered with `yield_now` after spinning. Default: 64.
    pub yield_limit: u32,
    /// Park duration once spinning and yielding are exhausted. Default: 50µs.
    pub sleep: Duration,
}

impl Default for IdleBackoffConfig {
    fn default() -> Self {
        Self {
            spin_limit: 64,
            yield_limit: 64,
            sleep: Duration::from_micros(50),
        }
    }
}

// ── ConfigError ───────────────────────────────────────────────────

/// Errors detected during [`EngineConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Arena configuration is invalid.
    Arena(ArenaError),
    /// Queue capacity is not a non-zero power of two.
    Queue(RingError),
    /// State table size is not a non-zero power of two.
    StateTableSize {
        /// The configured size.
        size: usize,
    },
    /// Clock cadence is zero.
    ClockCadenceZero,
    /// `reset_every` is zero.
    ResetEveryZero,
    /// Idle park duration is zero, which would turn parking into spinning.
    IdleSleepZero,
    /// Worker thread name is empty.
    EmptyThreadName,
    /// Worker thread name contains a NUL byte, which the OS cannot take.
    ThreadNameContainsNul,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Queue(e) => write!(f, "queue: {e}"),
            Self::StateTableSize { size } => {
                write!(f, "state table size {size} is not a non-zero power of two")
            }
            Self::ClockCadenceZero => write!(f, "clock cadence must be non-zero"),
            Self::ResetEveryZero => write!(f, "reset_every must be at least 1"),
            Self::IdleSleepZero => write!(f, "idle sleep must be non-zero"),
            Self::EmptyThreadName => write!(f, "worker thread name must not be empty"),
            Self::ThreadNameContainsNul => {
                write!(f, "worker thread name must not contain a NUL byte")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Queue(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for ConfigError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<RingError> for ConfigError {
    fn from(e: RingError) -> Self {
        Self::Queue(e)
    }
}

// ── EngineConfig ──────────────────────────────────────────────────

/// Startup configuration for an [`Engine`](crate::Engine).
///
/// Every value is fixed once the engine is built.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Arena region size and pool bound.
    pub arena: ArenaConfig,
    /// Slots in the submission queue. Power of two. Default: 1024.
    pub queue_capacity: usize,
    /// Refresh interval of the cached clock. Default: 1ms.
    pub clock_cadence: Duration,
    /// Slots in the state table. Power of two. Default: 1024.
    pub state_table_size: usize,
    /// How ids beyond the state table are handled. Default: shard.
    pub alias_policy: AliasPolicy,
    /// Tasks per arena epoch. Default: 1 (reset after every task).
    ///
    /// Scratch from every task in a batch stays live until the batch ends,
    /// so `arena.region_bytes` must hold `reset_every` tasks' allocations.
    /// Running out mid-batch is a fatal [`WorkerFault::Arena`](crate::WorkerFault::Arena).
    pub reset_every: u32,
    /// Idle escalation when the queue is empty.
    pub idle: IdleBackoffConfig,
    /// CPU core to pin the worker to. Default: unpinned.
    pub pin_core: Option<usize>,
    /// Name of the worker thread. Default: `"sluice-worker"`.
    pub thread_name: String,
}

impl EngineConfig {
    /// Default queue capacity.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
    /// Default state table size.
    pub const DEFAULT_STATE_TABLE_SIZE: usize = 1024;
    /// Default clock refresh interval.
    pub const DEFAULT_CLOCK_CADENCE: Duration = Duration::from_millis(1);

    /// Check every invariant, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        if self.queue_capacity == 0 || !self.queue_capacity.is_power_of_two() {
            return Err(ConfigError::Queue(RingError::InvalidCapacity {
                capacity: self.queue_capacity,
            }));
        }
        if self.state_table_size == 0 || !self.state_table_size.is_power_of_two() {
            return Err(ConfigError::StateTableSize {
                size: self.state_table_size,
            });
        }
        if self.clock_cadence.is_zero() {
            return Err(ConfigError::ClockCadenceZero);
        }
        if self.reset_every == 0 {
            return Err(ConfigError::ResetEveryZero);
        }
        if self.idle.sleep.is_zero() {
            return Err(ConfigError::IdleSleepZero);
        }
        if self.thread_name.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        if self.thread_name.contains('\0') {
            return Err(ConfigError::ThreadNameContainsNul);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            clock_cadence: Self::DEFAULT_CLOCK_CADENCE,
            state_table_size: Self::DEFAULT_STATE_TABLE_SIZE,
            alias_policy: AliasPolicy::default(),
            reset_every: 1,
            idle: IdleBackoffConfig::default(),
            pin_core: None,
            thread_name: String::from("sluice-worker"),
        }
    }
}
