//! Single-worker execution engine for allocation-free task processing.
//!
//! Submission threads hand [`Task`](sluice_core::Task)s to one dedicated
//! worker over a lock-free SPSC ring; the worker dispatches each task with
//! an exhaustive `match`, using a bump arena for scratch memory, a bounded
//! state table for accumulated values, and a cached clock for timestamps.
//!
//! # Architecture
//!
//! ```text
//! Submitter thread(s)          sluice-worker (pinned)          sluice-clock
//!     |                             |                              |
//!     |--Engine::submit()---------->| consumer.pop()               | store now_ns
//!     |  [Mutex<Producer>]          | executor.run(task)           | park_timeout(1ms)
//!     |  [SPSC ring: 1024]          |   arena / state table / log  |
//!     |  unpark if parked           | reply.publish(result)        |
//!     |<--Completion::wait()--------| arena.reset() per batch      |
//!     |                             | idle: spin -> yield -> park  |
//! ```
//!
//! Nothing on the worker's hot path locks, allocates on the heap, or logs.
//! Accepted tasks are never cancelled: shutdown drains the queue first.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod affinity;
pub mod backoff;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub(crate) mod executor;
pub mod metrics;
pub mod state;
pub(crate) mod worker;

pub use clock::{ClockCache, ClockReader};
pub use config::{ConfigError, EngineConfig, IdleBackoffConfig};
pub use engine::{Engine, ShutdownReport};
pub use error::{EngineError, SubmitError, WorkerFault};
pub use metrics::{EngineMetrics, WorkerState};
pub use state::{AliasPolicy, StateTable};
