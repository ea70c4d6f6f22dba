//! Sluice: a low-latency execution core that feeds one pinned worker thread
//! through a lock-free queue.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! sluice sub-crates. For most users, adding `sluice` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use sluice::prelude::*;
//!
//! let mut engine = Engine::launch(EngineConfig::default()).unwrap();
//!
//! let doubled = engine.scale(50).unwrap().wait().unwrap();
//! assert_eq!(doubled.value, 100);
//!
//! let order = Order { id: EntityId(1), price: 100.0, quantity: 5 };
//! let out = engine
//!     .aggregate(order, Some(LogBuffer::with_capacity(256)))
//!     .unwrap()
//!     .wait()
//!     .unwrap();
//! assert_eq!(out.total, 500.0);
//! let line = std::str::from_utf8(out.log.as_ref().unwrap().as_bytes()).unwrap();
//! assert!(line.ends_with("type=order uid=1 msg=processed\n"));
//!
//! let report = engine.shutdown();
//! assert_eq!(report.tasks_processed, 2);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`log`] | `sluice-log` | Zero-copy key/value logger over caller buffers |
//! | [`arena`] | `sluice-arena` | Bump arena, typed handles, region pool |
//! | [`ring`] | `sluice-ring` | Bounded SPSC ring |
//! | [`types`] | `sluice-core` | Tasks, outputs, completions, task errors |
//! | [`engine`] | `sluice-engine` | Worker engine, config, clock cache, metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Zero-copy structured logging (`sluice-log`).
///
/// [`log::Logger`] writes `key=value` records straight into a
/// [`log::LogBuffer`] the caller owns.
pub use sluice_log as log;

/// Bump arena and region pool (`sluice-arena`).
pub use sluice_arena as arena;

/// Bounded single-producer/single-consumer ring (`sluice-ring`).
pub use sluice_ring as ring;

/// Task, output, and completion types (`sluice-core`).
///
/// Every [`types::Task`] is built together with the
/// [`types::Completion`] its submitter waits on.
pub use sluice_core as types;

/// The worker engine (`sluice-engine`).
///
/// [`engine::Engine`] owns the pinned worker, the clock cache thread, and
/// the arena pool.
pub use sluice_engine as engine;

/// Common imports for typical sluice usage.
///
/// ```rust
/// use sluice::prelude::*;
/// ```
pub mod prelude {
    // Logging
    pub use sluice_log::{LogBuffer, Logger};

    // Arena
    pub use sluice_arena::{Arena, ArenaConfig, ArenaError};

    // Tasks and completions
    pub use sluice_core::{
        AggregateOutput, Completion, CompletionError, EntityId, Order, ScaleOutput, Task,
        TaskError, VolumeOutput,
    };

    // Engine
    pub use sluice_engine::{
        AliasPolicy, Engine, EngineConfig, EngineError, EngineMetrics, ShutdownReport,
        SubmitError,
    };
}
