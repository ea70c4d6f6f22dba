//! Benchmark profiles for the sluice execution core.
//!
//! - [`bench_config`]: a production-shaped engine (64 MiB arena, 1024-slot
//!   queue) with the worker left unpinned so benches run anywhere.
//! - [`pinned_config`]: the same, pinned to one core.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use sluice_arena::ArenaConfig;
use sluice_engine::EngineConfig;

/// Engine configuration used by the round-trip benchmarks.
pub fn bench_config() -> EngineConfig {
    EngineConfig {
        arena: ArenaConfig::default(),
        thread_name: "sluice-bench-worker".into(),
        ..EngineConfig::default()
    }
}

/// [`bench_config`] with the worker pinned to `core`.
pub fn pinned_config(core: usize) -> EngineConfig {
    EngineConfig {
        pin_core: Some(core),
        ..bench_config()
    }
}
