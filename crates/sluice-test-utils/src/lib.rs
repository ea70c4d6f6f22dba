//! Shared fixtures for sluice integration tests and benchmarks.
//!
//! Small engine configurations that keep tests fast (kilobyte arenas,
//! short queues) plus helpers for building orders and polling on
//! conditions with a deadline.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::thread;
use std::time::{Duration, Instant};

use sluice_arena::ArenaConfig;
use sluice_core::{EntityId, Order};
use sluice_engine::{EngineConfig, IdleBackoffConfig};

/// A small engine: 64 KiB arena, 64-slot queue, 1024-slot state table.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        arena: ArenaConfig {
            region_bytes: 64 * 1024,
            pool_capacity: 1,
        },
        queue_capacity: 64,
        idle: IdleBackoffConfig {
            spin_limit: 16,
            yield_limit: 16,
            sleep: Duration::from_micros(200),
        },
        thread_name: "sluice-test-worker".into(),
        ..EngineConfig::default()
    }
}

/// [`test_config`] with a different queue capacity.
pub fn config_with_queue(queue_capacity: usize) -> EngineConfig {
    EngineConfig {
        queue_capacity,
        ..test_config()
    }
}

/// [`test_config`] with a different arena region size.
pub fn config_with_region(region_bytes: usize) -> EngineConfig {
    EngineConfig {
        arena: ArenaConfig {
            region_bytes,
            pool_capacity: 1,
        },
        ..test_config()
    }
}

pub fn order(id: u64, price: f64, quantity: i64) -> Order {
    Order {
        id: EntityId(id),
        price,
        quantity,
    }
}

/// Poll `cond` every millisecond until it holds or `timeout` passes.
/// Returns whether it held.
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
