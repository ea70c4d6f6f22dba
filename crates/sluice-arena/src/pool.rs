//! Recycling of arena regions.
//!
//! Zeroing a 64 MiB region is the expensive part of creating an arena, so
//! released arenas are reset and parked in a bounded lock-free queue for the
//! next [`acquire`](ArenaPool::acquire). The pool may be shared across
//! threads; each arena it hands out has exactly one owner.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_queue::ArrayQueue;

use crate::bump::Arena;
use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Counters describing pool traffic since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Arenas created because the pool had nothing suitable.
    pub created: u64,
    /// Acquisitions served from the pool.
    pub reused: u64,
    /// Arenas returned and retained.
    pub released: u64,
    /// Arenas returned to a full pool and dropped.
    pub discarded: u64,
}

/// A bounded pool of reusable arenas.
pub struct ArenaPool {
    idle: ArrayQueue<Arena>,
    region_bytes: usize,
    created: AtomicU64,
    reused: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl ArenaPool {
    /// Create an empty pool. No region is allocated until the first acquire.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            idle: ArrayQueue::new(config.pool_capacity),
            region_bytes: config.region_bytes,
            created: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            released: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        })
    }

    /// Take an arena with the configured region size.
    pub fn acquire(&self) -> Arena {
        self.acquire_with_capacity(self.region_bytes)
    }

    /// Take an arena whose region holds at least `min_bytes`.
    ///
    /// A pooled arena that is too small is put back (or dropped if another
    /// thread refilled the pool meanwhile) and a fresh one is created.
    pub fn acquire_with_capacity(&self, min_bytes: usize) -> Arena {
        if let Some(arena) = self.idle.pop() {
            if arena.capacity() >= min_bytes {
                self.reused.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    capacity = arena.capacity(),
                    epoch = arena.epoch(),
                    "reusing pooled arena"
                );
                return arena;
            }
            if self.idle.push(arena).is_err() {
                self.discarded.fetch_add(1, Ordering::Relaxed);
            }
        }

        let capacity = min_bytes.max(self.region_bytes);
        self.created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(capacity, "allocating arena region");
        Arena::new(capacity)
    }

    /// Reset `arena` and return it to the pool.
    pub fn release(&self, mut arena: Arena) {
        arena.reset();
        match self.idle.push(arena) {
            Ok(()) => {
                self.released.fetch_add(1, Ordering::Relaxed);
            }
            Err(dropped) => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(capacity = dropped.capacity(), "pool full, dropping arena");
            }
        }
    }

    /// Drop every pooled arena, returning how many were freed.
    pub fn drain(&self) -> usize {
        let mut freed = 0;
        while self.idle.pop().is_some() {
            freed += 1;
        }
        if freed > 0 {
            tracing::debug!(freed, "drained arena pool");
        }
        freed
    }

    /// Number of arenas currently parked in the pool.
    pub fn available(&self) -> usize {
        self.idle.len()
    }

    /// Region size of arenas created by [`acquire`](Self::acquire).
    pub fn region_bytes(&self) -> usize {
        self.region_bytes
    }

    /// Snapshot of the traffic counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ArenaPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaPool")
            .field("region_bytes", &self.region_bytes)
            .field("available", &self.available())
            .field("stats", &self.stats())
            .finish()
    }
}

const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ArenaPool>();
};
