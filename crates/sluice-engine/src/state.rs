//! Bounded, direct-indexed state table owned by the worker.
//!
//! A fixed array of `f64` accumulators replaces an associative map: lookup
//! is a mask, never a hash, and nothing grows after construction.

use sluice_core::{EntityId, TaskError};

/// How ids larger than the table are mapped to slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AliasPolicy {
    /// `id & (size - 1)`. Distinct ids may share a slot.
    #[default]
    Shard,
    /// Ids `>= size` fail with [`TaskError::IdOutOfRange`].
    Reject,
}

/// Fixed-size table of per-slot accumulated values.
#[derive(Clone, Debug, PartialEq)]
pub struct StateTable {
    slots: Box<[f64]>,
    mask: u64,
    policy: AliasPolicy,
}

impl StateTable {
    /// Build a zeroed table. `size` must be a non-zero power of two;
    /// [`EngineConfig::validate`](crate::EngineConfig::validate) checks this
    /// before the engine calls here.
    pub fn new(size: usize, policy: AliasPolicy) -> Option<Self> {
        if size == 0 || !size.is_power_of_two() {
            return None;
        }
        Some(Self {
            slots: vec![0.0; size].into_boxed_slice(),
            mask: size as u64 - 1,
            policy,
        })
    }

    /// Resolve an id to its slot under the table's alias policy.
    pub fn slot_for(&self, id: EntityId) -> Result<usize, TaskError> {
        match self.policy {
            AliasPolicy::Shard => Ok((id.0 & self.mask) as usize),
            AliasPolicy::Reject if id.0 > self.mask => Err(TaskError::IdOutOfRange {
                id,
                table_size: self.slots.len(),
            }),
            AliasPolicy::Reject => Ok(id.0 as usize),
        }
    }

    /// Add `delta` to the slot for `id`; returns the slot and its new value.
    pub fn add(&mut self, id: EntityId, delta: f64) -> Result<(usize, f64), TaskError> {
        let slot = self.slot_for(id)?;
        Ok((slot, self.add_at(slot, delta)))
    }

    /// Add `delta` to a known slot, returning the new value.
    ///
    /// `slot` is masked into range.
    pub fn add_at(&mut self, slot: usize, delta: f64) -> f64 {
        let cell = &mut self.slots[slot & self.mask as usize];
        *cell += delta;
        *cell
    }

    /// Current value for `id`.
    pub fn get(&self, id: EntityId) -> Result<(usize, f64), TaskError> {
        let slot = self.slot_for(id)?;
        Ok((slot, self.slots[slot]))
    }

    /// Current value of a slot, or `None` past the end.
    pub fn value_at(&self, slot: usize) -> Option<f64> {
        self.slots.get(slot).copied()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false: tables have at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sum over every slot.
    pub fn total(&self) -> f64 {
        self.slots.iter().sum()
    }

    /// The alias policy in force.
    pub fn policy(&self) -> AliasPolicy {
        self.policy
    }
}
