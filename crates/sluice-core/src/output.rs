//! Typed task outputs.

use sluice_log::LogBuffer;

/// Result of a scale task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleOutput {
    /// The doubled input.
    pub value: i64,
}

/// Result of an aggregate task.
#[derive(Debug)]
pub struct AggregateOutput {
    /// `price * quantity`.
    pub total: f64,
    /// Cached clock reading taken while processing, Unix nanoseconds.
    pub processed_at_ns: i64,
    /// State-table slot the order was accumulated into.
    pub slot: usize,
    /// Accumulated volume of that slot after this order.
    pub volume: f64,
    /// The caller's log buffer, with one record appended, if one was sent.
    pub log: Option<LogBuffer>,
}

/// Result of a volume query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeOutput {
    /// State-table slot the id resolved to.
    pub slot: usize,
    /// Accumulated volume of that slot.
    pub volume: f64,
}
