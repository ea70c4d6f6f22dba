//! Idle escalation for the worker loop.
//!
//! An empty poll first spins, then yields, then parks. Any successful pop
//! calls [`IdleBackoff::reset`] and the next idle period starts spinning
//! again, so a busy queue never pays for a syscall while an idle one
//! costs at most one park per `sleep` interval.

use std::time::Duration;

use crate::config::IdleBackoffConfig;

/// What the worker should do after an empty poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdlePhase {
    /// `std::hint::spin_loop()`.
    Spin,
    /// `std::thread::yield_now()`.
    Yield,
    /// `std::thread::park_timeout(duration)`.
    Sleep(Duration),
}

/// Spin/yield/park state machine.
#[derive(Clone, Debug)]
pub struct IdleBackoff {
    config: IdleBackoffConfig,
    empty_polls: u32,
}

impl IdleBackoff {
    /// Start in the spinning phase.
    pub fn new(config: &IdleBackoffConfig) -> Self {
        Self {
            config: config.clone(),
            empty_polls: 0,
        }
    }

    /// Record an empty poll and return the action for it.
    pub fn next_phase(&mut self) -> IdlePhase {
        let n = self.empty_polls;
        self.empty_polls = self.empty_polls.saturating_add(1);
        if n < self.config.spin_limit {
            IdlePhase::Spin
        } else if n - self.config.spin_limit < self.config.yield_limit {
            IdlePhase::Yield
        } else {
            IdlePhase::Sleep(self.config.sleep)
        }
    }

    /// Back to spinning; called after every successful pop.
    #[inline]
    pub fn reset(&mut self) {
        self.empty_polls = 0;
    }

    /// Consecutive empty polls since the last reset.
    pub fn empty_polls(&self) -> u32 {
        self.empty_polls
    }
}
