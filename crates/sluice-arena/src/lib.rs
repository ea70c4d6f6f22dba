//! Bump-pointer arena for allocation-free task execution.
//!
//! An [`Arena`] owns one fixed-size byte region and a cursor. Allocation
//! advances the cursor past alignment padding and hands out a zero-filled
//! span; [`Arena::reset`] rewinds the cursor in O(1) and starts a new
//! *epoch*. There is no per-allocation free.
//!
//! # Architecture
//!
//! ```text
//! ArenaPool (bounded, owned by the engine lifecycle)
//! └── Arena × N (reused across engine restarts)
//!     ├── Box<[u8]> region (allocated once, zeroed once)
//!     ├── cursor / high-water mark
//!     └── epoch (bumped by every reset)
//! ```
//!
//! # Handles instead of pointers
//!
//! Allocations are returned either as a borrowed slice (the borrow checker
//! ties it to the current epoch) or as a [`Span`] / [`Typed`] /
//! [`ArraySpan`] handle carrying the epoch it was issued in. Resolving a
//! handle from an earlier epoch fails with [`ArenaError::StaleHandle`]
//! rather than reading whatever the next epoch wrote there. Typed values
//! are encoded through the sealed [`Scalar`] trait, so no byte region is
//! ever reinterpreted as a structured value.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bump;
pub mod config;
pub mod error;
pub mod handle;
pub mod pool;
pub mod scalar;

pub use bump::Arena;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use handle::{ArraySpan, Span, Typed};
pub use pool::{ArenaPool, PoolStats};
pub use scalar::Scalar;
