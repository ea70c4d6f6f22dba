//! Zero-copy structured logging for the sluice execution core.
//!
//! The worker domain must never allocate from the general heap, so log
//! records are assembled directly inside memory the caller already owns:
//! either a [`LogBuffer`] that travels with a task and comes back in its
//! result, or any `&mut [u8]` (for example a span carved out of an arena).
//!
//! Records are a flat sequence of `key=value ` tokens closed by
//! `msg=<text>\n`:
//!
//! ```
//! use sluice_log::LogBuffer;
//!
//! let mut buf = LogBuffer::with_capacity(64);
//! buf.logger().int("ts", 7).str("type", "order").msg("processed");
//! assert_eq!(buf.as_bytes(), b"ts=7 type=order msg=processed\n");
//! ```
//!
//! # Capacity
//!
//! Buffers never grow. A token that does not fit is dropped whole and the
//! destination is marked truncated; every later append on it is ignored.
//! Truncation means the buffer was sized too small for the records written
//! into it and should be treated as a configuration error by the caller.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
mod digits;
pub mod logger;

pub use buffer::LogBuffer;
pub use logger::{LogCursor, Logger};
