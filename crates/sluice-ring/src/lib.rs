//! Bounded lock-free SPSC ring bridging the submission and worker domains.
//!
//! [`channel`] returns the only [`Producer`] and the only [`Consumer`] of a
//! ring. Neither handle is `Clone` and both mutate through `&mut self`, so
//! the single-producer/single-consumer discipline is enforced by the type
//! system rather than by convention.
//!
//! ```
//! let (mut tx, mut rx) = sluice_ring::channel::<u32>(4).unwrap();
//! tx.push(7).unwrap();
//! assert_eq!(rx.pop(), Some(7));
//! assert_eq!(rx.pop(), None);
//! ```
//!
//! Within this crate, `unsafe` code is confined to the [`spsc`] module. The
//! only other `unsafe` site in the workspace is the thread-pinning call in
//! `sluice-engine`'s `affinity` module.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod spsc;

pub use error::{PushError, RingError};
pub use spsc::{channel, Consumer, Producer};
