//! # ferrule-queue
//!
//! Bounded slot queue with two-phase push/pop.
//! A fixed ring of slots, each owned by the producer side until published
//! and by the consumer until released. Producers never block; the consumer
//! can wait with a timeout.

//! # Usage
//! ```rust
//! use ferrule_queue::{bytes, value, Timeout};
//!
//! // 1. Bytes, written and read in place
//! let (mut tx, mut rx) = bytes::bounded(4, 64)?;
//! let mut slot = tx.push_begin().expect("queue has room");
//! slot[..5].copy_from_slice(b"frame");
//! slot.commit(5);
//! assert_eq!(&*rx.pop_begin(Timeout::Poll).expect("item queued"), b"frame");
//!
//! // 2. Owned values, keeping only the newest
//! let (tx, mut rx) = value::bounded::<u32>(8)?;
//! for frame in 1..=3 {
//!     tx.push(frame).expect("queue has room");
//! }
//! assert_eq!(rx.pop_latest(Timeout::Poll), Some(3));
//! assert!(rx.is_empty());
//! # Ok::<(), ferrule_queue::QueueError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod bytes;
pub mod ffi;
mod ring;
mod signal;
mod types;
pub mod value;

// =============================================================================
// EXPORTS
// =============================================================================

pub use bytes::{Consumer, PopGuard, Producer, PushGuard};
pub use types::{QueueError, Timeout};
pub use value::{ValueConsumer, ValueProducer};
