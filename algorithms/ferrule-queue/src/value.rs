//! Ownership-transfer queue.
//!
//! Each slot holds an `Option<T>`: pushing moves a value in, popping moves it
//! out. Values that are skipped by [`ValueConsumer::pop_latest`], flushed, or
//! still queued when both halves are gone are dropped exactly once.

use crate::ring::Ring;
use crate::types::{QueueError, Timeout};
use core::fmt;
use static_assertions::{assert_impl_all, assert_not_impl_any};
use std::sync::Arc;

/// Create a queue of `capacity` slots carrying values of `T`.
///
/// # Errors
/// `QueueError::ZeroCapacity`.
pub fn bounded<T: Send>(capacity: u32) -> Result<(ValueProducer<T>, ValueConsumer<T>), QueueError> {
    let ring = Arc::new(Ring::new(capacity, || None)?);
    log::debug!(
        "value queue created: {capacity} slots of {}",
        core::any::type_name::<T>()
    );
    Ok((
        ValueProducer {
            ring: Arc::clone(&ring),
        },
        ValueConsumer { ring },
    ))
}

// =============================================================================
// PRODUCER
// =============================================================================

/// Sending half. Clones share the queue.
pub struct ValueProducer<T> {
    ring: Arc<Ring<Option<T>>>,
}

assert_impl_all!(ValueProducer<Vec<u8>>: Send, Sync);

impl<T> Clone for ValueProducer<T> {
    fn clone(&self) -> Self {
        Self {
            ring: Arc::clone(&self.ring),
        }
    }
}

impl<T> ValueProducer<T> {
    /// Move `value` into the queue.
    ///
    /// # Errors
    /// The queue is full; the value is handed back.
    #[allow(unsafe_code)]
    pub fn push(&self, value: T) -> Result<(), T> {
        if !self.ring.push_begin() {
            return Err(value);
        }
        // SAFETY: `push_begin` reserved an EMPTY slot for this thread.
        unsafe {
            *self.ring.push_slot() = Some(value);
            self.ring.push_end(true);
        }
        Ok(())
    }

    /// Items currently queued.
    pub fn len(&self) -> u32 {
        self.ring.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> u32 {
        self.ring.capacity()
    }
}

impl<T> fmt::Debug for ValueProducer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueProducer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

// =============================================================================
// CONSUMER
// =============================================================================

/// Receiving half. One per queue; not `Clone`.
pub struct ValueConsumer<T> {
    ring: Arc<Ring<Option<T>>>,
}

assert_impl_all!(ValueConsumer<Vec<u8>>: Send);
assert_not_impl_any!(ValueConsumer<Vec<u8>>: Clone);

impl<T> ValueConsumer<T> {
    /// Wait up to `timeout` for the oldest value.
    pub fn pop(&mut self, timeout: Timeout) -> Option<T> {
        self.take(timeout, false)
    }

    /// Wait up to `timeout` for a value, then return the newest one queued.
    ///
    /// Every older value is dropped.
    pub fn pop_latest(&mut self, timeout: Timeout) -> Option<T> {
        self.take(timeout, true)
    }

    #[allow(unsafe_code)]
    fn take(&mut self, timeout: Timeout, latest: bool) -> Option<T> {
        // SAFETY: `ValueConsumer` is unique per queue and borrowed mutably,
        // and the slot at the read cursor is FULL between begin and end.
        unsafe {
            if !self.ring.pop_begin(timeout, latest, Option::take) {
                return None;
            }
            let value = (*self.ring.pop_slot()).take();
            self.ring.pop_end();
            value
        }
    }

    /// Drain every queued value into `free` without waiting. Returns how many.
    pub fn flush_with(&mut self, mut free: impl FnMut(T)) -> usize {
        let mut n = 0;
        while let Some(v) = self.pop(Timeout::Poll) {
            free(v);
            n += 1;
        }
        n
    }

    /// Drop every queued value without waiting. Returns how many.
    pub fn flush(&mut self) -> usize {
        self.flush_with(drop)
    }

    /// Items currently queued.
    pub fn len(&self) -> u32 {
        self.ring.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> u32 {
        self.ring.capacity()
    }
}

impl<T> fmt::Debug for ValueConsumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueConsumer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
