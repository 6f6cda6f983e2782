//! Two-phase byte queue.
//!
//! Every slot owns a `slot_size` buffer, allocated when the queue is created
//! and reused for its whole life. Producers write straight into a slot
//! through a [`PushGuard`]; the consumer reads it in place through a
//! [`PopGuard`]. Nothing is copied in between.

use crate::ring::Ring;
use crate::types::{QueueError, Timeout};
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use static_assertions::{assert_impl_all, assert_not_impl_any};
use std::sync::Arc;

struct ByteSlot {
    buf: Box<[u8]>,
    len: usize,
}

/// Create a queue of `capacity` slots, each holding up to `slot_size` bytes.
///
/// # Errors
/// `QueueError::ZeroCapacity` or `QueueError::ZeroSlotSize`.
pub fn bounded(capacity: u32, slot_size: usize) -> Result<(Producer, Consumer), QueueError> {
    if slot_size == 0 {
        return Err(QueueError::ZeroSlotSize);
    }
    let ring = Arc::new(Ring::new(capacity, || ByteSlot {
        buf: vec![0u8; slot_size].into_boxed_slice(),
        len: 0,
    })?);
    log::debug!("byte queue created: {capacity} slots of {slot_size} bytes");

    Ok((
        Producer {
            ring: Arc::clone(&ring),
            slot_size,
        },
        Consumer { ring, slot_size },
    ))
}

// =============================================================================
// PRODUCER
// =============================================================================

/// Sending half. Clones share the queue and take turns on its push lock.
#[derive(Clone)]
pub struct Producer {
    ring: Arc<Ring<ByteSlot>>,
    slot_size: usize,
}

assert_impl_all!(Producer: Send, Sync, Clone);

impl Producer {
    /// Reserve the next slot, or `None` if every slot is full.
    ///
    /// Never waits for the consumer. The guard holds the push lock, so other
    /// producers block until it is committed or dropped.
    #[allow(unsafe_code)]
    pub fn push_begin(&mut self) -> Option<PushGuard<'_>> {
        if !self.ring.push_begin() {
            return None;
        }
        // SAFETY: `push_begin` succeeded, so the slot is EMPTY and this thread
        // holds the push lock until the guard drops.
        let slot = unsafe { &mut *self.ring.push_slot() };
        Some(PushGuard {
            ring: &self.ring,
            slot,
            len: 0,
            _not_send: PhantomData,
        })
    }

    /// Copy `data` into the next slot and publish it.
    ///
    /// Returns `false` when the queue is full, or when `data` is empty or
    /// larger than a slot.
    pub fn push(&mut self, data: &[u8]) -> bool {
        if data.is_empty() || data.len() > self.slot_size {
            return false;
        }
        self.push_begin().is_some_and(|mut guard| {
            guard[..data.len()].copy_from_slice(data);
            guard.commit(data.len());
            true
        })
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

    /// Bytes per slot.
    pub const fn slot_size(&self) -> usize {
        self.slot_size
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.capacity())
            .field("slot_size", &self.slot_size)
            .field("len", &self.len())
            .finish()
    }
}

/// A reserved slot. Derefs to the whole slot buffer.
///
/// [`commit`](PushGuard::commit) publishes it; dropping the guard abandons
/// the reservation and the slot stays free.
///
/// The guard holds the push lock, so like a `MutexGuard` it must be dropped
/// on the thread that created it.
pub struct PushGuard<'a> {
    ring: &'a Ring<ByteSlot>,
    slot: &'a mut ByteSlot,
    len: usize,
    _not_send: PhantomData<*const ()>,
}

assert_not_impl_any!(PushGuard<'static>: Send);

impl PushGuard<'_> {
    /// Publish the first `len` bytes and wake the consumer.
    ///
    /// `len == 0` abandons the slot. A `len` past the slot size is a caller
    /// bug: it asserts in debug builds and is clamped otherwise.
    pub fn commit(mut self, len: usize) {
        debug_assert!(
            len <= self.slot.buf.len(),
            "commit of {len} bytes into a {}-byte slot",
            self.slot.buf.len()
        );
        self.len = len.min(self.slot.buf.len());
    }
}

impl Deref for PushGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.slot.buf
    }
}

impl DerefMut for PushGuard<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.slot.buf
    }
}

impl Drop for PushGuard<'_> {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        self.slot.len = self.len;
        // SAFETY: guards are only built after a successful `push_begin`.
        unsafe {
            self.ring.push_end(self.len > 0);
        }
    }
}

// =============================================================================
// CONSUMER
// =============================================================================

/// Receiving half.
///
/// There is exactly one per queue: it is not `Clone` and every pop borrows
/// it mutably, so two pops can never race on the read cursor.
pub struct Consumer {
    ring: Arc<Ring<ByteSlot>>,
    slot_size: usize,
}

assert_impl_all!(Consumer: Send, Sync);
assert_not_impl_any!(Consumer: Clone);

impl Consumer {
    /// Wait up to `timeout` for the oldest item.
    pub fn pop_begin(&mut self, timeout: Timeout) -> Option<PopGuard<'_>> {
        self.begin(timeout, false)
    }

    /// Wait up to `timeout` for an item, then skip to the newest one.
    ///
    /// Older items are released unread. Meant for consumers that only care
    /// about the latest state, such as a frame queue.
    pub fn pop_latest_begin(&mut self, timeout: Timeout) -> Option<PopGuard<'_>> {
        self.begin(timeout, true)
    }

    #[allow(unsafe_code)]
    fn begin(&mut self, timeout: Timeout, latest: bool) -> Option<PopGuard<'_>> {
        // SAFETY: `Consumer` is unique per queue and borrowed mutably here.
        if !unsafe { self.ring.pop_begin(timeout, latest, |_| {}) } {
            return None;
        }
        // SAFETY: the slot at the read cursor is FULL and stays ours until
        // the guard calls `pop_end`.
        let slot = unsafe { &*self.ring.pop_slot() };
        Some(PopGuard {
            ring: &self.ring,
            slot,
        })
    }

    /// Release every queued item without waiting. Returns how many.
    pub fn flush(&mut self) -> usize {
        let mut n = 0;
        while self.pop_begin(Timeout::Poll).is_some() {
            n += 1;
        }
        n
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

    /// Bytes per slot.
    pub const fn slot_size(&self) -> usize {
        self.slot_size
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &self.capacity())
            .field("slot_size", &self.slot_size)
            .field("len", &self.len())
            .finish()
    }
}

/// A popped item, read in place. Derefs to the committed bytes.
///
/// Dropping it (or calling [`finish`](PopGuard::finish)) frees the slot.
pub struct PopGuard<'a> {
    ring: &'a Ring<ByteSlot>,
    slot: &'a ByteSlot,
}

impl PopGuard<'_> {
    /// Release the slot back to the producers.
    pub fn finish(self) {
        drop(self);
    }
}

impl Deref for PopGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.slot.buf[..self.slot.len]
    }
}

impl Drop for PopGuard<'_> {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        // SAFETY: guards are only built after a successful `pop_begin` by the
        // unique consumer.
        unsafe {
            self.ring.pop_end();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_sizes() {
        assert_eq!(bounded(0, 8).err(), Some(QueueError::ZeroCapacity));
        assert_eq!(bounded(4, 0).err(), Some(QueueError::ZeroSlotSize));
    }

    #[test]
    fn test_guard_sees_whole_slot() {
        let (mut tx, mut rx) = bounded(2, 32).unwrap();
        let mut guard = tx.push_begin().unwrap();
        assert_eq!(guard.len(), 32);
        guard[..3].copy_from_slice(b"abc");
        guard.commit(3);

        let item = rx.pop_begin(Timeout::Poll).unwrap();
        assert_eq!(&*item, b"abc");
    }

    #[test]
    fn test_zero_commit_aborts() {
        let (mut tx, mut rx) = bounded(2, 8).unwrap();
        tx.push_begin().unwrap().commit(0);
        assert!(rx.pop_begin(Timeout::Poll).is_none());
        assert!(tx.is_empty());
    }

    #[test]
    fn test_push_rejects_bad_sizes() {
        let (mut tx, _rx) = bounded(2, 4).unwrap();
        assert!(!tx.push(b""));
        assert!(!tx.push(b"too long"));
        assert!(tx.push(b"fits"));
    }
}
