//! Fixed ring of slots shared by one consumer and any number of producers.
//!
//! Each slot alternates `EMPTY -> FULL -> EMPTY`. Producers fill EMPTY slots
//! under `push_lock` and flip them to FULL; the single consumer reads FULL
//! slots without a lock and flips them back. A payload belongs to whichever
//! side may flip its slot next, and the Release store / Acquire load on the
//! slot state hands it across.
//!
//! Producers never block on a full ring. The consumer blocks on [`Signal`]
//! until a push or its deadline.

#![allow(unsafe_code)]

use crate::signal::Signal;
use crate::types::{QueueError, Timeout};
use parking_lot::Mutex;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

const EMPTY: u8 = 0;
const FULL: u8 = 1;

struct Slot<S> {
    state: AtomicU8,
    payload: UnsafeCell<S>,
}

pub(crate) struct Ring<S> {
    slots: Box<[Slot<S>]>,
    capacity: u32,
    push_lock: Mutex<()>,
    push_pos: AtomicU32,
    pop_pos: AtomicU32,
    signal: Signal,
}

// SAFETY: payloads are reached only through the slot protocol: EMPTY slots by
// the producer holding `push_lock`, FULL slots by the single consumer. Payloads
// move between threads, hence `S: Send`.
unsafe impl<S: Send> Sync for Ring<S> {}

impl<S> Ring<S> {
    /// Allocate `capacity` slots, each payload built by `init`.
    pub(crate) fn new(capacity: u32, mut init: impl FnMut() -> S) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        let slots = (0..capacity)
            .map(|_| Slot {
                state: AtomicU8::new(EMPTY),
                payload: UnsafeCell::new(init()),
            })
            .collect();

        Ok(Self {
            slots,
            capacity,
            push_lock: Mutex::new(()),
            push_pos: AtomicU32::new(0),
            pop_pos: AtomicU32::new(0),
            signal: Signal::new(),
        })
    }

    pub(crate) const fn capacity(&self) -> u32 {
        self.capacity
    }

    const fn next(&self, pos: u32) -> u32 {
        if pos + 1 == self.capacity {
            0
        } else {
            pos + 1
        }
    }

    fn slot(&self, pos: u32) -> &Slot<S> {
        &self.slots[pos as usize]
    }

    fn is_full(&self, pos: u32) -> bool {
        self.slot(pos).state.load(Ordering::Acquire) == FULL
    }

    /// Number of FULL slots.
    ///
    /// Exact while neither side is mid-operation, otherwise a snapshot.
    pub(crate) fn len(&self) -> u32 {
        let push = self.push_pos.load(Ordering::Acquire);
        let pop = self.pop_pos.load(Ordering::Acquire);

        match push.cmp(&pop) {
            // Coinciding cursors: either nothing queued or every slot queued.
            core::cmp::Ordering::Equal => {
                if self.is_full(pop) {
                    self.capacity
                } else {
                    0
                }
            }
            core::cmp::Ordering::Greater => push - pop,
            core::cmp::Ordering::Less => self.capacity - pop + push,
        }
    }

    // =========================================================================
    // PRODUCER SIDE
    // =========================================================================

    /// Take the push lock and check the slot at `push_pos`.
    ///
    /// On `true` the lock stays held until [`Ring::push_end`]. On `false` the
    /// ring is full and the lock has already been released.
    pub(crate) fn push_begin(&self) -> bool {
        let guard = self.push_lock.lock();
        if self.is_full(self.push_pos.load(Ordering::Relaxed)) {
            log::trace!("push rejected: all {} slots full", self.capacity);
            return false;
        }
        core::mem::forget(guard);
        true
    }

    /// Payload of the slot reserved by `push_begin`.
    ///
    /// Dereferencing it is sound only between a successful `push_begin` and
    /// the matching `push_end`, on the reserving thread.
    pub(crate) fn push_slot(&self) -> *mut S {
        self.slot(self.push_pos.load(Ordering::Relaxed)).payload.get()
    }

    /// Publish the reserved slot, or abandon it, and release the push lock.
    ///
    /// # Safety
    /// The caller holds the push lock from a successful [`Ring::push_begin`].
    pub(crate) unsafe fn push_end(&self, publish: bool) {
        if publish {
            let pos = self.push_pos.load(Ordering::Relaxed);
            self.push_pos.store(self.next(pos), Ordering::Release);
            self.slot(pos).state.store(FULL, Ordering::Release);
            self.signal.wake();
        }
        // SAFETY: locked by `push_begin`, whose guard was forgotten.
        self.push_lock.force_unlock();
    }

    // =========================================================================
    // CONSUMER SIDE
    // =========================================================================

    /// Wait until the slot at `pop_pos` is FULL.
    ///
    /// With `latest`, every FULL slot that already has a FULL successor is
    /// passed to `discard` and released, so the slot left at `pop_pos` is the
    /// newest one queued. Whatever `discard` returns is dropped only after the
    /// slot is released. Returns `false` if `timeout` passes first.
    ///
    /// # Safety
    /// At most one thread acts as consumer for the life of the ring.
    pub(crate) unsafe fn pop_begin<D>(
        &self,
        timeout: Timeout,
        latest: bool,
        mut discard: impl FnMut(&mut S) -> D,
    ) -> bool {
        let deadline = timeout.deadline();

        loop {
            let pos = self.pop_pos.load(Ordering::Relaxed);

            if self.is_full(pos) {
                let next = self.next(pos);
                // With one slot the successor is the slot itself.
                if latest && next != pos && self.is_full(next) {
                    // SAFETY: FULL slot, owned by the consumer until `pop_end`.
                    let skipped = discard(&mut *self.slot(pos).payload.get());
                    self.pop_end();
                    drop(skipped);
                    continue;
                }
                return true;
            }

            // The flag may be stale from an item already taken; a wakeup with
            // nothing to pop just loops back into the wait.
            if !self.signal.wait(deadline) && !self.is_full(pos) {
                log::trace!("pop timed out with {} slots empty", self.capacity);
                return false;
            }
        }
    }

    /// Payload of the slot at `pop_pos`.
    ///
    /// Dereferencing it is sound only between a successful `pop_begin` and
    /// the matching `pop_end`, on the consumer thread.
    pub(crate) fn pop_slot(&self) -> *mut S {
        self.slot(self.pop_pos.load(Ordering::Relaxed)).payload.get()
    }

    /// Hand the slot at `pop_pos` back to the producers.
    ///
    /// # Safety
    /// Consumer only, after a successful [`Ring::pop_begin`].
    pub(crate) unsafe fn pop_end(&self) {
        let pos = self.pop_pos.load(Ordering::Relaxed);
        self.pop_pos.store(self.next(pos), Ordering::Release);
        self.slot(pos).state.store(EMPTY, Ordering::Release);
    }
}
