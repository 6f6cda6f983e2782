//! C-API Bindings
//!
//! Exposes the slot queue to C/C++ via FFI. The C side drives the two-phase
//! protocol directly, so the single-consumer rule the Rust handles enforce
//! through ownership becomes a documented precondition here.
//!
//! Timeouts are milliseconds: negative waits forever, `0` polls.

#![allow(unsafe_code)]

use crate::ring::Ring;
use crate::types::Timeout;

use std::ffi::c_void;
use std::mem::size_of;
use std::panic::catch_unwind;
use std::ptr;

/// What a slot currently carries.
enum Entry {
    /// Bytes written into the slot buffer.
    Inline { len: usize },
    /// A caller-owned pointer handed over by `ferrule_queue_push`.
    Owned { ptr: *mut c_void, size: usize },
}

// SAFETY: an owned pointer moves with its entry from producer to consumer;
// the C caller promises the pointee may cross threads.
unsafe impl Send for Entry {}

struct CSlot {
    buf: Box<[u8]>,
    entry: Entry,
}

/// Opaque queue handle for C.
pub struct FerruleQueue {
    ring: Ring<CSlot>,
    buf_size: usize,
}

/// Copy the slot's payload location and size out to the caller.
unsafe fn report(slot: &CSlot, buffer: *mut *const u8, size: *mut usize) {
    *buffer = slot.buf.as_ptr();
    if !size.is_null() {
        *size = match slot.entry {
            Entry::Inline { len } => len,
            Entry::Owned { size, .. } => size,
        };
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Create a queue of `len` slots of `buf_size` bytes each.
///
/// `buf_size` is raised to the size of a pointer, since slots filled by
/// `ferrule_queue_push` store the pointer's bytes.
///
/// # Returns
/// A new handle, or null if `len == 0`. Release it with
/// `ferrule_queue_destroy`.
#[no_mangle]
pub extern "C" fn ferrule_queue_create(len: u32, buf_size: usize) -> *mut FerruleQueue {
    let buf_size = buf_size.max(size_of::<*mut c_void>());

    let result = catch_unwind(|| {
        Ring::new(len, || CSlot {
            buf: vec![0u8; buf_size].into_boxed_slice(),
            entry: Entry::Inline { len: 0 },
        })
    });

    match result {
        Ok(Ok(ring)) => {
            log::debug!("C queue created: {len} slots of {buf_size} bytes");
            Box::into_raw(Box::new(FerruleQueue { ring, buf_size }))
        }
        _ => ptr::null_mut(),
    }
}

/// Destroy a queue and null the caller's handle.
///
/// Pointers still queued by `ferrule_queue_push` are not freed; call
/// `ferrule_queue_flush` first.
///
/// # Safety
/// `ctx`, if non-null, must point to a handle from `ferrule_queue_create`
/// (or null) with no push or pop in flight.
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_destroy(ctx: *mut *mut FerruleQueue) {
    if ctx.is_null() || (*ctx).is_null() {
        return;
    }
    drop(Box::from_raw(*ctx));
    *ctx = ptr::null_mut();
}

/// Number of queued items, `0` for a null handle.
///
/// # Safety
/// `ctx` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_length(ctx: *const FerruleQueue) -> u32 {
    if ctx.is_null() {
        return 0;
    }
    (*ctx).ring.len()
}

// =============================================================================
// TWO-PHASE PUSH
// =============================================================================

/// Reserve the next slot and return its buffer of `buf_size` bytes.
///
/// On `true` the producer lock is held until `ferrule_queue_push_end`. On
/// `false` the queue is full (or an argument is null) and nothing is held.
///
/// # Safety
/// - `ctx` must be a live handle
/// - `buffer` must be valid for one pointer write
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_push_begin(ctx: *mut FerruleQueue, buffer: *mut *mut u8) -> bool {
    if ctx.is_null() || buffer.is_null() {
        return false;
    }
    let ring = &(*ctx).ring;
    if !ring.push_begin() {
        return false;
    }
    *buffer = (*ring.push_slot()).buf.as_mut_ptr();
    true
}

/// Publish the reserved slot with `size` bytes, or abandon it if `size == 0`.
///
/// # Safety
/// Must follow a successful `ferrule_queue_push_begin` on the same thread.
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_push_end(ctx: *mut FerruleQueue, size: usize) {
    if ctx.is_null() {
        return;
    }
    let q = &*ctx;
    if size > 0 {
        (*q.ring.push_slot()).entry = Entry::Inline {
            len: size.min(q.buf_size),
        };
    }
    q.ring.push_end(size > 0);
}

// =============================================================================
// TWO-PHASE POP
// =============================================================================

/// Wait up to `timeout` ms for the oldest item.
///
/// On `true`, `*buffer` points at the slot and `*size` (if non-null) holds
/// its length; both stay valid until `ferrule_queue_pop_end`.
///
/// # Safety
/// - `ctx` must be a live handle, and only one thread may ever pop from it
/// - `buffer` must be valid for one pointer write, `size` null or valid
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_pop_begin(
    ctx: *mut FerruleQueue,
    timeout: i32,
    buffer: *mut *const u8,
    size: *mut usize,
) -> bool {
    pop_begin(ctx, timeout, false, buffer, size)
}

/// Like `ferrule_queue_pop_begin`, but skips to the newest item.
///
/// Skipped items are released unread; pointers they carried are not freed.
///
/// # Safety
/// Same as `ferrule_queue_pop_begin`.
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_pop_last_begin(
    ctx: *mut FerruleQueue,
    timeout: i32,
    buffer: *mut *const u8,
    size: *mut usize,
) -> bool {
    pop_begin(ctx, timeout, true, buffer, size)
}

unsafe fn pop_begin(
    ctx: *mut FerruleQueue,
    timeout: i32,
    latest: bool,
    buffer: *mut *const u8,
    size: *mut usize,
) -> bool {
    if ctx.is_null() || buffer.is_null() {
        return false;
    }
    let ring = &(*ctx).ring;
    if !ring.pop_begin(Timeout::from_millis(timeout), latest, |_| {}) {
        return false;
    }
    report(&*ring.pop_slot(), buffer, size);
    true
}

/// Release the slot returned by the last successful pop.
///
/// # Safety
/// Consumer thread only, after a successful pop begin.
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_pop_end(ctx: *mut FerruleQueue) {
    if ctx.is_null() {
        return;
    }
    (*ctx).ring.pop_end();
}

// =============================================================================
// OWNERSHIP TRANSFER
// =============================================================================

/// Queue `opaque` itself, recording `size` alongside it.
///
/// Ownership of the pointee passes to whoever pops it.
///
/// # Returns
/// `false` if the queue is full or `ctx` is null; ownership stays with the
/// caller.
///
/// # Safety
/// `ctx` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_push(ctx: *mut FerruleQueue, opaque: *mut c_void, size: usize) -> bool {
    if ctx.is_null() {
        return false;
    }
    let ring = &(*ctx).ring;
    if !ring.push_begin() {
        return false;
    }
    let slot = &mut *ring.push_slot();
    let bytes = opaque.addr().to_ne_bytes();
    slot.buf[..bytes.len()].copy_from_slice(&bytes);
    slot.entry = Entry::Owned { ptr: opaque, size };
    ring.push_end(true);
    true
}

/// Pop the oldest pointer queued by `ferrule_queue_push`.
///
/// Items pushed through the two-phase API yield a null pointer and their
/// byte length.
///
/// # Safety
/// - `ctx` must be a live handle, and only one thread may ever pop from it
/// - `opaque` must be valid for one pointer write, `size` null or valid
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_pop(
    ctx: *mut FerruleQueue,
    timeout: i32,
    opaque: *mut *mut c_void,
    size: *mut usize,
) -> bool {
    if ctx.is_null() || opaque.is_null() {
        return false;
    }
    let ring = &(*ctx).ring;
    if !ring.pop_begin(Timeout::from_millis(timeout), false, |_| {}) {
        return false;
    }
    let slot = &mut *ring.pop_slot();
    let (ptr, len) = match core::mem::replace(&mut slot.entry, Entry::Inline { len: 0 }) {
        Entry::Owned { ptr, size } => (ptr, size),
        Entry::Inline { len } => (ptr::null_mut(), len),
    };
    *opaque = ptr;
    if !size.is_null() {
        *size = len;
    }
    ring.pop_end();
    true
}

/// Drain the queue without waiting, passing every owned pointer to
/// `free_fn` (if non-null).
///
/// # Safety
/// - `ctx` must be a live handle, called from the consumer thread
/// - `free_fn` must accept every pointer queued by `ferrule_queue_push`
#[no_mangle]
pub unsafe extern "C" fn ferrule_queue_flush(
    ctx: *mut FerruleQueue,
    free_fn: Option<unsafe extern "C" fn(*mut c_void)>,
) {
    if ctx.is_null() {
        return;
    }
    let ring = &(*ctx).ring;
    while ring.pop_begin(Timeout::Poll, false, |_| {}) {
        let slot = &mut *ring.pop_slot();
        if let (Entry::Owned { ptr, .. }, Some(free)) =
            (core::mem::replace(&mut slot.entry, Entry::Inline { len: 0 }), free_fn)
        {
            free(ptr);
        }
        ring.pop_end();
    }
}
