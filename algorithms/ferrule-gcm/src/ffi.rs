//! C-API Bindings
//!
//! Exposes the AES-128-GCM context to C/C++ via FFI with pointer checks and
//! panic boundaries.
//!
//! # Return codes
//! - `0`: Success
//! - `-1`: Null pointer
//! - `-2`: Panic caught at the boundary
//! - `-3`: Invalid argument (key, nonce or tag length)
//! - `-4`: Authentication failed

#![allow(unsafe_code)]

use crate::context::AesGcm;
use crate::kernels::constants::TAG_SIZE;
use crate::types::GcmError;

use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::ptr;
use std::slice;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Success.
pub const FERRULE_OK: i32 = 0;
/// A required pointer was null.
pub const FERRULE_ERR_NULL: i32 = -1;
/// A panic was caught at the boundary.
pub const FERRULE_ERR_PANIC: i32 = -2;
/// Key, nonce or tag length out of range.
pub const FERRULE_ERR_INVALID: i32 = -3;
/// Tag mismatch on decrypt.
pub const FERRULE_ERR_AUTH: i32 = -4;

/// Opaque context handle for C.
pub struct FerruleAesGcm(AesGcm);

const fn status(err: GcmError) -> i32 {
    match err {
        GcmError::AuthenticationFailed => FERRULE_ERR_AUTH,
        _ => FERRULE_ERR_INVALID,
    }
}

/// Borrow `len` bytes, treating `(null, 0)` as the empty slice.
unsafe fn input<'a>(p: *const u8, len: usize) -> Option<&'a [u8]> {
    if p.is_null() {
        return if len == 0 { Some(&[]) } else { None };
    }
    Some(slice::from_raw_parts(p, len))
}

/// Mutable counterpart of [`input`].
unsafe fn output<'a>(p: *mut u8, len: usize) -> Option<&'a mut [u8]> {
    if p.is_null() {
        return if len == 0 { Some(&mut []) } else { None };
    }
    Some(slice::from_raw_parts_mut(p, len))
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Create an AES-128-GCM context.
///
/// # Safety
/// - `key_ptr` must be valid for `key_len` bytes
/// - `out` must be valid for one pointer write
///
/// # Returns
/// `0` and a new handle in `*out`, `-1` on null, `-3` unless `key_len == 16`.
/// The handle must be released with `ferrule_aesgcm_destroy`.
#[no_mangle]
pub unsafe extern "C" fn ferrule_aesgcm_create(
    key_ptr: *const u8,
    key_len: usize,
    out: *mut *mut FerruleAesGcm,
) -> i32 {
    if key_ptr.is_null() || out.is_null() {
        return FERRULE_ERR_NULL;
    }
    *out = ptr::null_mut();

    let result = catch_unwind(|| {
        let key = slice::from_raw_parts(key_ptr, key_len);
        AesGcm::new(key)
    });

    match result {
        Ok(Ok(gcm)) => {
            *out = Box::into_raw(Box::new(FerruleAesGcm(gcm)));
            FERRULE_OK
        }
        Ok(Err(e)) => status(e),
        Err(_) => FERRULE_ERR_PANIC,
    }
}

/// Destroy a context, wipe its key material and null the caller's handle.
///
/// # Safety
/// `ctx`, if non-null, must point to a handle from `ferrule_aesgcm_create`
/// (or null) that no other thread is using.
#[no_mangle]
pub unsafe extern "C" fn ferrule_aesgcm_destroy(ctx: *mut *mut FerruleAesGcm) {
    if ctx.is_null() || (*ctx).is_null() {
        return;
    }
    drop(Box::from_raw(*ctx));
    *ctx = ptr::null_mut();
}

// =============================================================================
// ENCRYPT / DECRYPT
// =============================================================================

/// Encrypt `len` bytes and write a 16-byte tag.
///
/// # Safety
/// - `ctx` must be a live handle
/// - `plain_ptr` and `cipher_ptr` must be valid for `len` bytes (may be
///   null if `len == 0`) and may be equal but must not partially overlap
/// - `nonce_ptr` valid for `nonce_len >= 12` bytes, `tag_ptr` for
///   `tag_len >= 16` writable bytes
#[no_mangle]
pub unsafe extern "C" fn ferrule_aesgcm_encrypt(
    ctx: *const FerruleAesGcm,
    plain_ptr: *const u8,
    len: usize,
    nonce_ptr: *const u8,
    nonce_len: usize,
    tag_ptr: *mut u8,
    tag_len: usize,
    cipher_ptr: *mut u8,
) -> i32 {
    if ctx.is_null() || nonce_ptr.is_null() || tag_ptr.is_null() {
        return FERRULE_ERR_NULL;
    }
    if tag_len < TAG_SIZE {
        return FERRULE_ERR_INVALID;
    }
    if len != 0 && (plain_ptr.is_null() || cipher_ptr.is_null()) {
        return FERRULE_ERR_NULL;
    }

    let result = catch_unwind(|| {
        let gcm = &(*ctx).0;
        let nonce = slice::from_raw_parts(nonce_ptr, nonce_len);
        let mut tag = [0u8; TAG_SIZE];

        let r = if ptr::eq(plain_ptr, cipher_ptr) {
            output(cipher_ptr, len)
                .ok_or(GcmError::BufferLength { input: len, output: 0 })
                .and_then(|buf| {
                    tag = gcm.encrypt_in_place(nonce, &[], buf)?;
                    Ok(())
                })
        } else {
            match (input(plain_ptr, len), output(cipher_ptr, len)) {
                (Some(plain), Some(cipher)) => gcm.encrypt(plain, nonce, &mut tag, cipher),
                _ => Err(GcmError::BufferLength { input: len, output: 0 }),
            }
        };
        if r.is_ok() {
            ptr::copy_nonoverlapping(tag.as_ptr(), tag_ptr, TAG_SIZE);
        }
        r
    });

    match result {
        Ok(Ok(())) => FERRULE_OK,
        Ok(Err(e)) => status(e),
        Err(_) => FERRULE_ERR_PANIC,
    }
}

/// Decrypt `len` bytes and verify the 16-byte tag.
///
/// The plaintext buffer is written even when `-4` is returned; its contents
/// are then unauthenticated and must be discarded.
///
/// # Safety
/// Same buffer requirements as `ferrule_aesgcm_encrypt`; `tag_ptr` must be
/// readable for `tag_len >= 16` bytes.
#[no_mangle]
pub unsafe extern "C" fn ferrule_aesgcm_decrypt(
    ctx: *const FerruleAesGcm,
    cipher_ptr: *const u8,
    len: usize,
    nonce_ptr: *const u8,
    nonce_len: usize,
    tag_ptr: *const u8,
    tag_len: usize,
    plain_ptr: *mut u8,
) -> i32 {
    if ctx.is_null() || nonce_ptr.is_null() || tag_ptr.is_null() {
        return FERRULE_ERR_NULL;
    }
    if tag_len < TAG_SIZE {
        return FERRULE_ERR_INVALID;
    }
    if len != 0 && (plain_ptr.is_null() || cipher_ptr.is_null()) {
        return FERRULE_ERR_NULL;
    }

    let result = catch_unwind(|| {
        let gcm = &(*ctx).0;
        let nonce = slice::from_raw_parts(nonce_ptr, nonce_len);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(slice::from_raw_parts(tag_ptr, TAG_SIZE));

        if ptr::eq(cipher_ptr, plain_ptr) {
            // In place: stage the ciphertext so decrypt can still fill the
            // buffer on failure, as the out-of-place path does.
            let buf = output(plain_ptr, len).unwrap_or_default();
            let staged = buf.to_vec();
            gcm.decrypt(&staged, nonce, &tag, buf)
        } else {
            match (input(cipher_ptr, len), output(plain_ptr, len)) {
                (Some(cipher), Some(plain)) => gcm.decrypt(cipher, nonce, &tag, plain),
                _ => Err(GcmError::BufferLength { input: len, output: 0 }),
            }
        }
    });

    match result {
        Ok(Ok(())) => FERRULE_OK,
        Ok(Err(e)) => status(e),
        Err(_) => FERRULE_ERR_PANIC,
    }
}

// =============================================================================
// INTROSPECTION
// =============================================================================

/// Get the name of the active backend.
///
/// # Returns
/// A pointer to a static, null-terminated C string (e.g. `"AES-NI"`). Must
/// NOT be freed by the caller.
#[no_mangle]
pub extern "C" fn ferrule_aesgcm_backend() -> *const c_char {
    crate::engine::best_backend().c_name.as_ptr()
}
