//! C Binding Tests
//!
//! Drives the exported C ABI directly and checks it against the Rust API:
//! return codes, null handling, in-place buffers and handle lifecycle.

#![allow(unsafe_code)]
#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used)]

use ferrule_gcm::ffi::{
    ferrule_aesgcm_backend, ferrule_aesgcm_create, ferrule_aesgcm_decrypt,
    ferrule_aesgcm_destroy, ferrule_aesgcm_encrypt, FerruleAesGcm, FERRULE_ERR_AUTH,
    FERRULE_ERR_INVALID, FERRULE_ERR_NULL, FERRULE_OK,
};
use ferrule_gcm::AesGcm;
use std::ffi::CStr;
use std::ptr;

const KEY: [u8; 16] = *b"0123456789abcdef";
const NONCE: [u8; 12] = *b"c-abi-nonce!";

fn create() -> *mut FerruleAesGcm {
    let mut ctx = ptr::null_mut();
    let rc = unsafe { ferrule_aesgcm_create(KEY.as_ptr(), KEY.len(), &mut ctx) };
    assert_eq!(rc, FERRULE_OK);
    assert!(!ctx.is_null());
    ctx
}

#[test]
fn test_c_roundtrip_matches_rust() {
    let mut ctx = create();
    let plaintext = b"the quick brown fox jumps over the lazy dog";
    let mut ciphertext = [0u8; 43];
    let mut tag = [0u8; 16];

    let rc = unsafe {
        ferrule_aesgcm_encrypt(
            ctx,
            plaintext.as_ptr(),
            plaintext.len(),
            NONCE.as_ptr(),
            NONCE.len(),
            tag.as_mut_ptr(),
            tag.len(),
            ciphertext.as_mut_ptr(),
        )
    };
    assert_eq!(rc, FERRULE_OK);

    // Same bytes as the Rust API
    let gcm = AesGcm::new(&KEY).unwrap();
    let mut expected = [0u8; 43];
    let mut expected_tag = [0u8; 16];
    gcm.encrypt(plaintext, &NONCE, &mut expected_tag, &mut expected)
        .unwrap();
    assert_eq!(ciphertext, expected);
    assert_eq!(tag, expected_tag);

    let mut recovered = [0u8; 43];
    let rc = unsafe {
        ferrule_aesgcm_decrypt(
            ctx,
            ciphertext.as_ptr(),
            ciphertext.len(),
            NONCE.as_ptr(),
            NONCE.len(),
            tag.as_ptr(),
            tag.len(),
            recovered.as_mut_ptr(),
        )
    };
    assert_eq!(rc, FERRULE_OK);
    assert_eq!(&recovered, plaintext);

    unsafe { ferrule_aesgcm_destroy(&mut ctx) };
    assert!(ctx.is_null(), "destroy must null the handle");
    // Second destroy is a no-op
    unsafe { ferrule_aesgcm_destroy(&mut ctx) };
}

#[test]
fn test_c_in_place() {
    let mut ctx = create();
    let original = [0x5Au8; 70];
    let mut buf = original;
    let mut tag = [0u8; 16];

    let p = buf.as_mut_ptr();
    let rc = unsafe {
        ferrule_aesgcm_encrypt(ctx, p, buf.len(), NONCE.as_ptr(), 12, tag.as_mut_ptr(), 16, p)
    };
    assert_eq!(rc, FERRULE_OK);
    assert_ne!(buf, original);

    let p = buf.as_mut_ptr();
    let rc = unsafe {
        ferrule_aesgcm_decrypt(ctx, p, buf.len(), NONCE.as_ptr(), 12, tag.as_ptr(), 16, p)
    };
    assert_eq!(rc, FERRULE_OK);
    assert_eq!(buf, original);

    unsafe { ferrule_aesgcm_destroy(&mut ctx) };
}

#[test]
fn test_c_auth_failure() {
    let mut ctx = create();
    let mut ciphertext = [0u8; 8];
    let mut tag = [0u8; 16];
    unsafe {
        ferrule_aesgcm_encrypt(
            ctx,
            [1u8; 8].as_ptr(),
            8,
            NONCE.as_ptr(),
            12,
            tag.as_mut_ptr(),
            16,
            ciphertext.as_mut_ptr(),
        );
    }
    tag[3] ^= 1;

    let mut out = [0u8; 8];
    let rc = unsafe {
        ferrule_aesgcm_decrypt(
            ctx,
            ciphertext.as_ptr(),
            8,
            NONCE.as_ptr(),
            12,
            tag.as_ptr(),
            16,
            out.as_mut_ptr(),
        )
    };
    assert_eq!(rc, FERRULE_ERR_AUTH);
    // Plaintext is still materialised, as documented
    assert_eq!(out, [1u8; 8]);

    unsafe { ferrule_aesgcm_destroy(&mut ctx) };
}

#[test]
fn test_c_empty_message_with_null_buffers() {
    let mut ctx = create();
    let mut tag = [0u8; 16];
    let rc = unsafe {
        ferrule_aesgcm_encrypt(
            ctx,
            ptr::null(),
            0,
            NONCE.as_ptr(),
            12,
            tag.as_mut_ptr(),
            16,
            ptr::null_mut(),
        )
    };
    assert_eq!(rc, FERRULE_OK);

    let gcm = AesGcm::new(&KEY).unwrap();
    assert_eq!(tag, gcm.encrypt_in_place(&NONCE, &[], &mut []).unwrap());

    unsafe { ferrule_aesgcm_destroy(&mut ctx) };
}

#[test]
fn test_c_null_and_invalid_arguments() {
    let mut ctx = ptr::null_mut();
    unsafe {
        assert_eq!(ferrule_aesgcm_create(ptr::null(), 16, &mut ctx), FERRULE_ERR_NULL);
        assert_eq!(
            ferrule_aesgcm_create(KEY.as_ptr(), 16, ptr::null_mut()),
            FERRULE_ERR_NULL
        );
        assert_eq!(ferrule_aesgcm_create(KEY.as_ptr(), 24, &mut ctx), FERRULE_ERR_INVALID);
        assert!(ctx.is_null());
    }

    let mut ctx = create();
    let mut buf = [0u8; 4];
    let mut tag = [0u8; 16];
    unsafe {
        // Null context
        assert_eq!(
            ferrule_aesgcm_encrypt(
                ptr::null(),
                buf.as_ptr(),
                4,
                NONCE.as_ptr(),
                12,
                tag.as_mut_ptr(),
                16,
                buf.as_mut_ptr()
            ),
            FERRULE_ERR_NULL
        );
        // Null data with non-zero length
        assert_eq!(
            ferrule_aesgcm_encrypt(
                ctx,
                ptr::null(),
                4,
                NONCE.as_ptr(),
                12,
                tag.as_mut_ptr(),
                16,
                buf.as_mut_ptr()
            ),
            FERRULE_ERR_NULL
        );
        // Short nonce
        assert_eq!(
            ferrule_aesgcm_encrypt(
                ctx,
                buf.as_ptr(),
                4,
                NONCE.as_ptr(),
                11,
                tag.as_mut_ptr(),
                16,
                buf.as_mut_ptr()
            ),
            FERRULE_ERR_INVALID
        );
        // Short tag buffer
        assert_eq!(
            ferrule_aesgcm_decrypt(
                ctx,
                buf.as_ptr(),
                4,
                NONCE.as_ptr(),
                12,
                tag.as_ptr(),
                8,
                buf.as_mut_ptr()
            ),
            FERRULE_ERR_INVALID
        );
        ferrule_aesgcm_destroy(&mut ctx);
        ferrule_aesgcm_destroy(ptr::null_mut());
    }
}

#[test]
fn test_c_backend_name() {
    let name = unsafe { CStr::from_ptr(ferrule_aesgcm_backend()) };
    assert_eq!(name.to_str().unwrap(), ferrule_gcm::active_backend());
}
