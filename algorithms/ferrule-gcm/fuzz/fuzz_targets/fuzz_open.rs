#![no_main]

use ferrule_gcm::{AesGcm, GcmError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // =============================================================================
    // PREPARATION
    // =============================================================================

    // Arbitrary (tag, ciphertext) under a fixed key: forgeries must be rejected
    // and must never touch the buffer.
    if data.len() < 16 {
        return;
    }
    let gcm = AesGcm::new(&[0x0F; 16]).unwrap();
    let nonce = [0xF0; 12];

    let mut tag = [0u8; 16];
    tag.copy_from_slice(&data[..16]);
    let mut buffer = data[16..].to_vec();

    // =============================================================================
    // 1. FORGERY ATTEMPT
    // =============================================================================

    match gcm.decrypt_in_place(&nonce, &[], &mut buffer, &tag) {
        Ok(()) => {
            // Only possible if the input was produced by the key holder
            let tag_again = gcm.encrypt_in_place(&nonce, &[], &mut buffer).unwrap();
            assert_eq!(tag_again, tag);
        }
        Err(GcmError::AuthenticationFailed) => {
            assert_eq!(buffer, &data[16..], "buffer modified on failure");
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
});
