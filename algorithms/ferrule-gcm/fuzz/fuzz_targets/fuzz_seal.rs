#![no_main]

use ferrule_gcm::{AesGcm, BackendKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // =============================================================================
    // PREPARATION
    // =============================================================================

    // First 16 bytes: key, next 12: nonce, next byte: AAD length, rest: AAD + message
    if data.len() < 29 {
        return;
    }
    let (key, rest) = data.split_at(16);
    let (nonce, rest) = rest.split_at(12);
    let aad_len = usize::from(rest[0]).min(rest.len() - 1);
    let (aad, msg) = rest[1..].split_at(aad_len);

    let gcm = AesGcm::with_backend(key, BackendKind::Portable).unwrap();

    // =============================================================================
    // 1. ROUND TRIP
    // =============================================================================

    let mut buffer = msg.to_vec();
    let tag = gcm.encrypt_in_place(nonce, aad, &mut buffer).unwrap();
    let sealed = buffer.clone();
    gcm.decrypt_in_place(nonce, aad, &mut buffer, &tag).unwrap();
    assert_eq!(buffer, msg, "round trip mismatch");

    // =============================================================================
    // 2. BACKEND AGREEMENT
    // =============================================================================

    if let Ok(simd) = AesGcm::with_backend(key, BackendKind::AesNi) {
        let mut other = msg.to_vec();
        let other_tag = simd.encrypt_in_place(nonce, aad, &mut other).unwrap();
        assert_eq!(other, sealed, "ciphertext differs between backends");
        assert_eq!(other_tag, tag, "tag differs between backends");
    }
});
