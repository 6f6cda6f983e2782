use bolero::check;
use ferrule_gcm::{AesGcm, GcmError};

#[test]
fn fuzz_tamper_detection() {
    check!()
        .with_type::<(Vec<u8>, u16, bool)>()
        .for_each(|(data, position, in_tag)| {
            let Ok(gcm) = AesGcm::new(&[0xA5; 16]) else {
                panic!("16-byte key rejected");
            };
            let nonce = [0x5A; 12];

            let mut buffer = data.clone();
            let Ok(mut tag) = gcm.encrypt_in_place(&nonce, b"fuzz", &mut buffer) else {
                panic!("encrypt failed");
            };

            // =================================================================
            // CORRUPTION
            // =================================================================

            // Flip one bit in the tag, or in the ciphertext when there is one
            let bit = usize::from(*position);
            if *in_tag || buffer.is_empty() {
                tag[(bit / 8) % 16] ^= 1 << (bit % 8);
            } else {
                let idx = (bit / 8) % buffer.len();
                buffer[idx] ^= 1 << (bit % 8);
            }
            let tampered = buffer.clone();

            assert_eq!(
                gcm.decrypt_in_place(&nonce, b"fuzz", &mut buffer, &tag),
                Err(GcmError::AuthenticationFailed),
                "tampered message accepted"
            );
            assert_eq!(buffer, tampered, "buffer modified on failed decrypt");
        });
}
