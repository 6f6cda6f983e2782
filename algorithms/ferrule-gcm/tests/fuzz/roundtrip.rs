use bolero::check;
use ferrule_gcm::AesGcm;

#[test]
fn fuzz_roundtrip() {
    check!()
        .with_type::<([u8; 16], [u8; 12], Vec<u8>, Vec<u8>)>()
        .for_each(|(key, nonce, aad, data)| {
            let Ok(gcm) = AesGcm::new(key) else {
                panic!("16-byte key rejected");
            };

            // =================================================================
            // DETACHED API
            // =================================================================

            let mut ciphertext = vec![0u8; data.len()];
            let mut tag = [0u8; 16];
            assert!(gcm.encrypt(data, nonce, &mut tag, &mut ciphertext).is_ok());

            let mut plaintext = vec![0u8; data.len()];
            assert!(gcm.decrypt(&ciphertext, nonce, &tag, &mut plaintext).is_ok());
            assert_eq!(&plaintext, data, "detached round trip mismatch");

            // =================================================================
            // IN-PLACE API
            // =================================================================

            let mut buffer = data.clone();
            let Ok(tag_aad) = gcm.encrypt_in_place(nonce, aad, &mut buffer) else {
                panic!("in-place encrypt failed");
            };
            if aad.is_empty() {
                assert_eq!(tag_aad, tag, "empty AAD must match detached tag");
                assert_eq!(buffer, ciphertext);
            }
            assert!(gcm.decrypt_in_place(nonce, aad, &mut buffer, &tag_aad).is_ok());
            assert_eq!(&buffer, data, "in-place round trip mismatch");
        });
}
