use bolero::check;
use ferrule_gcm::{AesGcm, BackendKind};

#[test]
fn fuzz_backend_agreement() {
    check!()
        .with_type::<([u8; 16], [u8; 12], Vec<u8>, Vec<u8>)>()
        .for_each(|(key, nonce, aad, data)| {
            let Ok(simd) = AesGcm::with_backend(key, BackendKind::AesNi) else {
                return;
            };
            let Ok(portable) = AesGcm::with_backend(key, BackendKind::Portable) else {
                panic!("portable backend unavailable");
            };

            let mut a = data.clone();
            let mut b = data.clone();
            let tag_a = simd.encrypt_in_place(nonce, aad, &mut a);
            let tag_b = portable.encrypt_in_place(nonce, aad, &mut b);

            assert_eq!(tag_a, tag_b, "tag differs between backends");
            assert_eq!(a, b, "ciphertext differs between backends");
        });
}
