//! ferrule-gcm Basic Example
//!
//! Minimal usage: seal a message, then open it.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used)]

use ferrule_gcm::AesGcm;

fn main() {
    let key = *b"an example key!!";
    let nonce = *b"never reused";
    let gcm = AesGcm::new(&key).unwrap();

    let mut message = *b"Hello, World!";
    let tag = gcm.encrypt_in_place(&nonce, b"v1", &mut message).unwrap();

    println!("Backend:    {}", gcm.backend_name());
    println!("Ciphertext: {}", hex::encode(message));
    println!("Tag:        {}", hex::encode(tag));

    gcm.decrypt_in_place(&nonce, b"v1", &mut message, &tag).unwrap();
    println!("Plaintext:  {:?}", String::from_utf8_lossy(&message));
}
