//! Check Command
//!
//! Verify AES-GCM test vectors from a JSON file.

use super::{decode_hex, Backend};
use anyhow::{Context, Result};
use ferrule_gcm::{AesGcm, TAG_SIZE};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// One known-answer test; every field is hex.
#[derive(Deserialize)]
struct Vector {
    name: String,
    key: String,
    nonce: String,
    #[serde(default)]
    aad: String,
    plaintext: String,
    ciphertext: String,
    tag: String,
}

#[derive(Deserialize)]
struct VectorFile {
    vectors: Vec<Vector>,
}

// =============================================================================
// CHECK
// =============================================================================

/// Verify every vector in `vector_file`: seal must reproduce the ciphertext
/// and tag, and open must recover the plaintext.
pub fn check_mode(vector_file: &PathBuf, backend: Backend) -> Result<()> {
    let file = File::open(vector_file)
        .with_context(|| format!("Failed to open: {}", vector_file.display()))?;
    let parsed: VectorFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse: {}", vector_file.display()))?;

    let total = parsed.vectors.len();
    let mut failed = 0;

    for v in &parsed.vectors {
        match check_vector(v, backend) {
            Ok(true) => println!("{}: OK", v.name),
            Ok(false) => {
                println!("{}: FAILED", v.name);
                failed += 1;
            }
            Err(e) => {
                println!("{}: FAILED ({e:#})", v.name);
                failed += 1;
            }
        }
    }

    println!();
    if failed == 0 {
        println!("All {total} vectors verified");
    } else {
        eprintln!("WARNING: {failed} of {total} vectors did NOT match");
        std::process::exit(1);
    }

    Ok(())
}

fn check_vector(v: &Vector, backend: Backend) -> Result<bool> {
    let key = decode_hex("key", &v.key)?;
    let nonce = decode_hex("nonce", &v.nonce)?;
    let aad = decode_hex("aad", &v.aad)?;
    let plaintext = decode_hex("plaintext", &v.plaintext)?;
    let ciphertext = decode_hex("ciphertext", &v.ciphertext)?;
    let expected_tag: [u8; TAG_SIZE] = decode_hex("tag", &v.tag)?
        .try_into()
        .map_err(|t: Vec<u8>| anyhow::anyhow!("tag is {} bytes, expected {TAG_SIZE}", t.len()))?;

    let gcm = AesGcm::with_backend(&key, backend.into())?;

    let mut buffer = plaintext.clone();
    let tag = gcm.encrypt_in_place(&nonce, &aad, &mut buffer)?;
    if buffer != ciphertext || tag != expected_tag {
        return Ok(false);
    }

    Ok(gcm
        .decrypt_in_place(&nonce, &aad, &mut buffer, &expected_tag)
        .is_ok()
        && buffer == plaintext)
}
