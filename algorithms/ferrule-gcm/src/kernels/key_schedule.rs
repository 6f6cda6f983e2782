//! AES-128 Key Schedule
//!
//! FIPS-197 §5.2 key expansion, shared by every backend. The SIMD backend
//! loads these bytes straight into registers, so the layout is the natural
//! byte order of each round key.

use super::constants::{BLOCK_SIZE, KEY_SIZE, RCON, ROUND_KEYS, SBOX};

/// One 128-bit block in natural (big-endian) byte order.
pub type Block = [u8; BLOCK_SIZE];

/// Expanded AES-128 key: whitening key followed by ten round keys.
pub type RoundKeys = [Block; ROUND_KEYS];

/// Total 32-bit words produced by the schedule.
const WORDS: usize = 4 * ROUND_KEYS;

// =============================================================================
// KEY EXPANSION
// =============================================================================

/// Expand a 128-bit key into 11 round keys.
///
/// `w[i] = w[i-4] ^ T(w[i-1])` where `T` is the identity except on every
/// fourth word, where it is `SubWord(RotWord(w)) ^ RCON[i/4]`.
#[must_use]
pub fn expand(key: &[u8; KEY_SIZE]) -> RoundKeys {
    let mut w = [[0u8; 4]; WORDS];
    for (i, word) in w.iter_mut().take(4).enumerate() {
        word.copy_from_slice(&key[i * 4..i * 4 + 4]);
    }

    for i in 4..WORDS {
        let mut t = w[i - 1];
        if i % 4 == 0 {
            t.rotate_left(1);
            for b in &mut t {
                *b = SBOX[*b as usize];
            }
            t[0] ^= RCON[i / 4];
        }
        for j in 0..4 {
            w[i][j] = w[i - 4][j] ^ t[j];
        }
    }

    let mut out = [[0u8; BLOCK_SIZE]; ROUND_KEYS];
    for (r, rk) in out.iter_mut().enumerate() {
        for c in 0..4 {
            rk[c * 4..c * 4 + 4].copy_from_slice(&w[r * 4 + c]);
        }
    }
    out
}

// =============================================================================
// COUNTER BLOCK
// =============================================================================

/// Build the initial counter block `J0 = nonce || 0x00000001`.
#[must_use]
pub fn initial_counter(nonce: &[u8; super::constants::NONCE_SIZE]) -> Block {
    let mut j0 = [0u8; BLOCK_SIZE];
    j0[..nonce.len()].copy_from_slice(nonce);
    j0[BLOCK_SIZE - 1] = 1;
    j0
}

/// GCM `inc32`: big-endian increment of the last four bytes, wrapping at
/// `2^32`. The nonce bytes are never touched.
#[inline]
pub fn increment_counter(block: &mut Block) {
    let mut ctr = [0u8; 4];
    ctr.copy_from_slice(&block[12..]);
    let next = u32::from_be_bytes(ctr).wrapping_add(1);
    block[12..].copy_from_slice(&next.to_be_bytes());
}

/// Final GHASH block: `bitlen(aad) || bitlen(ciphertext)`, both big-endian u64.
#[must_use]
pub fn length_block(aad_len: usize, text_len: usize) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block[..8].copy_from_slice(&((aad_len as u64) * 8).to_be_bytes());
    block[8..].copy_from_slice(&((text_len as u64) * 8).to_be_bytes());
    block
}
